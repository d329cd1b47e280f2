// Model parameter bundles for the combined Heston + jumps + regime process.
// Every bundle is an immutable value object validated at the boundary; the
// kernel never re-checks invariants on the hot path.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Heston stochastic-volatility parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HestonParams {
    pub kappa: f64, // Mean reversion rate
    pub theta: f64, // Long-term variance
    pub xi: f64,    // Volatility of variance (vol of vol)
    pub rho: f64,   // Correlation between price and variance shocks
}

impl HestonParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.kappa.is_finite() || self.kappa <= 0.0 {
            return Err(EngineError::invalid("kappa must be positive and finite"));
        }
        if !self.theta.is_finite() || self.theta <= 0.0 {
            return Err(EngineError::invalid("theta must be positive and finite"));
        }
        if !self.xi.is_finite() || self.xi <= 0.0 {
            return Err(EngineError::invalid("xi must be positive and finite"));
        }
        if !self.rho.is_finite() || self.rho < -1.0 || self.rho > 1.0 {
            return Err(EngineError::invalid("rho must lie in [-1, 1]"));
        }
        Ok(())
    }

    /// Feller ratio 2κθ/ξ². Values ≥ 1 keep the variance strictly positive
    /// in the continuous process. Violations are allowed; the kernel clamps
    /// variance at zero instead of rejecting the bundle.
    pub fn feller_ratio(&self) -> f64 {
        2.0 * self.kappa * self.theta / (self.xi * self.xi)
    }
}

/// Jump size family. `Kou` (double-exponential) is accepted at the boundary
/// but the kernel currently reduces it to `Merton` and records the
/// substitution in diagnostics; the calibrator never emits `Kou`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JumpKind {
    Merton,
    Kou,
}

/// Compound-Poisson jump parameters (per unit time).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpParams {
    pub lambda: f64,  // Poisson intensity, jumps per hour
    pub mu_j: f64,    // Mean log jump size
    pub sigma_j: f64, // Stddev of log jump size
    pub kind: JumpKind,
}

impl JumpParams {
    /// Jumps disabled.
    pub fn none() -> Self {
        JumpParams {
            lambda: 0.0,
            mu_j: 0.0,
            sigma_j: 0.0,
            kind: JumpKind::Merton,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(EngineError::invalid("jump lambda must be >= 0"));
        }
        if !self.mu_j.is_finite() {
            return Err(EngineError::invalid("jump mu_j must be finite"));
        }
        if !self.sigma_j.is_finite() || self.sigma_j < 0.0 {
            return Err(EngineError::invalid("jump sigma_j must be >= 0"));
        }
        Ok(())
    }

    /// E[e^Y] − 1 for one jump; the per-step compensator is lambda·this·dt.
    pub fn mean_relative_jump(&self) -> f64 {
        (self.mu_j + 0.5 * self.sigma_j * self.sigma_j).exp() - 1.0
    }
}

/// The two hidden market regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Bull,
    Bear,
}

impl Regime {
    pub fn index(self) -> usize {
        match self {
            Regime::Bull => 0,
            Regime::Bear => 1,
        }
    }

    pub fn from_index(i: usize) -> Regime {
        if i == 0 {
            Regime::Bull
        } else {
            Regime::Bear
        }
    }
}

/// Per-regime dynamics: drift is per STEP (already multiplied by dt at
/// assembly time; the kernel never rescales it).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeParams {
    pub mu: f64,
    pub heston: HestonParams,
}

impl RegimeParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.mu.is_finite() {
            return Err(EngineError::invalid("regime drift must be finite"));
        }
        self.heston.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeSet {
    pub bull: RegimeParams,
    pub bear: RegimeParams,
}

impl RegimeSet {
    pub fn get(&self, regime: Regime) -> &RegimeParams {
        match regime {
            Regime::Bull => &self.bull,
            Regime::Bear => &self.bear,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.bull.validate()?;
        self.bear.validate()
    }
}

const ROW_SUM_TOL: f64 = 1e-9;

/// Two-state Markov switching: row-stochastic transition matrix `p` and
/// initial distribution `pi0`, both indexed [Bull, Bear].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeSwitch {
    pub p: [[f64; 2]; 2],
    pub pi0: [f64; 2],
}

impl RegimeSwitch {
    /// Persistence matrix with the classifier's snapshot as pi0. Bear is
    /// slightly less sticky than bull, matching observed crypto regime
    /// half-lives at minute resolution.
    pub fn persistent(pi0: [f64; 2]) -> Self {
        RegimeSwitch {
            p: [[0.95, 0.05], [0.10, 0.90]],
            pi0,
        }
    }

    /// Degenerate chain pinned to a single regime forever.
    pub fn pinned(regime: Regime) -> Self {
        let pi0 = match regime {
            Regime::Bull => [1.0, 0.0],
            Regime::Bear => [0.0, 1.0],
        };
        RegimeSwitch {
            p: [[1.0, 0.0], [0.0, 1.0]],
            pi0,
        }
    }

    pub fn row(&self, regime: Regime) -> &[f64; 2] {
        &self.p[regime.index()]
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for row in &self.p {
            for &entry in row {
                if !entry.is_finite() || !(0.0..=1.0).contains(&entry) {
                    return Err(EngineError::invalid(
                        "transition entries must lie in [0, 1]",
                    ));
                }
            }
            if ((row[0] + row[1]) - 1.0).abs() > ROW_SUM_TOL {
                return Err(EngineError::invalid("transition rows must sum to 1"));
            }
        }
        for &entry in &self.pi0 {
            if !entry.is_finite() || !(0.0..=1.0).contains(&entry) {
                return Err(EngineError::invalid("pi0 entries must lie in [0, 1]"));
            }
        }
        if ((self.pi0[0] + self.pi0[1]) - 1.0).abs() > ROW_SUM_TOL {
            return Err(EngineError::invalid("pi0 must sum to 1"));
        }
        Ok(())
    }
}

/// Complete input bundle for one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimInputs {
    pub s0: f64,            // Spot at simulation start, USD
    pub horizon_hours: f64, // Time to settlement
    pub dt_hours: f64,      // Step size
    pub regimes: RegimeSet,
    pub switching: RegimeSwitch,
    pub jumps: JumpParams,
}

impl SimInputs {
    pub fn n_steps(&self) -> usize {
        (self.horizon_hours / self.dt_hours).round() as usize
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.s0.is_finite() || self.s0 <= 0.0 {
            return Err(EngineError::invalid("s0 must be positive and finite"));
        }
        if !self.horizon_hours.is_finite() || self.horizon_hours <= 0.0 {
            return Err(EngineError::invalid("horizon must be positive"));
        }
        if !self.dt_hours.is_finite() || self.dt_hours <= 0.0 {
            return Err(EngineError::invalid("dt must be positive"));
        }
        if self.n_steps() < 1 {
            return Err(EngineError::invalid(
                "horizon/dt must round to at least one step",
            ));
        }
        self.regimes.validate()?;
        self.switching.validate()?;
        self.jumps.validate()
    }
}
