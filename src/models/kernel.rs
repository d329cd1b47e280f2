// Single-path evolution of (log-price, variance, regime) under the combined
// Heston + compound-Poisson-jump + two-state switching dynamics.
//
// Variance uses full-truncation Euler: the drawn variance may go negative,
// but it is floored at zero everywhere it is read. The price update sees a
// capped variance and a clamped per-step displacement so pathological
// parameter bundles cannot overflow the exponential.

use serde::{Deserialize, Serialize};

use crate::models::params::{JumpKind, Regime, SimInputs};
use crate::models::rng::PathRng;

/// Variance ceiling applied before the price update (500% annualized vol).
pub const VARIANCE_CAP: f64 = 25.0;

/// Hard guard on the per-step log-price displacement (±3 ≈ a ×20 move).
pub const LOG_STEP_CLAMP: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub t_hours: f64,
    pub price: f64,
}

/// Ordered trajectory starting at (0, s0).
pub type PathSample = Vec<PathPoint>;

/// NaN/Inf surfaced mid-path. The driver replaces the path with a fresh one
/// from the same stream and counts the fault.
#[derive(Debug, Clone, Copy)]
pub struct StepFault;

#[derive(Debug, Clone)]
pub struct PathOutcome {
    pub terminal: f64,
    pub clamped_steps: u32,
    /// Smallest variance the price update actually read. Non-negative by
    /// the truncation invariant.
    pub min_variance_used: f64,
    pub sample: Option<PathSample>,
}

pub struct PathKernel<'a> {
    inputs: &'a SimInputs,
    n_steps: usize,
    /// Per-step drift adjustment: lambda·(E[e^Y]−1)·dt when the compensator
    /// is switched on, zero otherwise.
    compensator: f64,
}

impl<'a> PathKernel<'a> {
    pub fn new(inputs: &'a SimInputs, apply_compensator: bool) -> Self {
        let compensator = if apply_compensator {
            inputs.jumps.lambda * inputs.jumps.mean_relative_jump() * inputs.dt_hours
        } else {
            0.0
        };
        PathKernel {
            inputs,
            n_steps: inputs.n_steps(),
            compensator,
        }
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// True when a Kou bundle was supplied and the kernel is substituting
    /// Merton draws. Surfaced through diagnostics rather than hidden.
    pub fn kou_reduced(&self) -> bool {
        self.inputs.jumps.kind == JumpKind::Kou && self.inputs.jumps.lambda > 0.0
    }

    /// Evolve one full path. `capture` records every step as a PathPoint
    /// (the summarizer downsamples later).
    pub fn simulate(
        &self,
        rng: &mut PathRng,
        capture: bool,
    ) -> Result<PathOutcome, StepFault> {
        let dt = self.inputs.dt_hours;
        let sqrt_dt = dt.sqrt();
        let jumps = &self.inputs.jumps;

        // Initial regime from pi0; variance warm-starts at that regime's
        // long-run level.
        let mut regime = Regime::from_index(rng.categorical(&self.inputs.switching.pi0));
        let mut x = self.inputs.s0.ln();
        let mut v = self.inputs.regimes.get(regime).heston.theta;

        let mut clamped_steps = 0u32;
        let mut min_variance_used = f64::INFINITY;
        let mut sample = if capture {
            let mut points = Vec::with_capacity(self.n_steps + 1);
            points.push(PathPoint {
                t_hours: 0.0,
                price: self.inputs.s0,
            });
            Some(points)
        } else {
            None
        };

        for k in 0..self.n_steps {
            let params = self.inputs.regimes.get(regime);
            let hp = &params.heston;

            let (z_s, z_v) = rng.normal_pair(hp.rho);

            // Full-truncation Euler: floor once, use the floored value in
            // both drift and diffusion of the variance update.
            let v_plus = v.max(0.0);
            let v_next = v + hp.kappa * (hp.theta - v_plus) * dt
                + hp.xi * (v_plus * dt).sqrt() * z_v;

            // The price update reads a capped variance so a runaway vol
            // path cannot overflow exp().
            let v_eff = v_plus.min(VARIANCE_CAP);
            min_variance_used = min_variance_used.min(v_eff);
            let mut dx =
                params.mu - 0.5 * v_eff * dt - self.compensator + v_eff.sqrt() * sqrt_dt * z_s;

            // Compound Poisson jump component; Kou reduces to Merton (see
            // `kou_reduced`).
            let n_jumps = rng.poisson(jumps.lambda * dt);
            for _ in 0..n_jumps {
                dx += jumps.mu_j + jumps.sigma_j * rng.normal();
            }

            if dx.abs() > LOG_STEP_CLAMP {
                dx = dx.clamp(-LOG_STEP_CLAMP, LOG_STEP_CLAMP);
                clamped_steps += 1;
            }

            x += dx;
            v = v_next.max(0.0);

            if !x.is_finite() || !v.is_finite() {
                return Err(StepFault);
            }

            if let Some(points) = sample.as_mut() {
                points.push(PathPoint {
                    t_hours: (k + 1) as f64 * dt,
                    price: x.exp(),
                });
            }

            // Markov transition for the next step.
            regime = Regime::from_index(rng.categorical(self.inputs.switching.row(regime)));
        }

        let terminal = x.exp();
        if !terminal.is_finite() {
            return Err(StepFault);
        }

        Ok(PathOutcome {
            terminal,
            clamped_steps,
            min_variance_used,
            sample,
        })
    }
}
