// Simulation request: everything that determines a result's distribution,
// plus the canonical fingerprint used by the cache.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationData;
use crate::config::SimConfig;
use crate::error::EngineError;
use crate::models::params::{RegimeParams, RegimeSet, RegimeSwitch, SimInputs};
use crate::models::target::Target;

/// Step size: one-minute steps, in hours.
pub const DT_HOURS: f64 = 1.0 / 60.0;

/// Long-run variance ceiling shared with the calibrator's theta clamp.
const THETA_MAX: f64 = 0.25;

/// Per-hour drift magnitude assigned to the regimes, as a fraction of the
/// blended daily RV.
const REGIME_DRIFT_FRACTION: f64 = 0.25;

/// Bear-regime long-run variance inflation.
const BEAR_THETA_FACTOR: f64 = 1.5;

const MULT_MIN: f64 = 0.9;
const MULT_MAX: f64 = 1.1;

/// What-if multipliers. Bounded to ±10% so a sensitivity sweep can never
/// wander outside the calibrated neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sensitivity {
    pub vol_mult: f64,
    pub jump_intensity_mult: f64,
    pub jump_size_mult: f64,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Sensitivity {
            vol_mult: 1.0,
            jump_intensity_mult: 1.0,
            jump_size_mult: 1.0,
        }
    }
}

impl Sensitivity {
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, value) in [
            ("vol_mult", self.vol_mult),
            ("jump_intensity_mult", self.jump_intensity_mult),
            ("jump_size_mult", self.jump_size_mult),
        ] {
            if !value.is_finite() || !(MULT_MIN..=MULT_MAX).contains(&value) {
                return Err(EngineError::invalid(format!(
                    "{} must lie in [{}, {}]",
                    name, MULT_MIN, MULT_MAX
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimRequest {
    /// Market identifier (exchange ticker); part of the fingerprint.
    pub market_id: String,
    /// Live spot, USD.
    pub spot: f64,
    /// Hours until settlement.
    pub hours_to_close: f64,
    pub target: Target,
    pub calibration: CalibrationData,
    #[serde(default)]
    pub sensitivity: Sensitivity,
    #[serde(default)]
    pub config: SimConfig,
}

impl SimRequest {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.spot.is_finite() || self.spot <= 0.0 {
            return Err(EngineError::invalid("spot must be positive and finite"));
        }
        if !self.hours_to_close.is_finite() || self.hours_to_close <= 0.0 {
            return Err(EngineError::invalid("hours_to_close must be positive"));
        }
        self.target.validate()?;
        self.sensitivity.validate()?;
        self.config.validate()
    }

    /// Canonical cache key. Spot rounds to the dollar and time-to-close to
    /// a tenth of an hour, so price jitter within ±$0.50 and clock drift
    /// within ±0.05 h land on the same entry.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}|{:.0}|{:.1}|{:.2}|{:.2}|{:.2}",
            self.market_id,
            self.spot.round(),
            (self.hours_to_close * 10.0).round() / 10.0,
            self.sensitivity.vol_mult,
            self.sensitivity.jump_intensity_mult,
            self.sensitivity.jump_size_mult,
        )
    }

    /// Assemble kernel inputs from the calibration bundle and overrides.
    ///
    /// The bull regime carries the calibrated Heston bundle with a positive
    /// drift; the bear regime inflates long-run variance and mirrors the
    /// drift. Drift is converted to per-step units here, exactly once.
    pub fn build_inputs(&self) -> Result<SimInputs, EngineError> {
        self.validate()?;

        let cal = &self.calibration;
        let s = &self.sensitivity;

        let mut heston = cal.heston;
        heston.theta = (heston.theta * s.vol_mult * s.vol_mult).min(THETA_MAX);

        let mut jumps = cal.jumps;
        jumps.lambda *= s.jump_intensity_mult;
        jumps.sigma_j *= s.jump_size_mult;

        let mu_step = REGIME_DRIFT_FRACTION * cal.daily_rv * DT_HOURS;
        let bull = RegimeParams {
            mu: mu_step,
            heston,
        };
        let mut bear_heston = heston;
        bear_heston.theta = (bear_heston.theta * BEAR_THETA_FACTOR).min(THETA_MAX);
        let bear = RegimeParams {
            mu: -mu_step,
            heston: bear_heston,
        };

        let inputs = SimInputs {
            s0: self.spot,
            horizon_hours: self.hours_to_close,
            dt_hours: DT_HOURS,
            regimes: RegimeSet { bull, bear },
            switching: RegimeSwitch::persistent(cal.regime.probabilities),
            jumps,
        };
        inputs.validate()?;
        Ok(inputs)
    }
}
