// Heuristic bull/bear classifier over the most recent minute returns.
// Deliberately not an EM-fitted HMM: the scores are a momentum/volatility
// rule of thumb, and the snapshot type keeps a probability vector so a
// fitted classifier can replace this one without an interface change.

use serde::{Deserialize, Serialize};

use crate::calibration::realized_vol::{mean, sample_stddev};
use crate::models::params::Regime;

/// Returns examined, counted back from the end of the window.
const LOOKBACK: usize = 20;

/// Below this many returns the classifier abstains.
const MIN_RETURNS: usize = 10;

/// Calm-market volatility threshold (per minute bar).
const CALM_VOL: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeSnapshot {
    pub current: Regime,
    /// [bull, bear] scores, summing to 1.
    pub probabilities: [f64; 2],
}

impl RegimeSnapshot {
    /// The abstaining snapshot: bull by convention, even odds.
    pub fn neutral() -> Self {
        RegimeSnapshot {
            current: Regime::Bull,
            probabilities: [0.5, 0.5],
        }
    }
}

pub fn classify(minute_returns: &[f64]) -> RegimeSnapshot {
    if minute_returns.len() < MIN_RETURNS {
        return RegimeSnapshot::neutral();
    }

    let window = &minute_returns[minute_returns.len().saturating_sub(LOOKBACK)..];
    let m = mean(window);
    let vol = sample_stddev(window);

    let mut bull = if m > 0.0 { 0.6 } else { 0.4 };
    if vol < CALM_VOL {
        bull += 0.2;
    }
    let bear = 1.0 - bull;

    RegimeSnapshot {
        current: if bull >= bear { Regime::Bull } else { Regime::Bear },
        probabilities: [bull, bear],
    }
}
