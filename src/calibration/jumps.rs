// Jump-moment estimation from minute returns: a return further than three
// standard deviations from the mean is treated as one jump arrival.

use crate::calibration::realized_vol::{mean, sample_stddev};
use crate::models::params::{JumpKind, JumpParams};

const LAMBDA_MIN: f64 = 0.01;
const LAMBDA_MAX: f64 = 1.0;
const SIGMA_J_MIN: f64 = 0.01;
const SIGMA_J_MAX: f64 = 0.1;

/// Fallback when no outliers are present in the window.
pub fn default_jumps() -> JumpParams {
    JumpParams {
        lambda: 0.1,
        mu_j: 0.0,
        sigma_j: 0.02,
        kind: JumpKind::Merton,
    }
}

/// Estimate Merton jump parameters from minute log returns. mu_j is forced
/// to zero (symmetric jumps); the calibrator never emits Kou.
pub fn estimate(minute_returns: &[f64]) -> JumpParams {
    if minute_returns.len() < 2 {
        return default_jumps();
    }

    let m = mean(minute_returns);
    let sd = sample_stddev(minute_returns);
    if sd <= 0.0 {
        return default_jumps();
    }

    let jumps: Vec<f64> = minute_returns
        .iter()
        .copied()
        .filter(|r| (r - m).abs() > 3.0 * sd)
        .collect();
    if jumps.is_empty() {
        return default_jumps();
    }

    let lambda = (jumps.len() as f64 / minute_returns.len() as f64).clamp(LAMBDA_MIN, LAMBDA_MAX);
    let log_magnitudes: Vec<f64> = jumps.iter().map(|j| j.abs().ln()).collect();
    let sigma_j = sample_stddev(&log_magnitudes).clamp(SIGMA_J_MIN, SIGMA_J_MAX);

    JumpParams {
        lambda,
        mu_j: 0.0,
        sigma_j,
        kind: JumpKind::Merton,
    }
}
