// Scenario: the candle fetch failed upstream. The calibrator must substitute
// the documented default bundle and mark the output degraded.

use chrono::{TimeZone, Utc};

use bitcents::calibration::{calibrate, CalibrationData};
use bitcents::market_data::candles::CandleSet;
use bitcents::models::{JumpKind, Regime};

use crate::helpers::synthetic_candles;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

#[test]
fn missing_candles_fall_back_to_documented_defaults() {
    let empty = CandleSet {
        minute: Vec::new(),
        hour: Vec::new(),
        day: Vec::new(),
    };
    let data = calibrate(&empty, now());

    assert!(data.degraded);
    assert_eq!(data.heston.theta, 0.04);
    assert_eq!(data.heston.xi, 0.3);
    assert_eq!(data.heston.kappa, 2.0);
    assert_eq!(data.heston.rho, -0.5);
    assert_eq!(data.jumps.lambda, 0.1);
    assert_eq!(data.jumps.mu_j, 0.0);
    assert_eq!(data.jumps.sigma_j, 0.02);
    assert_eq!(data.jumps.kind, JumpKind::Merton);
    assert_eq!(data.regime.current, Regime::Bull);
    assert_eq!(data.regime.probabilities, [0.5, 0.5]);
    assert_eq!(data, CalibrationData::default_bundle(now()));
}

#[test]
fn partial_feed_also_degrades() {
    let partial = CandleSet {
        minute: synthetic_candles(60_000, 60, 60_000.0, 0.002),
        hour: Vec::new(),
        day: synthetic_candles(86_400_000, 7, 60_000.0, 0.03),
    };
    let data = calibrate(&partial, now());
    assert!(data.degraded);
}

#[test]
fn degraded_bundle_still_builds_valid_inputs() {
    let data = CalibrationData::default_bundle(now());
    assert!(data.heston.validate().is_ok());
    assert!(data.jumps.validate().is_ok());
}
