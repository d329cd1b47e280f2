// Cache fingerprint rounding: sub-dollar spot jitter and sub-0.05 h clock
// drift must land on the same entry; anything larger must miss.

use chrono::{TimeZone, Utc};

use bitcents::calibration::CalibrationData;
use bitcents::config::SimConfig;
use bitcents::engine::{ResultCache, Sensitivity, SimRequest};
use bitcents::models::Target;

use crate::helpers::seeded_config;

fn request(spot: f64, hours: f64) -> SimRequest {
    SimRequest {
        market_id: "BTC-3PM".to_string(),
        spot,
        hours_to_close: hours,
        target: Target::Above { strike: 60_500.0 },
        calibration: CalibrationData::default_bundle(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ),
        sensitivity: Sensitivity::default(),
        config: seeded_config(100, 1),
    }
}

fn cached_result() -> bitcents::models::SimResult {
    use std::sync::atomic::AtomicBool;
    let req = request(60_000.0, 1.0);
    let inputs = req.build_inputs().unwrap();
    let config = SimConfig {
        n_batches: 1,
        ..req.config.clone()
    };
    bitcents::models::run_simulation(&inputs, req.target, &config, 1, &AtomicBool::new(false), |_| {})
        .unwrap()
}

#[test]
fn sub_dollar_perturbation_hits() {
    let mut cache = ResultCache::new();
    cache.insert(request(60_000.0, 1.0).fingerprint(), cached_result());

    assert!(cache.get(&request(60_000.49, 1.0).fingerprint()).is_some());
    assert!(cache.get(&request(59_999.51, 1.0).fingerprint()).is_some());
}

#[test]
fn past_half_dollar_misses() {
    let mut cache = ResultCache::new();
    cache.insert(request(60_000.0, 1.0).fingerprint(), cached_result());

    assert!(cache.get(&request(60_000.51, 1.0).fingerprint()).is_none());
    assert!(cache.get(&request(59_999.49, 1.0).fingerprint()).is_none());
}

#[test]
fn small_clock_drift_hits() {
    let mut cache = ResultCache::new();
    cache.insert(request(60_000.0, 1.0).fingerprint(), cached_result());

    assert!(cache.get(&request(60_000.0, 1.04).fingerprint()).is_some());
    assert!(cache.get(&request(60_000.0, 0.96).fingerprint()).is_some());
}

#[test]
fn larger_clock_drift_misses() {
    let mut cache = ResultCache::new();
    cache.insert(request(60_000.0, 1.0).fingerprint(), cached_result());

    assert!(cache.get(&request(60_000.0, 1.06).fingerprint()).is_none());
}

#[test]
fn different_markets_never_collide() {
    let mut cache = ResultCache::new();
    cache.insert(request(60_000.0, 1.0).fingerprint(), cached_result());

    let mut other = request(60_000.0, 1.0);
    other.market_id = "BTC-4PM".to_string();
    assert!(cache.get(&other.fingerprint()).is_none());
}
