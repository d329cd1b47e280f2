// Calibration module - fits model parameters to candle history

pub mod jumps;
pub mod realized_vol;
pub mod regime;

pub use regime::RegimeSnapshot;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::market_data::candles::{closes, CandleSet};
use crate::models::params::{HestonParams, JumpParams};

const THETA_MIN: f64 = 1e-4;
const THETA_MAX: f64 = 0.25;
const KAPPA_MIN: f64 = 0.5;
const KAPPA_MAX: f64 = 5.0;
const XI_MIN: f64 = 0.1;
const XI_MAX: f64 = 1.0;

/// Fixed price/variance correlation; crypto spot shows the same leverage
/// sign as equities at these horizons.
const RHO: f64 = -0.5;

/// Intraday-vs-daily divergence that flips mean reversion to the fast
/// setting.
const DIVERGENCE_THRESHOLD: f64 = 0.01;

/// Everything the simulation assembly needs from history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationData {
    /// Blended close-to-close / Parkinson estimate, per hourly bar.
    pub daily_rv: f64,
    /// Sample stddev of daily returns.
    pub weekly_rv: f64,
    /// EWMA of minute returns.
    pub intraday_rv: f64,
    pub heston: HestonParams,
    pub jumps: JumpParams,
    pub regime: RegimeSnapshot,
    /// True when the default bundle was substituted for unusable input.
    pub degraded: bool,
    pub timestamp: DateTime<Utc>,
}

impl CalibrationData {
    /// Documented fallback bundle, used whenever candle input is missing or
    /// unusable. Matches a calm 20%-annualized BTC hour.
    pub fn default_bundle(timestamp: DateTime<Utc>) -> Self {
        CalibrationData {
            daily_rv: 0.2,
            weekly_rv: 0.2,
            intraday_rv: 0.2,
            heston: HestonParams {
                kappa: 2.0,
                theta: 0.04,
                xi: 0.3,
                rho: RHO,
            },
            jumps: jumps::default_jumps(),
            regime: RegimeSnapshot::neutral(),
            degraded: true,
            timestamp,
        }
    }
}

/// Calibrate from the three candle series. Never fails: unusable input
/// degrades to the default bundle with the `degraded` flag set.
pub fn calibrate(candles: &CandleSet, timestamp: DateTime<Utc>) -> CalibrationData {
    if let Err(err) = candles.validate() {
        warn!("calibration input rejected ({}); using default bundle", err);
        return CalibrationData::default_bundle(timestamp);
    }

    let minute_returns = realized_vol::log_returns(&closes(&candles.minute));
    let hourly_returns = realized_vol::log_returns(&closes(&candles.hour));
    let daily_returns = realized_vol::log_returns(&closes(&candles.day));

    if minute_returns.len() < 2 || hourly_returns.len() < 2 || daily_returns.len() < 2 {
        warn!(
            "calibration window too short (minute={}, hour={}, day={}); using default bundle",
            minute_returns.len(),
            hourly_returns.len(),
            daily_returns.len()
        );
        return CalibrationData::default_bundle(timestamp);
    }

    let intraday_rv = realized_vol::ewma_vol(&minute_returns, realized_vol::EWMA_LAMBDA);
    let daily_base = realized_vol::sample_stddev(&hourly_returns);
    let parkinson_daily = realized_vol::parkinson(&candles.hour);
    let daily_rv = realized_vol::blended_daily(daily_base, parkinson_daily);
    let weekly_rv = realized_vol::sample_stddev(&daily_returns);

    if daily_rv <= 0.0 {
        warn!("flat candle history (daily RV = 0); using default bundle");
        return CalibrationData::default_bundle(timestamp);
    }

    let divergence = (intraday_rv - daily_rv).abs();
    let kappa: f64 = if divergence > DIVERGENCE_THRESHOLD { 3.0 } else { 2.0 };
    let heston = HestonParams {
        kappa: kappa.clamp(KAPPA_MIN, KAPPA_MAX),
        theta: (0.7 * daily_rv * daily_rv + 0.3 * weekly_rv * weekly_rv)
            .clamp(THETA_MIN, THETA_MAX),
        xi: (divergence / daily_rv).clamp(XI_MIN, XI_MAX),
        rho: RHO,
    };

    CalibrationData {
        daily_rv,
        weekly_rv,
        intraday_rv,
        heston,
        jumps: jumps::estimate(&minute_returns),
        regime: regime::classify(&minute_returns),
        degraded: false,
        timestamp,
    }
}
