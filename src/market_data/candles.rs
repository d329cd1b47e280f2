// OHLCV candles as consumed by the calibrator. Series arrive already
// parsed; validation happens once at this boundary and nowhere else.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn validate(&self) -> Result<(), EngineError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(EngineError::invalid("candle prices must be positive"));
        }
        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        if self.low > body_low || body_high > self.high {
            return Err(EngineError::invalid(
                "candle must satisfy low <= min(open, close) <= max(open, close) <= high",
            ));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(EngineError::invalid("candle volume must be >= 0"));
        }
        Ok(())
    }
}

/// Validate a whole series: every candle well-formed, times strictly
/// increasing.
pub fn validate_series(candles: &[Candle]) -> Result<(), EngineError> {
    for candle in candles {
        candle.validate()?;
    }
    for pair in candles.windows(2) {
        if pair[1].time_ms <= pair[0].time_ms {
            return Err(EngineError::invalid(
                "candle times must be strictly increasing",
            ));
        }
    }
    Ok(())
}

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// The three granularities the calibrator consumes: nominally 60 s × 60,
/// 3600 s × 24, 86400 s × 7.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSet {
    pub minute: Vec<Candle>,
    pub hour: Vec<Candle>,
    pub day: Vec<Candle>,
}

impl CandleSet {
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_series(&self.minute)?;
        validate_series(&self.hour)?;
        validate_series(&self.day)
    }
}
