// Binary-market descriptor as received from the market data boundary.
// Exactly one of strike or range pair must be populated; the untyped form
// stops here and the core only ever sees the Target sum type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::target::Target;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDescriptor {
    pub ticker: String,
    pub close_time: DateTime<Utc>,
    #[serde(default)]
    pub strike_price: Option<f64>,
    #[serde(default)]
    pub range_low: Option<f64>,
    #[serde(default)]
    pub range_high: Option<f64>,
}

impl MarketDescriptor {
    /// Resolve the settlement target, rejecting descriptors that populate
    /// both shapes, neither, or half a range.
    pub fn target(&self) -> Result<Target, EngineError> {
        let target = match (self.strike_price, self.range_low, self.range_high) {
            (Some(strike), None, None) => Target::Above { strike },
            (None, Some(low), Some(high)) => Target::Range { low, high },
            (None, None, None) => {
                return Err(EngineError::invalid(format!(
                    "market {} has neither strike nor range",
                    self.ticker
                )))
            }
            _ => {
                return Err(EngineError::invalid(format!(
                    "market {} must populate exactly one of strike or range",
                    self.ticker
                )))
            }
        };
        target.validate()?;
        Ok(target)
    }

    /// Hours until settlement; negative or zero horizons are rejected.
    pub fn hours_to_close(&self, now: DateTime<Utc>) -> Result<f64, EngineError> {
        let seconds = (self.close_time - now).num_milliseconds() as f64 / 1000.0;
        if seconds <= 0.0 {
            return Err(EngineError::invalid(format!(
                "market {} already closed",
                self.ticker
            )));
        }
        Ok(seconds / 3600.0)
    }
}
