use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Settlement region of a binary contract. Tagged sum type; shape is never
/// inferred from optional-field presence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Target {
    /// Hit ⇔ terminal price ≥ strike.
    Above { strike: f64 },
    /// Hit ⇔ low ≤ terminal price ≤ high, inclusive on both ends.
    Range { low: f64, high: f64 },
}

impl Target {
    pub fn validate(&self) -> Result<(), EngineError> {
        match *self {
            Target::Above { strike } => {
                if !strike.is_finite() || strike <= 0.0 {
                    return Err(EngineError::invalid("strike must be positive and finite"));
                }
            }
            Target::Range { low, high } => {
                if !low.is_finite() || !high.is_finite() || low <= 0.0 || low >= high {
                    return Err(EngineError::invalid(
                        "range bounds must satisfy 0 < low < high",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Pure terminal-price evaluation.
    pub fn is_hit(&self, terminal: f64) -> bool {
        match *self {
            Target::Above { strike } => terminal >= strike,
            Target::Range { low, high } => low <= terminal && terminal <= high,
        }
    }
}
