// Engine-wide error taxonomy.
//
// Calibration input failure is deliberately absent: the calibrator absorbs
// it into a degraded default bundle instead of failing the pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A parameter violates a data-model invariant. Rejected before any
    /// path is drawn; never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// More than 1% of simulated paths hit NaN/Inf and were discarded.
    #[error("numerical fault: {faulted} of {total} paths aborted")]
    NumericalFault { faulted: usize, total: usize },

    /// Cooperative cancellation completed; no result was produced.
    #[error("simulation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }
}
