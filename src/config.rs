use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::EngineError;

/// Confidence level for the Wilson interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConfidenceLevel {
    #[default]
    NinetyFive,
    NinetyNine,
}

impl ConfidenceLevel {
    pub fn z(self) -> f64 {
        match self {
            ConfidenceLevel::NinetyFive => 1.96,
            ConfidenceLevel::NinetyNine => 2.576,
        }
    }
}

/// Simulation run configuration. Everything that shapes a run but is not a
/// model parameter lives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Total number of Monte Carlo paths.
    pub n_paths: usize,
    /// Number of progress batches the paths are partitioned into.
    pub n_batches: usize,
    /// Base seed; `None` resolves to wall-clock nanoseconds at submit time.
    pub base_seed: Option<u64>,
    /// Capture terminal distribution + sample paths into the result.
    pub capture_distribution: bool,
    /// Number of sample trajectories retained for the distribution summary.
    pub sample_paths: usize,
    /// Maximum points per retained trajectory after downsampling.
    pub path_points: usize,
    /// Subtract the Merton jump-drift compensator from the per-step drift.
    /// The source system never did; default stays off.
    pub compensator: bool,
    pub confidence: ConfidenceLevel,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            n_paths: 20_000,
            n_batches: 10,
            base_seed: None,
            capture_distribution: false,
            sample_paths: 15,
            path_points: 60,
            compensator: false,
            confidence: ConfidenceLevel::NinetyFive,
        }
    }
}

impl SimConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.n_paths == 0 {
            return Err(EngineError::invalid("n_paths must be at least 1"));
        }
        if self.n_batches == 0 {
            return Err(EngineError::invalid("n_batches must be at least 1"));
        }
        if self.path_points < 2 {
            return Err(EngineError::invalid(
                "path_points must be at least 2 (start and terminal)",
            ));
        }
        Ok(())
    }
}
