// Monte Carlo driver: partitions the run into batches, fans each batch out
// over a fixed set of substreams, merges accumulators in substream order,
// and reports cumulative progress after every batch.
//
// Determinism contract: the result is a pure function of (inputs, target,
// config, base_seed). Substream count is a compile-time constant, every
// substream owns its RNG, and merges happen in index order, so the output
// is bit-identical whether rayon runs on one thread or sixty-four.

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::SimConfig;
use crate::error::EngineError;
use crate::models::distribution::{self, Distribution};
use crate::models::kernel::{PathKernel, PathSample};
use crate::models::params::SimInputs;
use crate::models::pricer;
use crate::models::rng::PathRng;
use crate::models::target::Target;

/// Substreams per batch. Fixed (not the machine's thread count) so results
/// never depend on where the code runs.
pub const SUBSTREAMS: usize = 8;

/// Job-level fault budget: above this fraction of faulted paths the run is
/// considered numerically broken and fails instead of returning a result.
const FAULT_BUDGET: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub batch: usize,
    pub n_batches: usize,
    pub cumulative_n: u64,
    pub cumulative_hits: u64,
    pub running_p: f64,
    pub running_ci: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub stderr: f64,
    pub n_paths: u64,
    pub faulted_paths: u64,
    pub clamped_steps: u64,
    pub compensator_applied: bool,
    pub kou_reduced_to_merton: bool,
    /// Running p̂ after each batch, in batch order.
    pub convergence: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimResult {
    pub target: Target,
    pub p: f64,
    pub ci: (f64, f64),
    pub fair_cents: u8,
    pub diagnostics: Diagnostics,
    pub distribution: Option<Distribution>,
}

/// Per-substream accumulator, merged in index order.
struct SubstreamStats {
    hits: u64,
    n: u64,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
    faults: u64,
    clamped: u64,
    terminals: Vec<f64>,
    samples: Vec<PathSample>,
}

#[allow(clippy::too_many_arguments)]
fn run_substream(
    kernel: &PathKernel,
    target: Target,
    base_seed: u64,
    batch: usize,
    substream: usize,
    paths: usize,
    keep_terminals: bool,
    sample_quota: usize,
) -> SubstreamStats {
    let mut rng = PathRng::for_stream(base_seed, batch as u64, substream as u64);
    let mut stats = SubstreamStats {
        hits: 0,
        n: 0,
        sum: 0.0,
        sum_sq: 0.0,
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
        faults: 0,
        clamped: 0,
        terminals: if keep_terminals {
            Vec::with_capacity(paths)
        } else {
            Vec::new()
        },
        samples: Vec::new(),
    };

    let mut produced = 0usize;
    while produced < paths {
        let capture = stats.samples.len() < sample_quota;
        match kernel.simulate(&mut rng, capture) {
            Ok(outcome) => {
                stats.n += 1;
                stats.hits += u64::from(target.is_hit(outcome.terminal));
                stats.sum += outcome.terminal;
                stats.sum_sq += outcome.terminal * outcome.terminal;
                stats.min = stats.min.min(outcome.terminal);
                stats.max = stats.max.max(outcome.terminal);
                stats.clamped += outcome.clamped_steps as u64;
                if keep_terminals {
                    stats.terminals.push(outcome.terminal);
                }
                if let Some(sample) = outcome.sample {
                    stats.samples.push(sample);
                }
                produced += 1;
            }
            Err(_) => {
                // Replace the path with the next draws from the same
                // stream. Bail once faults outnumber the requested paths so
                // a fully broken bundle cannot spin forever.
                stats.faults += 1;
                if stats.faults > paths as u64 {
                    break;
                }
            }
        }
    }
    stats
}

/// Run the full simulation. `on_progress` fires after each batch, in batch
/// order, before the final result is returned.
pub fn run_simulation(
    inputs: &SimInputs,
    target: Target,
    config: &SimConfig,
    base_seed: u64,
    cancel: &AtomicBool,
    mut on_progress: impl FnMut(ProgressSnapshot),
) -> Result<SimResult, EngineError> {
    inputs.validate()?;
    target.validate()?;
    config.validate()?;

    let kernel = PathKernel::new(inputs, config.compensator);
    let z = config.confidence.z();
    let per_batch = config.n_paths.div_ceil(config.n_batches);

    let mut hits = 0u64;
    let mut n = 0u64;
    let mut faults = 0u64;
    let mut clamped = 0u64;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut terminals: Vec<f64> = Vec::new();
    let mut samples: Vec<PathSample> = Vec::new();
    let mut convergence = Vec::with_capacity(config.n_batches);

    for batch in 0..config.n_batches {
        // Cooperative cancellation, checked only between batches.
        if cancel.load(Ordering::Relaxed) {
            debug!("simulation cancelled after {} of {} batches", batch, config.n_batches);
            return Err(EngineError::Cancelled);
        }

        let done = batch * per_batch;
        let batch_paths = per_batch.min(config.n_paths.saturating_sub(done));
        let sample_quota = if config.capture_distribution {
            config.sample_paths.saturating_sub(samples.len())
        } else {
            0
        };

        // Fan out over the fixed substreams; rayon preserves index order in
        // the collected Vec, so the merge below is deterministic.
        let stats: Vec<SubstreamStats> = (0..SUBSTREAMS)
            .into_par_iter()
            .map(|substream| {
                let share = batch_paths / SUBSTREAMS
                    + usize::from(substream < batch_paths % SUBSTREAMS);
                run_substream(
                    &kernel,
                    target,
                    base_seed,
                    batch,
                    substream,
                    share,
                    config.capture_distribution,
                    sample_quota,
                )
            })
            .collect();

        for s in stats {
            hits += s.hits;
            n += s.n;
            faults += s.faults;
            clamped += s.clamped;
            sum += s.sum;
            sum_sq += s.sum_sq;
            min = min.min(s.min);
            max = max.max(s.max);
            if config.capture_distribution {
                terminals.extend_from_slice(&s.terminals);
            }
            for sample in s.samples {
                if samples.len() < config.sample_paths {
                    samples.push(sample);
                }
            }
        }

        let snapshot = ProgressSnapshot {
            batch,
            n_batches: config.n_batches,
            cumulative_n: n,
            cumulative_hits: hits,
            running_p: if n == 0 { 0.0 } else { hits as f64 / n as f64 },
            running_ci: pricer::wilson_interval(hits, n, z),
        };
        convergence.push(snapshot.running_p);
        let mean = if n > 0 { sum / n as f64 } else { f64::NAN };
        let spread = if n > 1 {
            ((sum_sq - sum * mean) / (n - 1) as f64).max(0.0).sqrt()
        } else {
            0.0
        };
        debug!(
            "batch {}/{}: n={} hits={} p={:.4} terminal mean={:.2} sd={:.2} range=[{:.2}, {:.2}]",
            batch + 1,
            config.n_batches,
            n,
            hits,
            snapshot.running_p,
            mean,
            spread,
            min,
            max
        );
        on_progress(snapshot);

        if faults > 0 && (faults as f64) > FAULT_BUDGET * (n + faults) as f64 {
            warn!("aborting: {} faulted paths against {} completed", faults, n);
            return Err(EngineError::NumericalFault {
                faulted: faults as usize,
                total: (n + faults) as usize,
            });
        }
    }

    let summary = pricer::summarize(hits, n, z);
    let distribution = if config.capture_distribution {
        distribution::summarize(&terminals, samples, config.path_points)
    } else {
        None
    };

    Ok(SimResult {
        target,
        p: summary.p,
        ci: summary.ci,
        fair_cents: summary.fair_cents,
        diagnostics: Diagnostics {
            stderr: summary.stderr,
            n_paths: n,
            faulted_paths: faults,
            clamped_steps: clamped,
            compensator_applied: config.compensator,
            kou_reduced_to_merton: kernel.kou_reduced(),
            convergence,
        },
        distribution,
    })
}
