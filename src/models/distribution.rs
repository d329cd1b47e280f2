// Terminal-price distribution summary: one-pass moments, fixed-width
// histogram, and a handful of representative trajectories.

use serde::{Deserialize, Serialize};

use crate::models::kernel::{PathPoint, PathSample};

pub const HISTOGRAM_BINS: usize = 40;

/// Width floor for a degenerate [min, max] span.
const DEGENERATE_SPAN: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Bin midpoint price.
    pub price: f64,
    /// Relative frequency; all bins sum to 1.
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub mean: f64,
    pub stddev: f64,
    pub histogram: Vec<HistogramBin>,
    pub sample_paths: Vec<PathSample>,
}

impl Distribution {
    /// Total histogram mass inside [low, high], by bin midpoint.
    pub fn mass_between(&self, low: f64, high: f64) -> f64 {
        self.histogram
            .iter()
            .filter(|bin| bin.price >= low && bin.price <= high)
            .map(|bin| bin.probability)
            .sum()
    }
}

/// Build the summary from every terminal price plus the retained
/// trajectories. Returns `None` for an empty run.
pub fn summarize(
    terminals: &[f64],
    sample_paths: Vec<PathSample>,
    max_points: usize,
) -> Option<Distribution> {
    if terminals.is_empty() {
        return None;
    }

    // Welford one-pass mean / M2.
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &t) in terminals.iter().enumerate() {
        let delta = t - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (t - mean);
    }
    let stddev = if terminals.len() > 1 {
        (m2 / (terminals.len() - 1) as f64).sqrt()
    } else {
        0.0
    };

    let min = terminals.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = terminals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = if max - min > 0.0 {
        max - min
    } else {
        DEGENERATE_SPAN
    };
    let bin_width = span / HISTOGRAM_BINS as f64;

    let mut counts = [0usize; HISTOGRAM_BINS];
    for &t in terminals {
        let idx = (((t - min) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        counts[idx] += 1;
    }

    let n = terminals.len() as f64;
    let histogram = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBin {
            price: min + (i as f64 + 0.5) * bin_width,
            probability: count as f64 / n,
        })
        .collect();

    let sample_paths = sample_paths
        .into_iter()
        .map(|path| downsample(&path, max_points))
        .collect();

    Some(Distribution {
        mean,
        stddev,
        histogram,
        sample_paths,
    })
}

/// Uniform-stride downsampling to at most `max_points`, always keeping the
/// first and last point.
pub fn downsample(path: &PathSample, max_points: usize) -> PathSample {
    if path.len() <= max_points || max_points < 2 {
        return path.clone();
    }
    let stride = (path.len() - 1).div_ceil(max_points - 1);
    let mut out: Vec<PathPoint> = path.iter().step_by(stride).cloned().collect();
    let last = *path.last().expect("non-empty path");
    if out.last().map(|p| p.t_hours) != Some(last.t_hours) {
        out.push(last);
    }
    out
}
