// Seeded random streams for the simulation.
//
// One Xoshiro256++ stream per (batch, substream) pair, derived from the base
// seed with a SplitMix64 finalizer chain. A stream's output depends only on
// its indices, which is what makes batch results reproducible and
// thread-count independent.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::f64::consts::PI;

/// SplitMix64 finalizer. Full avalanche: adjacent inputs map to
/// uncorrelated outputs, so neighbouring batch indices cannot produce
/// overlapping streams.
#[inline]
fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Deterministic seed for the stream at (batch, substream).
pub fn stream_seed(base_seed: u64, batch: u64, substream: u64) -> u64 {
    let mut z = splitmix64(base_seed);
    z = splitmix64(z.wrapping_add(batch.wrapping_mul(0x9e3779b97f4a7c15)));
    splitmix64(z.wrapping_add(substream.wrapping_mul(0xbf58476d1ce4e5b9)))
}

/// Per-stream sampler. Cheap to construct (one seed expansion), no global
/// state, single-threaded by construction.
pub struct PathRng {
    inner: Xoshiro256PlusPlus,
}

impl PathRng {
    pub fn new(seed: u64) -> Self {
        PathRng {
            inner: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    pub fn for_stream(base_seed: u64, batch: u64, substream: u64) -> Self {
        PathRng::new(stream_seed(base_seed, batch, substream))
    }

    /// Uniform draw in [0, 1).
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Standard normal via Box-Muller. The uniform is floored at machine
    /// epsilon so ln() never sees zero.
    #[inline]
    pub fn normal(&mut self) -> f64 {
        let u1 = self.uniform().max(f64::EPSILON);
        let u2 = self.uniform();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Pair of standard normals with correlation `rho`, via the 2×2
    /// Cholesky factor: Z2 = ρ·Z1 + √(1−ρ²)·W.
    #[inline]
    pub fn normal_pair(&mut self, rho: f64) -> (f64, f64) {
        let z1 = self.normal();
        let w = self.normal();
        let z2 = rho * z1 + (1.0 - rho * rho).sqrt() * w;
        (z1, z2)
    }

    /// Poisson draw by Knuth's product method. Adequate for mean ≤ 30;
    /// per-step jump means here are ≪ 1.
    pub fn poisson(&mut self, mean: f64) -> u32 {
        if mean <= 0.0 {
            return 0;
        }
        let limit = (-mean).exp();
        let mut k = 0u32;
        let mut product = 1.0;
        loop {
            product *= self.uniform();
            if product <= limit {
                return k;
            }
            k += 1;
        }
    }

    /// Discrete draw proportional to `weights`. Weights need not be
    /// normalized; all-zero weights fall through to the last index.
    pub fn categorical(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut point = self.uniform() * total;
        for (i, &w) in weights.iter().enumerate() {
            point -= w;
            if point < 0.0 {
                return i;
            }
        }
        weights.len() - 1
    }
}
