// Hit counts → probability, Wilson score interval, standard error, fair
// contract value in cents.

/// Probability summary for a finished (or in-flight) simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSummary {
    pub p: f64,
    pub ci: (f64, f64),
    pub stderr: f64,
    pub fair_cents: u8,
}

/// Wilson score interval. Better behaved than the normal approximation for
/// small n and for p̂ near the boundaries, which binary markets live at.
pub fn wilson_interval(hits: u64, n: u64, z: f64) -> (f64, f64) {
    if n == 0 {
        return (0.0, 1.0);
    }
    let n = n as f64;
    let p_hat = hits as f64 / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = (p_hat + z2 / (2.0 * n)) / denom;
    let margin = z * (p_hat * (1.0 - p_hat) / n + z2 / (4.0 * n * n)).sqrt() / denom;
    ((center - margin).max(0.0), (center + margin).min(1.0))
}

pub fn standard_error(hits: u64, n: u64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p_hat = hits as f64 / n as f64;
    (p_hat * (1.0 - p_hat) / n as f64).sqrt()
}

/// Full summary; n = 0 collapses to p = 0 with the vacuous [0, 1] interval.
pub fn summarize(hits: u64, n: u64, z: f64) -> PriceSummary {
    let p = if n == 0 { 0.0 } else { hits as f64 / n as f64 };
    PriceSummary {
        p,
        ci: wilson_interval(hits, n, z),
        stderr: standard_error(hits, n),
        fair_cents: (100.0 * p).round() as u8,
    }
}

const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7; // 1 / √(2π)

fn norm_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF, Abramowitz & Stegun 26.2.17 (max error ~7.5e-8).
/// Used for analytic reference probabilities in tests; the engine itself
/// never inverts a CDF.
pub fn norm_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x.is_infinite() {
        return if x.is_sign_positive() { 1.0 } else { 0.0 };
    }
    if x >= 0.0 {
        let t = 1.0 / (1.0 + 0.2316419 * x);
        let poly = t
            * (0.319381530
                + t * (-0.356563782 + t * (1.781477937 + t * (-1.821255978 + t * 1.330274429))));
        1.0 - norm_pdf(x) * poly
    } else {
        1.0 - norm_cdf(-x)
    }
}
