// Realized-volatility estimator family: close-to-close stddev, EWMA, and
// the Parkinson high/low range estimator. All returns are log returns and
// all volatilities are per-bar of the series they were estimated from.

use crate::market_data::candles::Candle;

/// RiskMetrics decay for the intraday EWMA.
pub const EWMA_LAMBDA: f64 = 0.94;

/// Log returns ln(close_i / close_{i-1}); bars with non-positive closes are
/// skipped rather than poisoning the series.
pub fn log_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0]).ln())
        .collect()
}

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Unbiased (n−1) sample standard deviation; 0 for fewer than two points.
pub fn sample_stddev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

/// EWMA volatility: σ²₀ = r₀², σ²ᵢ = λ·σ²ᵢ₋₁ + (1−λ)·rᵢ².
pub fn ewma_vol(returns: &[f64], lambda: f64) -> f64 {
    let mut iter = returns.iter();
    let Some(first) = iter.next() else {
        return 0.0;
    };
    let mut var = first * first;
    for r in iter {
        var = lambda * var + (1.0 - lambda) * r * r;
    }
    var.sqrt()
}

/// Parkinson range estimator over the bars' high/low extremes:
/// √( (1 / (4·ln2·n)) · Σ ln(high/low)² ).
pub fn parkinson(candles: &[Candle]) -> f64 {
    let terms: Vec<f64> = candles
        .iter()
        .filter(|c| c.low > 0.0 && c.high >= c.low)
        .map(|c| (c.high / c.low).ln().powi(2))
        .collect();
    if terms.is_empty() {
        return 0.0;
    }
    let n = terms.len() as f64;
    (terms.iter().sum::<f64>() / (4.0 * std::f64::consts::LN_2 * n)).sqrt()
}

/// 70/30 blend of close-to-close and range-based estimates.
pub fn blended_daily(close_to_close: f64, parkinson_vol: f64) -> f64 {
    0.7 * close_to_close + 0.3 * parkinson_vol
}
