//! Volatility band width: rolling sample standard deviation of close times a multiplier.
//!
//! Uses sample stddev (divide by N - 1).
//! Lookback: period - 1.

use super::Indicator;

/// Window of the band's standard deviation.
pub const BAND_PERIOD: usize = 20;

#[derive(Debug, Clone)]
pub struct VolatilityBand {
    period: usize,
    multiplier: f64,
    name: String,
}

impl VolatilityBand {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 2, "volatility band period must be >= 2");
        Self {
            period,
            multiplier,
            name: format!("volatility_band_{period}_{multiplier}"),
        }
    }
}

impl Indicator for VolatilityBand {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];

        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &closes[i + 1 - self.period..=i];
            result[i] = Some(sample_std(window) * self.multiplier);
        }

        result
    }
}

/// Sample standard deviation, accumulated relative to the first element so a
/// flat window gives exactly zero.
fn sample_std(window: &[f64]) -> f64 {
    let shift = window[0];
    let len = window.len() as f64;
    let (sum, sum_sq) = window.iter().fold((0.0, 0.0), |(s, sq), &x| {
        let d = x - shift;
        (s + d, sq + d * d)
    });
    let variance = (sum_sq - sum * sum / len) / (len - 1.0);
    variance.max(0.0).sqrt()
}
