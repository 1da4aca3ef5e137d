//! Relative Strength Index (RSI), simple-mean variant.
//!
//! Average gain and average loss are plain rolling means over the last
//! `period` price changes, not Wilder-smoothed.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 → RSI = 100; both averages zero → no value.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];

        if n <= self.period {
            return result;
        }

        // gains[i] / losses[i] hold the change from bar i-1 to bar i
        let mut gains = vec![0.0; n];
        let mut losses = vec![0.0; n];
        for i in 1..n {
            let change = closes[i] - closes[i - 1];
            if change > 0.0 {
                gains[i] = change;
            } else if change < 0.0 {
                losses[i] = -change;
            }
        }

        let period = self.period as f64;
        for i in self.period..n {
            let start = i + 1 - self.period;
            let avg_gain = gains[start..=i].iter().sum::<f64>() / period;
            let avg_loss = losses[start..=i].iter().sum::<f64>() / period;
            result[i] = oscillator_value(avg_gain, avg_loss);
        }

        result
    }
}

fn oscillator_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            None
        } else {
            Some(100.0)
        }
    } else {
        Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rsi_all_gains() {
        let result = Rsi::new(3).compute(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        assert_approx(result[3].unwrap(), 100.0, DEFAULT_EPSILON);
        assert_approx(result[5].unwrap(), 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_all_losses() {
        let result = Rsi::new(3).compute(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        assert_approx(result[3].unwrap(), 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_simple_mean_window() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // RSI[3]: gains 0.34, losses 0.73 → 100 - 100/(1 + 0.34/0.73)
        // RSI[4]: window drops +0.34, adds +0.72 → gains 0.72, losses 0.73
        let result = Rsi::new(3).compute(&[44.0, 44.34, 44.09, 43.61, 44.33]);

        assert!(result[..3].iter().all(|v| v.is_none()));
        assert_approx(result[3].unwrap(), 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-6);
        assert_approx(result[4].unwrap(), 100.0 - 100.0 / (1.0 + 0.72 / 0.73), 1e-6);
    }

    #[test]
    fn rsi_flat_window_is_undefined() {
        let result = Rsi::new(2).compute(&[10.0, 11.0, 11.0, 11.0, 12.0]);
        // Window of bar 3 holds changes 0, 0
        assert!(result[3].is_none());
        assert_approx(result[4].unwrap(), 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_constant_series_never_defined() {
        let result = Rsi::new(4).compute(&[7.0; 12]);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn rsi_bounds() {
        let result = Rsi::new(3).compute(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        for (i, v) in result.iter().enumerate() {
            if let Some(v) = v {
                assert!((0.0..=100.0).contains(v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_too_few_bars() {
        let result = Rsi::new(5).compute(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
    }
}
