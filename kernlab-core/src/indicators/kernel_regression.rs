//! Rolling local-linear kernel regression.
//!
//! For every bar i >= window, the `window` closes immediately before i are the
//! training set, with bar index as regressor. A Gaussian-weighted least-squares
//! line is fitted and evaluated at position i, one step past the training data.
//! Each bar is refitted from scratch.
//!
//! The weighted normal equations are
//!
//! ```text
//! | S0 S1 | |a|   |T0|      Sk = Σ w_j d_j^k
//! | S1 S2 | |b| = |T1|      Tk = Σ w_j d_j^k y_j
//! ```
//!
//! with `d_j = x_j - i` and `w_j = exp(-(d_j / h)^2 / 2)`; the prediction is `a`.
//! Responses are taken relative to the last training close, so a flat window
//! reproduces its level exactly.
//!
//! Lookback: window. A singular or non-finite system is a fit failure and
//! yields no value for that bar only; this happens for window == 1 and when
//! the kernel weights underflow at very small bandwidths.

use super::Indicator;

/// Relative determinant below which the normal equations count as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct KernelRegression {
    window: usize,
    bandwidth: f64,
    name: String,
}

impl KernelRegression {
    pub fn new(window: usize, bandwidth: f64) -> Self {
        assert!(window >= 1, "kernel regression window must be >= 1");
        assert!(
            bandwidth.is_finite() && bandwidth > 0.0,
            "kernel regression bandwidth must be > 0"
        );
        Self {
            window,
            bandwidth,
            name: format!("kernel_regression_{window}_{bandwidth}"),
        }
    }
}

impl Indicator for KernelRegression {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let n = closes.len();
        let mut result = vec![None; n];

        for i in self.window..n {
            result[i] = local_linear_forecast(&closes[i - self.window..i], self.bandwidth);
        }

        result
    }
}

/// Local-linear estimate at the position one step after the last element of `ys`.
///
/// Returns `None` when the fit is numerically degenerate.
pub fn local_linear_forecast(ys: &[f64], bandwidth: f64) -> Option<f64> {
    let anchor = *ys.last()?;
    let target = ys.len() as f64;

    let (mut s0, mut s1, mut s2) = (0.0, 0.0, 0.0);
    let (mut t0, mut t1) = (0.0, 0.0);
    for (j, &y) in ys.iter().enumerate() {
        let d = j as f64 - target;
        let u = d / bandwidth;
        let w = (-0.5 * u * u).exp();
        let r = y - anchor;
        s0 += w;
        s1 += w * d;
        s2 += w * d * d;
        t0 += w * r;
        t1 += w * d * r;
    }

    let det = s0 * s2 - s1 * s1;
    if s0 <= 0.0 || !det.is_finite() || det <= SINGULAR_TOLERANCE * s0 * s2 {
        return None;
    }

    let prediction = anchor + (s2 * t0 - s1 * t1) / det;
    prediction.is_finite().then_some(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn linear_series_extrapolates_exactly() {
        let closes: Vec<f64> = (0..12).map(|i| 10.0 + 2.5 * i as f64).collect();
        let result = KernelRegression::new(5, 3.0).compute(&closes);

        assert!(result[..5].iter().all(|v| v.is_none()));
        for i in 5..12 {
            assert_approx(result[i].unwrap(), closes[i], 1e-8);
        }
    }

    #[test]
    fn flat_window_reproduces_level() {
        let result = KernelRegression::new(4, 1.5).compute(&[42.1; 10]);
        for v in &result[4..] {
            assert_eq!(*v, Some(42.1));
        }
    }

    #[test]
    fn single_point_window_is_fit_failure() {
        let result = KernelRegression::new(1, 5.0).compute(&[1.0, 2.0, 3.0, 4.0]);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn underflowing_weights_are_fit_failure() {
        // At h = 0.01 every weight underflows to zero
        assert_eq!(local_linear_forecast(&[1.0, 5.0, 2.0, 8.0], 0.01), None);
    }

    #[test]
    fn wide_bandwidth_approaches_ols() {
        // With h → ∞ all weights equal 1: ordinary least squares on 0..4
        // y = 1, 3, 2, 4 → slope 0.8, intercept 1.3, forecast at x = 4 → 4.5
        let pred = local_linear_forecast(&[1.0, 3.0, 2.0, 4.0], 1e6).unwrap();
        assert_approx(pred, 4.5, 1e-6);
    }

    #[test]
    fn two_point_window_is_line_through_points() {
        // Two points determine the line exactly regardless of weights
        let pred = local_linear_forecast(&[3.0, 5.0], 0.8).unwrap();
        assert_approx(pred, 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn kernel_regression_lookback() {
        assert_eq!(KernelRegression::new(50, 5.0).lookback(), 50);
    }
}
