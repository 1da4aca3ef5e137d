//! Indicator engine.
//!
//! Three indicators implement the `Indicator` trait and are computed once per
//! evaluation over the full close series:
//! - `Rsi`: simple-mean oscillator
//! - `KernelRegression`: local-linear fit refit on every bar
//! - `VolatilityBand`: 20-bar sample standard deviation times `bb_k`
//!
//! `annotate` runs all three and zips them into `AnnotatedBar`s. Signal fields
//! are left at `Hold`; the signal generator fills them afterwards.

pub mod kernel_regression;
pub mod rsi;
pub mod volatility;

pub use kernel_regression::KernelRegression;
pub use rsi::Rsi;
pub use volatility::{VolatilityBand, BAND_PERIOD};

use crate::domain::bar::closes;
use crate::domain::{AnnotatedBar, ParameterSet, PriceBar, Signal};

/// A pure function from a close series to a per-bar value series.
///
/// The output has the same length as the input. The first `lookback()`
/// entries are `None`, and later entries may also be `None` where the value is
/// undefined. No value at bar t may depend on closes after bar t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "kernel_regression_50_5").
    fn name(&self) -> &str;

    /// Number of leading bars that never carry a value.
    fn lookback(&self) -> usize;

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>>;
}

/// Run the three indicators and build the annotated sequence.
///
/// Callers must ensure `params.kr_window < bars.len()` and that `params` is
/// valid; `evaluate` does both before calling this.
pub fn annotate(bars: &[PriceBar], params: &ParameterSet) -> Vec<AnnotatedBar> {
    let closes = closes(bars);

    let oscillator = Rsi::new(params.rsi_period).compute(&closes);
    let prediction = KernelRegression::new(params.kr_window, params.kr_bandwidth).compute(&closes);
    let band_width = VolatilityBand::new(BAND_PERIOD, params.bb_k).compute(&closes);

    let failed_fits = prediction
        .iter()
        .skip(params.kr_window)
        .filter(|p| p.is_none())
        .count();
    if failed_fits > 0 {
        tracing::trace!(failed_fits, kr_window = params.kr_window, "regression fit failures");
    }

    bars.iter()
        .enumerate()
        .map(|(i, bar)| AnnotatedBar {
            timestamp: bar.timestamp,
            close: bar.close,
            oscillator: oscillator[i],
            prediction: prediction[i],
            band_width: band_width[i],
            raw_signal: Signal::Hold,
            filtered_signal: Signal::Hold,
        })
        .collect()
}

/// Create bars on consecutive days from close prices for testing.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar::new(base_date + chrono::Duration::days(i as i64), close))
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-9;
