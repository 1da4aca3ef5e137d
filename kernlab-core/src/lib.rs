//! KernLab Core: kernel-regression and oscillator-divergence backtest evaluation.
//!
//! This crate contains the pure evaluation path:
//! - Domain types (price bars, parameters, signals, trades, results)
//! - Indicator engine: simple-mean RSI, rolling local-linear kernel regression,
//!   volatility band width
//! - Divergence detection over local price extrema
//! - Signal generation with divergence overlay and alternation filter
//! - All-in/all-out trade simulation with a one-bar execution lag
//!
//! Nothing here performs I/O. `evaluate` is deterministic and can be called
//! from many threads on a shared series.

pub mod divergence;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod indicators;
pub mod signals;

pub use domain::{
    AnnotatedBar, BacktestResult, DivergenceEvent, DivergenceKind, ParamError, ParameterSet,
    PriceBar, Signal, Trade, TradeSide,
};
pub use engine::{evaluate, EvalError};
pub use fingerprint::ParamsFingerprint;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: every type handed across optimizer worker threads
    /// is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<PriceBar>();
        require_sync::<PriceBar>();
        require_send::<ParameterSet>();
        require_sync::<ParameterSet>();
        require_send::<AnnotatedBar>();
        require_sync::<AnnotatedBar>();
        require_send::<DivergenceEvent>();
        require_sync::<DivergenceEvent>();
        require_send::<Trade>();
        require_sync::<Trade>();
        require_send::<BacktestResult>();
        require_sync::<BacktestResult>();

        // Errors and identity
        require_send::<EvalError>();
        require_sync::<EvalError>();
        require_send::<ParamsFingerprint>();
        require_sync::<ParamsFingerprint>();

        // Indicators are shared as trait objects
        require_send::<Box<dyn indicators::Indicator>>();
        require_sync::<Box<dyn indicators::Indicator>>();
    }

    /// Architecture contract: the evaluation facade takes only borrowed input
    /// and plain values, so one series can be shared by every trial.
    #[test]
    fn evaluate_borrows_the_series() {
        fn _check_signature(
            f: fn(&[PriceBar], &ParameterSet, f64, f64) -> Result<BacktestResult, EvalError>,
        ) -> fn(&[PriceBar], &ParameterSet, f64, f64) -> Result<BacktestResult, EvalError> {
            f
        }
        let _ = _check_signature(evaluate);
    }
}
