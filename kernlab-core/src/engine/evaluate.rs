//! Evaluation facade: the unit an optimizer calls once per trial.

use thiserror::Error;

use crate::divergence::{detect_divergences, DivergenceConfig};
use crate::domain::{BacktestResult, ParamError, ParameterSet, PriceBar};
use crate::engine::simulator::{simulate, SimulatorConfig};
use crate::indicators::annotate;
use crate::signals::generate_signals;

/// Caller contract violations.
///
/// A window that does not fit the series is not an error; it produces
/// `BacktestResult::degenerate()`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("invalid parameters: {0}")]
    Parameters(#[from] ParamError),

    #[error("timestamps must strictly increase: bar {index} is not after its predecessor")]
    NonMonotonicTimestamps { index: usize },

    #[error("close at bar {index} must be finite and > 0, got {value}")]
    InvalidPrice { index: usize, value: f64 },

    #[error("initial balance must be finite and > 0, got {0}")]
    InvalidBalance(f64),

    #[error("fee must be within [0, 1), got {0}")]
    InvalidFee(f64),
}

/// Evaluate one parameter set against a price history.
///
/// Pure and deterministic: no I/O, no shared state, safe to call concurrently
/// on the same series. Returns the degenerate result when
/// `params.kr_window >= bars.len()`, which includes empty and single-bar input.
pub fn evaluate(
    bars: &[PriceBar],
    params: &ParameterSet,
    initial_balance: f64,
    fee: f64,
) -> Result<BacktestResult, EvalError> {
    check_contract(bars, params, initial_balance, fee)?;

    if params.kr_window >= bars.len() {
        tracing::debug!(
            kr_window = params.kr_window,
            bars = bars.len(),
            "regression window does not fit the series"
        );
        return Ok(BacktestResult::degenerate());
    }

    let mut annotated = annotate(bars, params);

    let closes: Vec<f64> = annotated.iter().map(|b| b.close).collect();
    let oscillator: Vec<Option<f64>> = annotated.iter().map(|b| b.oscillator).collect();
    let divergences = detect_divergences(
        &closes,
        &oscillator,
        &DivergenceConfig {
            extrema_order: params.extrema_order,
            oversold: f64::from(params.rsi_oversold),
            overbought: f64::from(params.rsi_overbought),
        },
    );

    generate_signals(&mut annotated, &divergences);

    let filtered: Vec<_> = annotated.iter().map(|b| b.filtered_signal).collect();
    let outcome = simulate(
        bars,
        &filtered,
        &SimulatorConfig {
            initial_balance,
            fee,
        },
    );

    Ok(BacktestResult {
        profit_pct: outcome.profit_pct,
        final_value: outcome.final_value,
        trades: outcome.trades,
        bars: annotated,
        divergences,
    })
}

fn check_contract(
    bars: &[PriceBar],
    params: &ParameterSet,
    initial_balance: f64,
    fee: f64,
) -> Result<(), EvalError> {
    params.validate()?;

    if !(initial_balance.is_finite() && initial_balance > 0.0) {
        return Err(EvalError::InvalidBalance(initial_balance));
    }
    if !(0.0..1.0).contains(&fee) {
        return Err(EvalError::InvalidFee(fee));
    }
    if let Some((index, bar)) = bars.iter().enumerate().find(|(_, b)| !b.is_tradable()) {
        return Err(EvalError::InvalidPrice {
            index,
            value: bar.close,
        });
    }
    if let Some(index) = bars
        .windows(2)
        .position(|w| w[1].timestamp <= w[0].timestamp)
    {
        return Err(EvalError::NonMonotonicTimestamps { index: index + 1 });
    }
    Ok(())
}
