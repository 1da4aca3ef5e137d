//! Backtest runner: wires together config, loaded data, and the evaluator.
//!
//! Two entry points:
//! - `run_single()`: evaluates the config's parameters on one series. Used by
//!   `kernlab run` and to replay the best trial after a search.
//! - `run_search()`: random search over the config's search space.

use kernlab_core::{evaluate, BacktestResult, EvalError, ParameterSet, ParamsFingerprint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, RunConfig};
use crate::data_loader::{LoadError, LoadedSeries};
use crate::export::ExportError;
use crate::search::{RandomSearch, SearchProgress, SearchReport};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// Complete result of a single run, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub symbol: String,
    pub dataset_hash: String,
    pub params: ParameterSet,
    pub fingerprint: ParamsFingerprint,
    pub initial_balance: f64,
    pub fee: f64,
    pub result: BacktestResult,
}

/// Evaluate `config.params` on `series`.
pub fn run_single(config: &RunConfig, series: &LoadedSeries) -> Result<RunSummary, RunError> {
    run_with_params(config, &config.params, series)
}

/// Evaluate an explicit parameter set with the config's capital and fee.
pub fn run_with_params(
    config: &RunConfig,
    params: &ParameterSet,
    series: &LoadedSeries,
) -> Result<RunSummary, RunError> {
    let initial_balance = config.backtest.initial_balance;
    let fee = config.backtest.fee;
    let fingerprint = params.fingerprint();

    let result = evaluate(&series.bars, params, initial_balance, fee)?;
    if result.is_degenerate() {
        tracing::warn!(
            symbol = %series.symbol,
            bars = series.bars.len(),
            kr_window = params.kr_window,
            "history shorter than the regression window; result is degenerate"
        );
    }
    tracing::info!(
        symbol = %series.symbol,
        fingerprint = %fingerprint.short(),
        profit_pct = result.profit_pct,
        trades = result.trades.len(),
        "backtest finished"
    );

    Ok(RunSummary {
        symbol: series.symbol.clone(),
        dataset_hash: series.dataset_hash.clone(),
        params: *params,
        fingerprint,
        initial_balance,
        fee,
        result,
    })
}

/// Random search driven by `config.search` (or its defaults).
pub fn run_search(
    config: &RunConfig,
    series: &LoadedSeries,
    progress: Option<&dyn SearchProgress>,
) -> Result<SearchReport, RunError> {
    let section = config.search_or_default();
    section.space.validate()?;

    let search = RandomSearch::new(section.trials, section.seed)
        .with_parallelism(section.parallel)
        .with_space(section.space);
    tracing::info!(
        symbol = %series.symbol,
        trials = section.trials,
        seed = section.seed,
        "starting random search"
    );

    let report = search.run(
        &series.bars,
        &series.dataset_hash,
        config.backtest.initial_balance,
        config.backtest.fee,
        progress,
    )?;
    Ok(report)
}
