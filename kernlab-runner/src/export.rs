//! Artifact export: CSV tapes and a JSON summary for one run.
//!
//! `save_artifacts` creates `<output_dir>/<symbol>_<fingerprint8>/` containing:
//! - `trades.csv`: the trade ledger
//! - `bars.csv`: per-bar indicator values and signals; empty cell = no value
//! - `divergences.csv`: detected divergence pairs with dates and closes
//! - `result.json`: parameters, headline numbers, and counts
//!
//! Re-running the same parameters on the same symbol overwrites the directory.

use std::path::{Path, PathBuf};

use kernlab_core::{AnnotatedBar, DivergenceEvent, ParameterSet, Trade};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::runner::RunSummary;

/// Current schema version of `result.json`.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Contents of `result.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultManifest {
    pub schema_version: u32,
    pub symbol: String,
    pub dataset_hash: String,
    pub fingerprint: String,
    pub params: ParameterSet,
    pub initial_balance: f64,
    pub fee: f64,
    pub profit_pct: f64,
    pub final_value: f64,
    pub bar_count: usize,
    pub trade_count: usize,
    pub round_trips: usize,
    pub win_rate: Option<f64>,
    pub divergence_count: usize,
}

impl ResultManifest {
    pub fn from_summary(summary: &RunSummary) -> Self {
        let r = &summary.result;
        Self {
            schema_version: SCHEMA_VERSION,
            symbol: summary.symbol.clone(),
            dataset_hash: summary.dataset_hash.clone(),
            fingerprint: summary.fingerprint.to_string(),
            params: summary.params,
            initial_balance: summary.initial_balance,
            fee: summary.fee,
            profit_pct: r.profit_pct,
            final_value: r.final_value,
            bar_count: r.bars.len(),
            trade_count: r.trades.len(),
            round_trips: r.round_trips(),
            win_rate: r.win_rate(),
            divergence_count: r.divergences.len(),
        }
    }
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: timestamp, bar, side, price, quantity, balance, profit
pub fn export_trades_csv(trades: &[Trade]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "timestamp", "bar", "side", "price", "quantity", "balance", "profit",
    ])?;
    for t in trades {
        wtr.write_record([
            t.timestamp.to_string(),
            t.bar_index.to_string(),
            t.side.as_str().to_string(),
            format!("{:.6}", t.price),
            format!("{:.6}", t.quantity),
            format!("{:.2}", t.balance_after),
            format!("{:.2}", t.realized_profit),
        ])?;
    }
    finish(wtr)
}

/// Columns: timestamp, close, oscillator, prediction, band, upper, lower, raw, filtered
///
/// Signals are written as -1 / 0 / 1.
pub fn export_bars_csv(bars: &[AnnotatedBar]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "timestamp",
        "close",
        "oscillator",
        "prediction",
        "band",
        "upper",
        "lower",
        "raw",
        "filtered",
    ])?;
    for b in bars {
        let (upper, lower) = b.band().unzip();
        wtr.write_record([
            b.timestamp.to_string(),
            format!("{:.6}", b.close),
            cell(b.oscillator),
            cell(b.prediction),
            cell(b.band_width),
            cell(upper),
            cell(lower),
            b.raw_signal.as_i8().to_string(),
            b.filtered_signal.as_i8().to_string(),
        ])?;
    }
    finish(wtr)
}

/// Columns: kind, start_index, start_date, start_close, end_index, end_date, end_close
pub fn export_divergences_csv(
    events: &[DivergenceEvent],
    bars: &[AnnotatedBar],
) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "kind",
        "start_index",
        "start_date",
        "start_close",
        "end_index",
        "end_date",
        "end_close",
    ])?;
    for e in events {
        let (Some(start), Some(end)) = (bars.get(e.start_index), bars.get(e.end_index)) else {
            continue;
        };
        wtr.write_record([
            e.kind.as_str().to_string(),
            e.start_index.to_string(),
            start.timestamp.to_string(),
            format!("{:.6}", start.close),
            e.end_index.to_string(),
            end.timestamp.to_string(),
            format!("{:.6}", end.close),
        ])?;
    }
    finish(wtr)
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let data = wtr.into_inner().map_err(|e| ExportError::Io {
        path: "<buffer>".into(),
        source: e.into_error(),
    })?;
    // Every field is ASCII
    Ok(String::from_utf8_lossy(&data).into_owned())
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a run. Returns the created directory.
pub fn save_artifacts(summary: &RunSummary, output_dir: &Path) -> Result<PathBuf, ExportError> {
    let dirname = format!("{}_{}", summary.symbol, summary.fingerprint.short());
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir).map_err(|source| ExportError::Io {
        path: run_dir.display().to_string(),
        source,
    })?;

    let r = &summary.result;
    let manifest = serde_json::to_string_pretty(&ResultManifest::from_summary(summary))?;
    write(&run_dir.join("result.json"), &manifest)?;
    write(&run_dir.join("trades.csv"), &export_trades_csv(&r.trades)?)?;
    write(&run_dir.join("bars.csv"), &export_bars_csv(&r.bars)?)?;
    write(
        &run_dir.join("divergences.csv"),
        &export_divergences_csv(&r.divergences, &r.bars)?,
    )?;

    tracing::info!(path = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

fn write(path: &Path, contents: &str) -> Result<(), ExportError> {
    std::fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}
