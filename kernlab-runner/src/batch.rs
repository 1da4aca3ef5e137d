//! Batch evaluation: one parameter set over many instruments.
//!
//! Each series is evaluated independently and in parallel. Empty series and
//! series whose evaluation fails are skipped with a reason; a degenerate
//! result (window longer than the history) still counts, at -100%.

use kernlab_core::{evaluate, ParameterSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data_loader::LoadedSeries;

/// What happened to one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Evaluated {
        profit_pct: f64,
        final_value: f64,
        trade_count: usize,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub symbol: String,
    pub outcome: BatchOutcome,
}

/// Per-instrument outcomes in input order, plus the average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    /// Mean `profit_pct` over evaluated instruments; `None` when none were.
    pub mean_profit_pct: Option<f64>,
}

impl BatchReport {
    pub fn evaluated_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, BatchOutcome::Evaluated { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.len() - self.evaluated_count()
    }
}

/// Evaluate `params` on every series.
pub fn run_batch(
    series: &[LoadedSeries],
    params: &ParameterSet,
    initial_balance: f64,
    fee: f64,
) -> BatchReport {
    let entries: Vec<BatchEntry> = series
        .par_iter()
        .map(|s| BatchEntry {
            symbol: s.symbol.clone(),
            outcome: evaluate_one(s, params, initial_balance, fee),
        })
        .collect();

    let profits: Vec<f64> = entries
        .iter()
        .filter_map(|e| match e.outcome {
            BatchOutcome::Evaluated { profit_pct, .. } => Some(profit_pct),
            BatchOutcome::Skipped { .. } => None,
        })
        .collect();
    let mean_profit_pct =
        (!profits.is_empty()).then(|| profits.iter().sum::<f64>() / profits.len() as f64);

    tracing::info!(
        evaluated = profits.len(),
        skipped = entries.len() - profits.len(),
        mean_profit_pct = mean_profit_pct.unwrap_or(f64::NAN),
        "batch finished"
    );

    BatchReport {
        entries,
        mean_profit_pct,
    }
}

fn evaluate_one(
    series: &LoadedSeries,
    params: &ParameterSet,
    initial_balance: f64,
    fee: f64,
) -> BatchOutcome {
    if series.is_empty() {
        tracing::warn!(symbol = %series.symbol, "no data, skipping");
        return BatchOutcome::Skipped {
            reason: "no data".into(),
        };
    }
    match evaluate(&series.bars, params, initial_balance, fee) {
        Ok(result) => BatchOutcome::Evaluated {
            profit_pct: result.profit_pct,
            final_value: result.final_value,
            trade_count: result.trades.len(),
        },
        Err(e) => {
            tracing::warn!(symbol = %series.symbol, error = %e, "evaluation failed, skipping");
            BatchOutcome::Skipped {
                reason: e.to_string(),
            }
        }
    }
}
