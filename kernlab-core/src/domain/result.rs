//! BacktestResult: everything `evaluate` returns.

use serde::{Deserialize, Serialize};

use super::annotated::AnnotatedBar;
use super::divergence::DivergenceEvent;
use super::trade::{Trade, TradeSide};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Percent return on initial balance; exactly -100 when `final_value == 0`.
    pub profit_pct: f64,
    pub final_value: f64,
    pub trades: Vec<Trade>,
    pub bars: Vec<AnnotatedBar>,
    pub divergences: Vec<DivergenceEvent>,
}

impl BacktestResult {
    /// Result for an evaluation that could not run (window not shorter than the series).
    pub fn degenerate() -> Self {
        Self {
            profit_pct: -100.0,
            final_value: 0.0,
            trades: Vec::new(),
            bars: Vec::new(),
            divergences: Vec::new(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.final_value == 0.0 && self.bars.is_empty()
    }

    /// Completed buy→sell pairs.
    pub fn round_trips(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.side == TradeSide::Sell)
            .count()
    }

    /// Fraction of round trips with positive realized profit. `None` with no round trips.
    pub fn win_rate(&self) -> Option<f64> {
        let trips = self.round_trips();
        if trips == 0 {
            return None;
        }
        let winners = self.trades.iter().filter(|t| t.is_winner()).count();
        Some(winners as f64 / trips as f64)
    }
}
