//! PriceBar: the input unit of an evaluation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily close price for one instrument.
///
/// An evaluation input is a slice of bars ordered by strictly increasing
/// `timestamp`. The slice is never mutated by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDate,
    pub close: f64,
}

impl PriceBar {
    pub fn new(timestamp: NaiveDate, close: f64) -> Self {
        Self { timestamp, close }
    }

    /// A close the engine can trade at: finite and strictly positive.
    pub fn is_tradable(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Extract the close column.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
