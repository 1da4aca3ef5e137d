//! Trade: one ledger entry of the all-in/all-out simulator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }
}

/// A single executed order.
///
/// `bar_index` and `timestamp` refer to the execution bar, one bar after the
/// signal. `realized_profit` is always zero for a Buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: NaiveDate,
    pub bar_index: usize,
    pub side: TradeSide,
    pub price: f64,
    pub quantity: f64,
    pub balance_after: f64,
    pub realized_profit: f64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.side == TradeSide::Sell && self.realized_profit > 0.0
    }
}
