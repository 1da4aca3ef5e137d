//! All-in/all-out trade simulator.
//!
//! Walks the filtered signal stream with a one-bar execution lag: a signal on
//! bar i fills at the close of bar i+1. Every entry commits the whole balance
//! and every exit liquidates the whole position; there is no shorting. Fees are
//! proportional and charged on both legs.
//!
//! A position still open after the last signal is liquidated at the final
//! close, so every run ends in cash.

use crate::domain::{PriceBar, Signal, Trade, TradeSide};

/// Capital and cost settings for one simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorConfig {
    pub initial_balance: f64,
    /// Proportional fee in [0, 1).
    pub fee: f64,
}

/// Ledger and valuation after a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub trades: Vec<Trade>,
    /// Cash at the end of the run.
    pub balance: f64,
    /// Units held at the end of the run; zero after forced liquidation.
    pub position_quantity: f64,
    pub final_value: f64,
    pub profit_pct: f64,
}

/// Transient simulator state.
#[derive(Debug, Clone)]
struct SimulatorState {
    balance: f64,
    position_quantity: f64,
    entry_price: f64,
    trades: Vec<Trade>,
}

impl SimulatorState {
    fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            position_quantity: 0.0,
            entry_price: 0.0,
            trades: Vec::new(),
        }
    }

    fn is_flat(&self) -> bool {
        self.position_quantity == 0.0
    }

    fn buy(&mut self, bar: &PriceBar, bar_index: usize, fee: f64) {
        let price = bar.close;
        self.position_quantity = self.balance * (1.0 - fee) / price;
        self.entry_price = price;
        self.balance = 0.0;
        self.trades.push(Trade {
            timestamp: bar.timestamp,
            bar_index,
            side: TradeSide::Buy,
            price,
            quantity: self.position_quantity,
            balance_after: self.balance,
            realized_profit: 0.0,
        });
    }

    fn sell(&mut self, bar: &PriceBar, bar_index: usize, fee: f64) {
        let price = bar.close;
        let quantity = self.position_quantity;
        let realized_profit = quantity * (price - self.entry_price) * (1.0 - fee);
        self.balance = quantity * price * (1.0 - fee);
        self.position_quantity = 0.0;
        self.entry_price = 0.0;
        self.trades.push(Trade {
            timestamp: bar.timestamp,
            bar_index,
            side: TradeSide::Sell,
            price,
            quantity,
            balance_after: self.balance,
            realized_profit,
        });
    }
}

/// Run the simulation.
///
/// `signals` is the filtered stream aligned with `bars`.
pub fn simulate(bars: &[PriceBar], signals: &[Signal], config: &SimulatorConfig) -> SimulationOutcome {
    debug_assert_eq!(bars.len(), signals.len());

    let fee = config.fee;
    let mut state = SimulatorState::new(config.initial_balance);

    for i in 0..bars.len().saturating_sub(1) {
        let exec_index = i + 1;
        let exec_bar = &bars[exec_index];
        match signals[i] {
            Signal::Buy if state.is_flat() => state.buy(exec_bar, exec_index, fee),
            Signal::Sell if state.position_quantity > 0.0 => state.sell(exec_bar, exec_index, fee),
            _ => {}
        }
    }

    if state.position_quantity > 0.0 {
        if let Some(last) = bars.last() {
            state.sell(last, bars.len() - 1, fee);
        }
    }

    let last_price = bars.last().map_or(0.0, |b| b.close);
    // The position branch is unreachable after forced liquidation
    let final_value = if state.balance > 0.0 {
        state.balance
    } else {
        state.position_quantity * last_price
    };
    let profit_pct = if final_value == 0.0 {
        -100.0
    } else {
        (final_value - config.initial_balance) / config.initial_balance * 100.0
    };

    SimulationOutcome {
        trades: state.trades,
        balance: state.balance,
        position_quantity: state.position_quantity,
        final_value,
        profit_pct,
    }
}
