//! Evaluation engine.
//!
//! `evaluate` wires the pipeline in order:
//!
//! 1. Indicator engine: oscillator, regression prediction, band width
//! 2. Divergence detector: adjacent extrema pairs against the oscillator
//! 3. Signal generator: band breakout + divergence overlay, alternation filter
//! 4. Trade simulator: all-in/all-out with a one-bar execution lag

pub mod evaluate;
pub mod simulator;

pub use evaluate::{evaluate, EvalError};
pub use simulator::{simulate, SimulationOutcome, SimulatorConfig};
