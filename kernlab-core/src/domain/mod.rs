//! Domain types for KernLab

pub mod annotated;
pub mod bar;
pub mod divergence;
pub mod params;
pub mod result;
pub mod signal;
pub mod trade;

pub use annotated::AnnotatedBar;
pub use bar::PriceBar;
pub use divergence::{DivergenceEvent, DivergenceKind};
pub use params::{ParamError, ParameterSet};
pub use result::BacktestResult;
pub use signal::Signal;
pub use trade::{Trade, TradeSide};
