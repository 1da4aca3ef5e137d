//! Divergence events between price extrema and the oscillator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DivergenceKind {
    /// Lower low in price, higher oscillator.
    Bullish,
    /// Higher high in price, lower oscillator.
    Bearish,
}

impl DivergenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
        }
    }
}

/// A pair of chronologically adjacent extrema of the same type.
///
/// `start_index < end_index`; both are minima for `Bullish` and maxima for
/// `Bearish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceEvent {
    pub start_index: usize,
    pub end_index: usize,
    pub kind: DivergenceKind,
}
