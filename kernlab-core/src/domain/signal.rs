//! Directional signal carried on every annotated bar.

use serde::{Deserialize, Serialize};

/// Trade direction for a single bar.
///
/// Numerically `Sell = -1`, `Hold = 0`, `Buy = 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Sell,
    #[default]
    Hold,
    Buy,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        match self {
            Self::Sell => -1,
            Self::Hold => 0,
            Self::Buy => 1,
        }
    }

    pub fn is_active(self) -> bool {
        self != Self::Hold
    }
}
