//! ParameterSet: the strategy parameters varied by the optimizer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Out-of-range parameter values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{name} must be >= 1, got {value}")]
    ZeroLength { name: &'static str, value: usize },

    #[error("kr_bandwidth must be finite and > 0, got {0}")]
    Bandwidth(f64),

    #[error("bb_k must be finite and >= 0, got {0}")]
    BandMultiplier(f64),

    #[error("{name} must be within [0, 100], got {value}")]
    Threshold { name: &'static str, value: u32 },
}

/// Strategy parameters, exactly the set the engine recognizes.
///
/// Unknown keys are rejected on deserialization and every field is required.
/// No ordering is enforced between `rsi_oversold` and `rsi_overbought`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterSet {
    /// Oscillator averaging window (bars).
    pub rsi_period: usize,
    /// Trailing training window for the local regression (bars).
    pub kr_window: usize,
    /// Gaussian kernel bandwidth, in bar-index units.
    pub kr_bandwidth: f64,
    /// Volatility band multiplier.
    pub bb_k: f64,
    /// Half-width of the extrema comparison window.
    pub extrema_order: usize,
    pub rsi_oversold: u32,
    pub rsi_overbought: u32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            kr_window: 50,
            kr_bandwidth: 5.0,
            bb_k: 0.7,
            extrema_order: 5,
            rsi_oversold: 30,
            rsi_overbought: 70,
        }
    }
}

impl ParameterSet {
    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), ParamError> {
        for (name, value) in [
            ("rsi_period", self.rsi_period),
            ("kr_window", self.kr_window),
            ("extrema_order", self.extrema_order),
        ] {
            if value == 0 {
                return Err(ParamError::ZeroLength { name, value });
            }
        }
        if !(self.kr_bandwidth.is_finite() && self.kr_bandwidth > 0.0) {
            return Err(ParamError::Bandwidth(self.kr_bandwidth));
        }
        if !(self.bb_k.is_finite() && self.bb_k >= 0.0) {
            return Err(ParamError::BandMultiplier(self.bb_k));
        }
        for (name, value) in [
            ("rsi_oversold", self.rsi_oversold),
            ("rsi_overbought", self.rsi_overbought),
        ] {
            if value > 100 {
                return Err(ParamError::Threshold { name, value });
            }
        }
        Ok(())
    }
}
