//! AnnotatedBar: per-bar indicator and signal output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::signal::Signal;

/// Everything the engine derived for one bar.
///
/// `None` means "no value": warmup, a degenerate oscillator ratio, or a failed
/// regression fit at this bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBar {
    pub timestamp: NaiveDate,
    pub close: f64,
    pub oscillator: Option<f64>,
    pub prediction: Option<f64>,
    pub band_width: Option<f64>,
    pub raw_signal: Signal,
    pub filtered_signal: Signal,
}

impl AnnotatedBar {
    /// Upper and lower band edges, when both prediction and width are defined.
    pub fn band(&self) -> Option<(f64, f64)> {
        match (self.prediction, self.band_width) {
            (Some(pred), Some(width)) => Some((pred + width, pred - width)),
            _ => None,
        }
    }
}
