//! Band-breakout raw signal and divergence overlay.

use crate::domain::{AnnotatedBar, DivergenceEvent, DivergenceKind, Signal};

/// Band-breakout signal for one bar.
///
/// A close above the upper band is a sell, below the lower band a buy.
/// Bars without both a prediction and a band width hold.
pub fn band_signal(bar: &AnnotatedBar) -> Signal {
    match (bar.prediction, bar.band_width) {
        (Some(pred), Some(width)) => {
            if bar.close > pred + width {
                Signal::Sell
            } else if bar.close < pred - width {
                Signal::Buy
            } else {
                Signal::Hold
            }
        }
        _ => Signal::Hold,
    }
}

/// Force the raw signal at each event's end bar, overriding the band signal.
///
/// Events are applied in order, so a later event on the same bar wins.
pub fn apply_divergences(raw: &mut [Signal], events: &[DivergenceEvent]) {
    for event in events {
        if let Some(slot) = raw.get_mut(event.end_index) {
            *slot = match event.kind {
                DivergenceKind::Bullish => Signal::Buy,
                DivergenceKind::Bearish => Signal::Sell,
            };
        }
    }
}
