//! Signal generator.
//!
//! Combines the band-breakout signal and the divergence overlay into a raw
//! directional series, then collapses it into a strictly alternating stream.

pub mod band;
pub mod filter;

pub use band::{apply_divergences, band_signal};
pub use filter::filter_alternating;

use crate::domain::{AnnotatedBar, DivergenceEvent};

/// Fill `raw_signal` and `filtered_signal` on every bar.
pub fn generate_signals(bars: &mut [AnnotatedBar], events: &[DivergenceEvent]) {
    let mut raw: Vec<_> = bars.iter().map(band_signal).collect();
    apply_divergences(&mut raw, events);
    let filtered = filter_alternating(&raw);

    for ((bar, raw), filtered) in bars.iter_mut().zip(raw).zip(filtered) {
        bar.raw_signal = raw;
        bar.filtered_signal = filtered;
    }
}
