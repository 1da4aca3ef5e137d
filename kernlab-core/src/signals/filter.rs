//! Alternation filter.
//!
//! A strict left-to-right fold carrying the last kept signal. A bar passes
//! only when it is active and differs from the last kept signal; everything
//! else becomes `Hold`. A repeated direction stays suppressed until the
//! opposite direction appears, however many idle bars lie between.

use crate::domain::Signal;

pub fn filter_alternating(raw: &[Signal]) -> Vec<Signal> {
    let mut last_kept = Signal::Hold;
    raw.iter()
        .map(|&signal| {
            if signal.is_active() && signal != last_kept {
                last_kept = signal;
                signal
            } else {
                Signal::Hold
            }
        })
        .collect()
}
