//! Divergence detector.
//!
//! Pairs chronologically adjacent extrema of the same kind and flags those
//! where price and oscillator move in opposite directions:
//! - Bullish: two minima, lower low in price, higher oscillator, and the
//!   second oscillator reading at or below the oversold threshold.
//! - Bearish: two maxima, higher high in price, lower oscillator, and the
//!   second oscillator reading at or above the overbought threshold.
//!
//! A pair with an undefined oscillator at either end never qualifies.

pub mod extrema;

pub use extrema::{local_maxima, local_minima};

use crate::domain::{DivergenceEvent, DivergenceKind};

/// Inputs that select and qualify divergence pairs.
#[derive(Debug, Clone, Copy)]
pub struct DivergenceConfig {
    pub extrema_order: usize,
    pub oversold: f64,
    pub overbought: f64,
}

/// Detect divergences, ordered by `end_index`.
///
/// When a bullish and a bearish event end on the same bar, the bullish one
/// comes first.
pub fn detect_divergences(
    closes: &[f64],
    oscillator: &[Option<f64>],
    config: &DivergenceConfig,
) -> Vec<DivergenceEvent> {
    debug_assert_eq!(closes.len(), oscillator.len());

    let minima = local_minima(closes, config.extrema_order);
    let maxima = local_maxima(closes, config.extrema_order);

    let bullish = adjacent_pairs(&minima).filter(|&(p1, p2)| {
        matches!(
            (oscillator[p1], oscillator[p2]),
            (Some(o1), Some(o2))
                if closes[p2] < closes[p1] && o2 > o1 && o2 <= config.oversold
        )
    });
    let bearish = adjacent_pairs(&maxima).filter(|&(p1, p2)| {
        matches!(
            (oscillator[p1], oscillator[p2]),
            (Some(o1), Some(o2))
                if closes[p2] > closes[p1] && o2 < o1 && o2 >= config.overbought
        )
    });

    let mut events: Vec<DivergenceEvent> = bullish
        .map(|(p1, p2)| event(p1, p2, DivergenceKind::Bullish))
        .chain(bearish.map(|(p1, p2)| event(p1, p2, DivergenceKind::Bearish)))
        .collect();
    // Stable: ties on end_index keep bullish ahead of bearish
    events.sort_by_key(|e| e.end_index);
    events
}

fn adjacent_pairs(indices: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    indices.windows(2).map(|w| (w[0], w[1]))
}

fn event(start_index: usize, end_index: usize, kind: DivergenceKind) -> DivergenceEvent {
    DivergenceEvent {
        start_index,
        end_index,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(order: usize) -> DivergenceConfig {
        DivergenceConfig {
            extrema_order: order,
            oversold: 30.0,
            overbought: 70.0,
        }
    }

    #[test]
    fn bullish_lower_low_higher_oscillator() {
        let closes = [10.0, 8.0, 10.0, 7.0, 10.0];
        let osc = [None, Some(10.0), Some(50.0), Some(25.0), Some(60.0)];
        let events = detect_divergences(&closes, &osc, &config(1));
        assert_eq!(
            events,
            vec![DivergenceEvent {
                start_index: 1,
                end_index: 3,
                kind: DivergenceKind::Bullish
            }]
        );
    }

    #[test]
    fn bullish_requires_oversold() {
        let closes = [10.0, 8.0, 10.0, 7.0, 10.0];
        let osc = [None, Some(10.0), Some(50.0), Some(31.0), Some(60.0)];
        assert!(detect_divergences(&closes, &osc, &config(1)).is_empty());
    }

    #[test]
    fn oversold_threshold_is_inclusive() {
        let closes = [10.0, 8.0, 10.0, 7.0, 10.0];
        let osc = [None, Some(10.0), Some(50.0), Some(30.0), Some(60.0)];
        assert_eq!(detect_divergences(&closes, &osc, &config(1)).len(), 1);
    }

    #[test]
    fn bearish_higher_high_lower_oscillator() {
        let closes = [5.0, 8.0, 5.0, 9.0, 5.0];
        let osc = [Some(50.0), Some(90.0), Some(40.0), Some(75.0), Some(40.0)];
        let events = detect_divergences(&closes, &osc, &config(1));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, DivergenceKind::Bearish);
        assert_eq!((events[0].start_index, events[0].end_index), (1, 3));
    }

    #[test]
    fn undefined_oscillator_never_qualifies() {
        let closes = [10.0, 8.0, 10.0, 7.0, 10.0];
        let osc = [None, None, Some(50.0), Some(20.0), Some(60.0)];
        assert!(detect_divergences(&closes, &osc, &config(1)).is_empty());
    }

    #[test]
    fn only_adjacent_minima_are_compared() {
        // Minima at 1, 3, 5. (1,5) would qualify but is not adjacent;
        // (1,3) is a higher low and (3,5) has a falling oscillator.
        let closes = [10.0, 8.0, 10.0, 9.0, 10.0, 7.0, 10.0];
        let osc = [
            None,
            Some(10.0),
            Some(50.0),
            Some(40.0),
            Some(50.0),
            Some(20.0),
            Some(50.0),
        ];
        assert!(detect_divergences(&closes, &osc, &config(1)).is_empty());
    }

    #[test]
    fn events_sorted_by_end_index() {
        // Bearish pair (1,3) and bullish pair (4,6) interleave in time
        let closes = [5.0, 8.0, 5.0, 9.0, 4.0, 6.0, 3.0, 6.0];
        let osc = [
            Some(50.0),
            Some(90.0),
            Some(40.0),
            Some(80.0),
            Some(10.0),
            Some(50.0),
            Some(20.0),
            Some(50.0),
        ];
        let events = detect_divergences(&closes, &osc, &config(1));
        let ends: Vec<usize> = events.iter().map(|e| e.end_index).collect();
        let mut sorted = ends.clone();
        sorted.sort_unstable();
        assert_eq!(ends, sorted);
        assert!(events.iter().any(|e| e.kind == DivergenceKind::Bullish));
        assert!(events.iter().any(|e| e.kind == DivergenceKind::Bearish));
    }

    #[test]
    fn constant_series_has_no_divergence() {
        let closes = [3.0; 10];
        let osc = [Some(20.0); 10];
        assert!(detect_divergences(&closes, &osc, &config(2)).is_empty());
    }
}
