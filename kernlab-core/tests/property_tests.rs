//! Property tests for evaluation invariants.
//!
//! Uses proptest to verify:
//! 1. Filtered alternation: active filtered signals strictly alternate
//! 2. Ledger shape: trades alternate starting with Buy and end flat
//! 3. Profit identity: profit_pct follows from final_value
//! 4. Degenerate boundary: kr_window >= n always yields the degenerate result
//! 5. Divergence ordering: events sorted by end_index, endpoints are extrema

use chrono::NaiveDate;
use kernlab_core::divergence::{local_maxima, local_minima};
use kernlab_core::signals::filter_alternating;
use kernlab_core::{evaluate, DivergenceKind, ParameterSet, PriceBar, Signal, TradeSide};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Random walk of strictly positive closes.
fn arb_closes(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.04..0.04_f64, min_len..max_len).prop_map(|steps| {
        let mut price = 100.0;
        steps
            .into_iter()
            .map(|r| {
                price *= 1.0 + r;
                (price * 100.0).round() / 100.0
            })
            .collect()
    })
}

fn arb_params() -> impl Strategy<Value = ParameterSet> {
    (
        2usize..15,
        3usize..25,
        0.5..10.0_f64,
        0.0..2.0_f64,
        1usize..6,
        10u32..45,
        55u32..90,
    )
        .prop_map(
            |(rsi_period, kr_window, kr_bandwidth, bb_k, extrema_order, oversold, overbought)| {
                ParameterSet {
                    rsi_period,
                    kr_window,
                    kr_bandwidth,
                    bb_k,
                    extrema_order,
                    rsi_oversold: oversold,
                    rsi_overbought: overbought,
                }
            },
        )
}

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Buy), Just(Signal::Hold), Just(Signal::Sell)]
}

fn bars_from(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar::new(base_date + chrono::Duration::days(i as i64), close))
        .collect()
}

fn assert_alternating(signals: &[Signal]) -> Result<(), TestCaseError> {
    let active: Vec<Signal> = signals.iter().copied().filter(|s| s.is_active()).collect();
    for pair in active.windows(2) {
        prop_assert_ne!(pair[0], pair[1]);
    }
    Ok(())
}

// ── 1. Filtered alternation ──────────────────────────────────────────

proptest! {
    /// The filter never emits the same direction twice in a row, and never
    /// invents a signal the raw series did not carry.
    #[test]
    fn filter_output_alternates(raw in prop::collection::vec(arb_signal(), 0..200)) {
        let filtered = filter_alternating(&raw);
        prop_assert_eq!(filtered.len(), raw.len());
        assert_alternating(&filtered)?;
        for (f, r) in filtered.iter().zip(&raw) {
            prop_assert!(*f == Signal::Hold || f == r);
        }
    }

    /// Every raw direction change is kept.
    #[test]
    fn filter_keeps_first_of_each_run(raw in prop::collection::vec(arb_signal(), 0..200)) {
        let filtered = filter_alternating(&raw);
        let kept = filtered.iter().filter(|s| s.is_active()).count();
        let mut runs = 0;
        let mut last = Signal::Hold;
        for &s in raw.iter().filter(|s| s.is_active()) {
            if s != last {
                runs += 1;
                last = s;
            }
        }
        prop_assert_eq!(kept, runs);
    }
}

// ── 2–4. Evaluation invariants ───────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn evaluation_invariants(
        closes in arb_closes(30, 160),
        params in arb_params(),
        fee in 0.0..0.01_f64,
    ) {
        let bars = bars_from(&closes);
        let result = evaluate(&bars, &params, 10_000.0, fee).unwrap();
        prop_assert_eq!(result.bars.len(), bars.len());

        let filtered: Vec<Signal> = result.bars.iter().map(|b| b.filtered_signal).collect();
        assert_alternating(&filtered)?;

        // Trades alternate Buy/Sell starting with Buy, and the run ends flat
        prop_assert_eq!(result.trades.len() % 2, 0);
        for (k, trade) in result.trades.iter().enumerate() {
            let expected = if k % 2 == 0 { TradeSide::Buy } else { TradeSide::Sell };
            prop_assert_eq!(trade.side, expected);
            prop_assert!(trade.bar_index >= 1 && trade.bar_index < bars.len());
        }
        for pair in result.trades.windows(2) {
            prop_assert!(pair[0].bar_index <= pair[1].bar_index);
        }

        prop_assert!(result.final_value > 0.0);
        let expected_pct = (result.final_value - 10_000.0) / 10_000.0 * 100.0;
        prop_assert!((result.profit_pct - expected_pct).abs() < 1e-9);
    }

    #[test]
    fn window_not_shorter_than_series_is_degenerate(
        closes in arb_closes(1, 40),
        params in arb_params(),
        extra in 0usize..10,
    ) {
        let params = ParameterSet { kr_window: closes.len() + extra, ..params };
        let result = evaluate(&bars_from(&closes), &params, 10_000.0, 0.001).unwrap();
        prop_assert!(result.is_degenerate());
        prop_assert_eq!(result.profit_pct, -100.0);
        prop_assert!(result.trades.is_empty());
    }
}

// ── 5. Divergence ordering ───────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn divergences_ordered_and_anchored_on_extrema(
        closes in arb_closes(30, 160),
        params in arb_params(),
    ) {
        let result = evaluate(&bars_from(&closes), &params, 10_000.0, 0.0).unwrap();
        let minima = local_minima(&closes, params.extrema_order);
        let maxima = local_maxima(&closes, params.extrema_order);

        for pair in result.divergences.windows(2) {
            prop_assert!(pair[0].end_index <= pair[1].end_index);
        }
        for event in &result.divergences {
            prop_assert!(event.start_index < event.end_index);
            let pool = match event.kind {
                DivergenceKind::Bullish => &minima,
                DivergenceKind::Bearish => &maxima,
            };
            let start = pool.iter().position(|&i| i == event.start_index);
            prop_assert!(start.is_some());
            // Adjacent extrema only
            prop_assert_eq!(pool.get(start.unwrap() + 1), Some(&event.end_index));

            let forced = match event.kind {
                DivergenceKind::Bullish => Signal::Buy,
                DivergenceKind::Bearish => Signal::Sell,
            };
            // The last event on a bar decides its raw signal
            let last_on_bar = result
                .divergences
                .iter()
                .rev()
                .find(|e| e.end_index == event.end_index)
                .unwrap();
            if last_on_bar == event {
                prop_assert_eq!(result.bars[event.end_index].raw_signal, forced);
            }
        }
    }
}
