//! Local extrema with non-strict comparison.
//!
//! A bar is a local maximum (minimum) when its close is >= (<=) every close
//! within `order` bars on both sides. Neighbours past either end of the series
//! are clipped to the edge bar, so the first and last bars can qualify.

/// Indices of local maxima, ascending.
pub fn local_maxima(closes: &[f64], order: usize) -> Vec<usize> {
    extrema(closes, order, |center, other| center >= other)
}

/// Indices of local minima, ascending.
pub fn local_minima(closes: &[f64], order: usize) -> Vec<usize> {
    extrema(closes, order, |center, other| center <= other)
}

fn extrema(closes: &[f64], order: usize, keeps: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    let n = closes.len();
    (0..n)
        .filter(|&i| {
            let lo = i.saturating_sub(order);
            let hi = (i + order).min(n.saturating_sub(1));
            (lo..=hi).all(|j| j == i || keeps(closes[i], closes[j]))
        })
        .collect()
}
