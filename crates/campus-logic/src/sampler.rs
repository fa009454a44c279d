//! Weighted roulette selection.
//!
//! One implementation shared by family-tier rolls, event category choice,
//! outcome choice and sub-outcome choice, so that every call site has the
//! same tie-break and fallback behavior.

use rand::Rng;

/// Anything carrying a non-negative selection weight.
pub trait Weighted {
    fn weight(&self) -> f64;
}

impl<T> Weighted for (T, f64) {
    fn weight(&self) -> f64 {
        self.1
    }
}

/// Sum of the usable (finite, positive) weights.
pub fn total_weight<T: Weighted>(items: &[T]) -> f64 {
    items.iter().map(|item| usable(item.weight())).sum()
}

/// Draw one item with probability proportional to its weight.
///
/// A uniform value in `[0, total)` is walked down the list in order; the
/// first item at which the remainder reaches zero wins. Zero-weight items
/// are never chosen unless every weight is zero, in which case the first
/// item is returned. If floating-point drift exhausts the walk, the last
/// positively-weighted item is returned. Empty input yields `None`.
pub fn sample<'a, T: Weighted>(items: &'a [T], rng: &mut impl Rng) -> Option<&'a T> {
    sample_index(items, rng).map(|i| &items[i])
}

/// Index variant of [`sample`], for callers that need the position.
pub fn sample_index<T: Weighted>(items: &[T], rng: &mut impl Rng) -> Option<usize> {
    if items.is_empty() {
        return None;
    }
    let total = total_weight(items);
    if total <= 0.0 {
        return Some(0);
    }

    let mut remaining = rng.gen::<f64>() * total;
    let mut last_live = None;
    for (i, item) in items.iter().enumerate() {
        let w = usable(item.weight());
        if w <= 0.0 {
            continue;
        }
        last_live = Some(i);
        remaining -= w;
        if remaining <= 0.0 {
            return Some(i);
        }
    }
    last_live
}

fn usable(w: f64) -> f64 {
    if w.is_finite() && w > 0.0 {
        w
    } else {
        0.0
    }
}
