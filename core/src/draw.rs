//! Cumulative-weight draws shared by every weighted choice in the director.

use rand::Rng;

/// Draws an index with probability proportional to its weight.
///
/// Negative weights count as zero. Returns `None` when no weight is positive
/// or when rounding lets the roll run past the last positive entry.
pub fn weighted_index<R: Rng + ?Sized>(weights: &[f32], rng: &mut R) -> Option<usize> {
    let total: f32 = weights.iter().map(|weight| weight.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.gen::<f32>() * total;
    for (index, weight) in weights.iter().enumerate() {
        let weight = weight.max(0.0);
        if weight <= 0.0 {
            continue;
        }
        if roll < weight {
            return Some(index);
        }
        roll -= weight;
    }
    None
}

/// Index of the last positive weight, used when a draw runs past the end.
#[must_use]
pub fn last_positive(weights: &[f32]) -> Option<usize> {
    weights.iter().rposition(|weight| *weight > 0.0)
}
