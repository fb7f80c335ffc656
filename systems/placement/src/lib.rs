#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spatial placement for spawn decisions: side selection, edge positions,
//! formation geometry and minimum-separation retries.

mod formation;
mod side;
mod spacing;

use glam::Vec2;
use rand::Rng;
use spawn_director_core::{PlacementTuning, SpawnSide};

pub use formation::{
    formation_offsets, layout_formation, outward_push, rotate_to_side, Formation,
};
pub use side::{edge_position, SideSelector};
pub use spacing::SpacingHistory;

/// Chooses a side and an edge position that clears the spacing history.
///
/// Retries up to the configured attempt count and returns `None` when every
/// attempt lands too close to a recent spawn, leaving the caller to defer.
pub fn place_single<R: Rng + ?Sized>(
    tuning: &PlacementTuning,
    sides: &SideSelector,
    spacing: &SpacingHistory,
    rng: &mut R,
) -> Option<(SpawnSide, Vec2)> {
    for _ in 0..tuning.retries.max(1) {
        let side = sides.choose(rng);
        let position = edge_position(tuning, side, rng);
        if spacing.is_clear(position, tuning.min_separation) {
            return Some((side, position));
        }
    }
    None
}

/// Position on an explicit side that clears the spacing history, if any attempt does.
pub fn place_on_side<R: Rng + ?Sized>(
    tuning: &PlacementTuning,
    side: SpawnSide,
    spacing: &SpacingHistory,
    rng: &mut R,
) -> Option<Vec2> {
    (0..tuning.retries.max(1))
        .map(|_| edge_position(tuning, side, rng))
        .find(|position| spacing.is_clear(*position, tuning.min_separation))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn empty_history_places_first_try() {
        let tuning = PlacementTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let sides = SideSelector::new(&tuning);
        let placed = place_single(&tuning, &sides, &SpacingHistory::new(), &mut rng);
        assert!(placed.is_some());
    }

    #[test]
    fn saturated_edge_defers() {
        let mut tuning = PlacementTuning::default();
        tuning.diagonal_jitter = 0.0;
        let mut spacing = SpacingHistory::new();
        let lo = tuning.bounds.min - Vec2::splat(tuning.margin);
        let hi = tuning.bounds.max + Vec2::splat(tuning.margin);
        let mut x = lo.x;
        while x <= hi.x {
            spacing.push(0.0, Vec2::new(x, hi.y));
            x += 10.0;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(place_on_side(&tuning, SpawnSide::Top, &spacing, &mut rng), None);
    }
}
