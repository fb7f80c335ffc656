use glam::Vec2;
use rand::Rng;
use spawn_director_core::{last_positive, weighted_index, History, PlacementTuning, SpawnSide};

/// Consecutive uses of one side after which it is excluded from the next draw.
const REPEAT_LIMIT: usize = 3;

/// Weighted chooser over the eight spawn zones with anti-clustering history.
#[derive(Clone, Debug)]
pub struct SideSelector {
    history: History<SpawnSide>,
    frequency_penalty: f32,
    opposite_boost: f32,
}

impl SideSelector {
    /// Creates a selector with an empty history.
    #[must_use]
    pub fn new(tuning: &PlacementTuning) -> Self {
        Self {
            history: History::with_capacity(tuning.side_window.max(REPEAT_LIMIT)),
            frequency_penalty: tuning.side_frequency_penalty,
            opposite_boost: tuning.opposite_boost,
        }
    }

    /// Current draw weight of every side, indexed clockwise from the top.
    #[must_use]
    pub fn weights(&self) -> [f32; 8] {
        let previous = self.history.last();
        let mut weights = [0.0; 8];
        for side in SpawnSide::ALL {
            if self.history.trailing_run(side) >= REPEAT_LIMIT {
                continue;
            }
            let share = self.history.share(side);
            let mut weight = (1.0 - self.frequency_penalty * share).max(0.05);
            if previous.map(SpawnSide::opposite) == Some(side) {
                weight *= self.opposite_boost;
            }
            weights[side.index()] = weight;
        }
        weights
    }

    /// Draws a side from the current weights without recording it.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> SpawnSide {
        let weights = self.weights();
        weighted_index(&weights, rng)
            .or_else(|| last_positive(&weights))
            .map_or(SpawnSide::Top, |index| SpawnSide::ALL[index])
    }

    /// Records the side of a materialised spawn.
    pub fn record(&mut self, side: SpawnSide) {
        self.history.push(side);
    }

    /// Side of the most recent spawn.
    #[must_use]
    pub fn last(&self) -> Option<SpawnSide> {
        self.history.last()
    }

    /// Forgets every recorded side.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

/// Maps a zone to a world position just outside the play bounds.
///
/// Edge zones pick a uniform point along their edge; corner zones start at the
/// grown corner and add outward jitter.
pub fn edge_position<R: Rng + ?Sized>(
    tuning: &PlacementTuning,
    side: SpawnSide,
    rng: &mut R,
) -> Vec2 {
    let bounds = tuning.bounds;
    let margin = tuning.margin;
    let lo = bounds.min - Vec2::splat(margin);
    let hi = bounds.max + Vec2::splat(margin);
    match side {
        SpawnSide::Top => Vec2::new(lerp(bounds.min.x, bounds.max.x, rng.gen()), hi.y),
        SpawnSide::Bottom => Vec2::new(lerp(bounds.min.x, bounds.max.x, rng.gen()), lo.y),
        SpawnSide::Right => Vec2::new(hi.x, lerp(bounds.min.y, bounds.max.y, rng.gen())),
        SpawnSide::Left => Vec2::new(lo.x, lerp(bounds.min.y, bounds.max.y, rng.gen())),
        SpawnSide::TopRight
        | SpawnSide::BottomRight
        | SpawnSide::BottomLeft
        | SpawnSide::TopLeft => {
            let outward = side.outward();
            let corner = Vec2::new(
                if outward.x > 0.0 { hi.x } else { lo.x },
                if outward.y > 0.0 { hi.y } else { lo.y },
            );
            corner + outward * (tuning.diagonal_jitter * rng.gen::<f32>())
        }
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn three_identical_sides_zero_the_repeat() {
        let mut selector = SideSelector::new(&PlacementTuning::default());
        for _ in 0..3 {
            selector.record(SpawnSide::Top);
        }
        let weights = selector.weights();
        assert_eq!(weights[SpawnSide::Top.index()], 0.0);
        assert!(weights[SpawnSide::Bottom.index()] > weights[SpawnSide::Left.index()]);
    }

    #[test]
    fn two_repeats_keep_the_side_available() {
        let mut selector = SideSelector::new(&PlacementTuning::default());
        selector.record(SpawnSide::Left);
        selector.record(SpawnSide::Left);
        assert!(selector.weights()[SpawnSide::Left.index()] > 0.0);
    }

    #[test]
    fn opposite_side_is_boosted() {
        let tuning = PlacementTuning::default();
        let mut selector = SideSelector::new(&tuning);
        selector.record(SpawnSide::TopRight);
        let weights = selector.weights();
        let opposite = weights[SpawnSide::BottomLeft.index()];
        let neutral = weights[SpawnSide::Left.index()];
        assert!((opposite - neutral * tuning.opposite_boost).abs() < 1e-6);
    }

    #[test]
    fn never_draws_a_zeroed_side() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut selector = SideSelector::new(&PlacementTuning::default());
        for _ in 0..3 {
            selector.record(SpawnSide::Right);
        }
        for _ in 0..200 {
            assert_ne!(selector.choose(&mut rng), SpawnSide::Right);
        }
    }

    #[test]
    fn edge_positions_land_outside_the_margin() {
        let tuning = PlacementTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for side in SpawnSide::ALL {
            for _ in 0..32 {
                let position = edge_position(&tuning, side, &mut rng);
                assert!(!tuning.bounds.contains_with_margin(position, tuning.margin));
            }
        }
    }
}
