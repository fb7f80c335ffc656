use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use spawn_director_core::{PlacementPattern, PlacementTuning, SpawnSide};
use spawn_director_system_placement::layout_formation;

fn pattern_strategy() -> impl Strategy<Value = PlacementPattern> {
    (0..PlacementPattern::GROUPS.len()).prop_map(|index| PlacementPattern::GROUPS[index])
}

fn side_strategy() -> impl Strategy<Value = SpawnSide> {
    (0..SpawnSide::ALL.len()).prop_map(|index| SpawnSide::ALL[index])
}

proptest! {
    #[test]
    fn every_member_spawns_beyond_the_margin(
        pattern in pattern_strategy(),
        side in side_strategy(),
        count in 1usize..=12,
        seed in any::<u64>(),
    ) {
        let tuning = PlacementTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let formation = layout_formation(&tuning, pattern, side, count, &mut rng);
        prop_assert_eq!(formation.positions.len(), count);
        for position in &formation.positions {
            prop_assert!(
                !tuning.bounds.contains_with_margin(*position, tuning.margin),
                "{:?} member at {:?} is inside the margin",
                pattern,
                position
            );
        }
    }

    #[test]
    fn members_keep_formation_spacing(
        pattern in pattern_strategy(),
        count in 2usize..=12,
        seed in any::<u64>(),
    ) {
        let tuning = PlacementTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let formation = layout_formation(&tuning, pattern, SpawnSide::Right, count, &mut rng);
        let minimum = tuning.formation_spacing * 0.99;
        for (index, first) in formation.positions.iter().enumerate() {
            for second in &formation.positions[index + 1..] {
                prop_assert!(first.distance(*second) >= minimum);
            }
        }
    }
}

#[test]
fn formation_spacing_clears_minimum_separation() {
    let tuning = PlacementTuning::default();
    assert!(tuning.formation_spacing >= tuning.min_separation);
}
