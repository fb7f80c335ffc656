use glam::Vec2;
use proptest::prelude::*;
use spawn_director_core::{
    Archetype, ArchetypeCounts, DirectorConfig, FormationSlot, GroupId, PlacementPattern,
    SpawnDecision, SpawnTask, Stage, MAX_RELAXATION_DEPTH,
};
use spawn_director_system_director::resolve;
use spawn_director_system_rules::{RuleContext, RuleRegistry};
use spawn_director_system_selection::{CandidateContext, CooldownMap};

fn counts(values: &[u32]) -> ArchetypeCounts {
    let mut counts = ArchetypeCounts::new();
    for (archetype, value) in Archetype::ALL.iter().zip(values) {
        for _ in 0..*value {
            counts.increment(*archetype);
        }
    }
    counts
}

proptest! {
    #[test]
    fn every_decision_terminates_without_blocking_violations(
        archetype in 0..Archetype::COUNT,
        pattern in 0..PlacementPattern::GROUPS.len(),
        grouped in any::<bool>(),
        stage in 1u8..=10,
        alive in prop::collection::vec(0u32..4, Archetype::COUNT),
        wave in prop::collection::vec(0u32..6, Archetype::COUNT),
        tick in prop::collection::vec(0u32..4, Archetype::COUNT),
        points in prop::collection::vec((-500f32..500.0, -400f32..400.0), 0..12),
        x in -500f32..500.0,
        y in -400f32..400.0,
    ) {
        let config = DirectorConfig::default();
        let registry = RuleRegistry::standard(&config);
        let stage = Stage::new(stage);
        let archetype = Archetype::ALL[archetype];
        let alive = counts(&alive);
        let wave = counts(&wave);
        let tick = counts(&tick);
        let queued = ArchetypeCounts::new();
        let cooldowns = CooldownMap::new();
        let recent: Vec<Vec2> = points.into_iter().map(|(px, py)| Vec2::new(px, py)).collect();

        let mut decision = SpawnDecision::from_task(&SpawnTask::single(archetype, 0.0));
        decision.position = Some(Vec2::new(x, y));
        if grouped {
            let pattern = PlacementPattern::GROUPS[pattern];
            decision.pattern = pattern;
            decision.options.formation = Some(FormationSlot {
                pattern,
                group: GroupId::new(0),
                index: 0,
            });
        }

        let rules = RuleContext {
            stage,
            alive: &alive,
            wave: &wave,
            tick: &tick,
            recent_points: &recent,
            player_position: Vec2::ZERO,
        };
        let candidates = CandidateContext {
            config: &config,
            stage,
            cooldowns: &cooldowns,
            alive: &alive,
            queued: &queued,
        };
        let resolution = resolve(decision, &registry, &rules, &candidates);
        prop_assert!(resolution.decision.relaxation <= MAX_RELAXATION_DEPTH);
        prop_assert!(!resolution.report.has_blocking());
        prop_assert_eq!(resolution.decision.original, archetype);
        if resolution.is_terminal() {
            prop_assert_eq!(resolution.decision.archetype, Archetype::BASELINE);
        }
    }
}
