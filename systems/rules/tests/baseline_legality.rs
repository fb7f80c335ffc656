use glam::Vec2;
use spawn_director_core::{
    Archetype, ArchetypeCounts, DirectorConfig, SpawnDecision, SpawnTask, Stage,
};
use spawn_director_system_rules::{RuleContext, RuleRegistry};

fn crowded() -> ArchetypeCounts {
    let mut counts = ArchetypeCounts::new();
    for archetype in Archetype::ALL {
        for _ in 0..40 {
            counts.increment(archetype);
        }
    }
    counts
}

#[test]
fn unconstrained_baseline_is_never_blocked() {
    let registry = RuleRegistry::standard(&DirectorConfig::default());
    let counts = crowded();
    let points = [Vec2::new(440.0, 0.0), Vec2::new(441.0, 1.0)];
    let mut decision = SpawnDecision::from_task(&SpawnTask::single(Archetype::BASELINE, 0.0));
    decision.position = Some(Vec2::new(440.0, 0.0));
    decision.spacing_enforced = false;

    for stage in Stage::all() {
        let context = RuleContext {
            stage,
            alive: &counts,
            wave: &counts,
            tick: &counts,
            recent_points: &points,
            player_position: Vec2::new(440.0, 0.0),
        };
        let report = registry.validate(&decision, &context);
        assert!(
            !report.has_blocking(),
            "baseline blocked on stage {}",
            stage.get()
        );
    }
}

#[test]
fn dump_lists_every_rule() {
    let registry = RuleRegistry::standard(&DirectorConfig::default());
    let dump = registry.to_string();
    for rule in registry.rules() {
        assert!(dump.contains(rule.name.as_str()), "missing {}", rule.name);
    }
    assert_eq!(dump.lines().count(), registry.len() + 1);
}
