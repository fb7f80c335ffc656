mod support;

use spawn_director_core::{DirectorConfig, PhaseKind, Stage};
use spawn_director_system_director::Director;
use support::{Arena, DT};

#[test]
fn quotas_are_met_by_the_end_of_the_stage() {
    let config = DirectorConfig::default();
    let stage = Stage::new(config.fixed_sequence.stage);
    let mut director = Director::for_stage(config.clone(), stage);
    let mut arena = Arena::new(64).with_lifespan_scale(0.3);
    let mut records = Vec::new();
    for _ in 0..(900.0 / DT) as usize {
        support::step(&mut director, &mut arena, stage, &mut records);
        let state = director.state();
        if state.budget_remaining() == 0 && state.queue_len() == 0 && state.density().is_empty() {
            break;
        }
    }

    let lifetime = director.state().lifetime();
    assert!(lifetime.total() >= 100, "only {} spawns", lifetime.total());
    for quota in &config.fixed_sequence.quotas {
        assert!(
            lifetime.get(quota.archetype) >= quota.minimum,
            "{} spawned {} of {}",
            quota.archetype.name(),
            lifetime.get(quota.archetype),
            quota.minimum
        );
    }
    assert!(director.stats().phase(PhaseKind::FixedSequence) > 0);
    assert!(director.state().spice_count() <= config.fixed_sequence.spice_cap);
}

#[test]
fn other_stages_never_run_the_fixed_sequence() {
    let config = DirectorConfig::default();
    let stage = Stage::new(8);
    let mut director = Director::for_stage(config, stage);
    let _ = support::run(&mut director, stage, 120.0);
    assert_eq!(director.stats().phase(PhaseKind::FixedSequence), 0);
    assert_eq!(director.state().spice_count(), 0);
}
