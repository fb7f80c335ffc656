mod support;

use spawn_director_core::{DirectorConfig, PhaseKind, Stage};
use spawn_director_system_director::Director;
use support::{Arena, DT};

#[test]
fn strong_phase_is_followed_by_a_non_strong_recovery() {
    let config = DirectorConfig::default();
    let stage = Stage::new(10);
    let capacity = config.stages.capacity(stage);
    let expected = ((capacity as f32 * 0.2).round() as u32).max(3);
    let mut director = Director::for_stage(config, stage);
    let mut arena = Arena::new(64).with_lifespan_scale(0.3);
    let mut records = Vec::new();

    let mut last_phase = 0;
    let mut previous_strong = false;
    let mut checked = 0;
    for _ in 0..(400.0 / DT) as usize {
        support::step(&mut director, &mut arena, stage, &mut records);
        let state = director.state();
        if state.phase_count() == last_phase {
            continue;
        }
        last_phase = state.phase_count();
        let Some(phase) = state.phase() else {
            continue;
        };
        if previous_strong && state.budget_remaining() >= expected + state.density().len() as u32 {
            assert_eq!(phase.kind, PhaseKind::Recovery);
            assert!(phase.after_strong);
            assert_eq!(phase.target_count, expected);
            assert!(state.queued_tasks().all(|task| !task.archetype.is_strong()));
            checked += 1;
        }
        previous_strong = phase.strong;
    }
    assert!(checked > 0, "no strong phase was generated");
}
