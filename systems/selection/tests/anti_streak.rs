use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use spawn_director_core::{Archetype, ArchetypeCounts, DirectorConfig, History, Stage};
use spawn_director_system_selection::{
    build_candidates, CandidateContext, CandidateFilter, CooldownMap, Roster, SelectionContext,
    SelectionReason, WeightedSelector,
};

#[test]
fn weighted_draws_never_lock_onto_one_archetype() {
    let config = DirectorConfig::default();
    let stage = Stage::new(5);
    let cooldowns = CooldownMap::new();
    let counts = ArchetypeCounts::new();
    let context = CandidateContext {
        config: &config,
        stage,
        cooldowns: &cooldowns,
        alive: &counts,
        queued: &counts,
    };
    let mut candidates = Vec::new();
    build_candidates(&context, CandidateFilter::NON_STRONG, &mut candidates);
    assert!(candidates.len() > 1);

    let mut selector = WeightedSelector::new(&config, Roster::default(), 0);
    let mut short = History::with_capacity(config.selector.short_window);
    let mut long = History::with_capacity(config.selector.long_window);
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let window = config.selector.short_window;
    let mut longest_run = 0;

    for step in 0..2_000 {
        let selection = selector.select(
            &candidates,
            &SelectionContext {
                stage,
                stage_time: 120.0 + step as f32,
                short_history: &short,
                long_history: &long,
            },
            &mut rng,
        );
        assert_ne!(selection.reason, SelectionReason::Roster);
        short.push(selection.archetype);
        long.push(selection.archetype);
        longest_run = longest_run.max(short.trailing_run(selection.archetype));
    }

    assert!(
        longest_run < window,
        "saw a run of {longest_run} identical picks"
    );
}

#[test]
fn baseline_share_settles_near_target() {
    let config = DirectorConfig::default();
    let stage = Stage::new(8);
    let cooldowns = CooldownMap::new();
    let counts = ArchetypeCounts::new();
    let context = CandidateContext {
        config: &config,
        stage,
        cooldowns: &cooldowns,
        alive: &counts,
        queued: &counts,
    };
    let mut candidates = Vec::new();
    build_candidates(&context, CandidateFilter::NON_STRONG, &mut candidates);

    let mut selector = WeightedSelector::new(&config, Roster::default(), 0);
    let mut short = History::with_capacity(config.selector.short_window);
    let mut long = History::with_capacity(config.selector.long_window);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut baseline = 0usize;
    let total = 4_000usize;

    for step in 0..total {
        let selection = selector.select(
            &candidates,
            &SelectionContext {
                stage,
                stage_time: 60.0 + step as f32 * 0.5,
                short_history: &short,
                long_history: &long,
            },
            &mut rng,
        );
        if selection.archetype == Archetype::BASELINE {
            baseline += 1;
        }
        short.push(selection.archetype);
        long.push(selection.archetype);
    }

    let share = baseline as f32 / total as f32;
    assert!(share < config.selector.ratio_burst[2], "baseline share {share}");
}
