//! Minimal host game: a pooled arena whose enemies die early at random.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spawn_director_core::{
    derive_labeled_seed, ArchetypeCounts, ArenaPool, DirectorConfig, EnemyHandle, EnemyInit,
    EnemyPool, PopulationSnapshot, SpawnRecord, Stage, WorldView,
};
use spawn_director_system_director::{Director, SpawnStats};

/// Radius of the circle the simulated player walks along.
const PLAYER_ORBIT: f32 = 120.0;

/// Host enemy pool: the shared arena plus randomised early deaths.
#[derive(Debug)]
pub(crate) struct HostPool {
    arena: ArenaPool,
    rng: ChaCha8Rng,
}

impl HostPool {
    /// Creates a pool holding at most `limit` live enemies.
    pub(crate) fn new(limit: usize, seed: u64) -> Self {
        Self {
            arena: ArenaPool::new(limit),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub(crate) fn snapshot(&self) -> PopulationSnapshot {
        self.arena.snapshot()
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        self.arena.advance(dt);
    }

    pub(crate) fn live(&self) -> usize {
        self.arena.live()
    }
}

impl EnemyPool for HostPool {
    fn acquire(&mut self) -> Option<EnemyHandle> {
        self.arena.acquire()
    }

    fn release(&mut self, handle: EnemyHandle) {
        self.arena.release(handle);
    }

    fn initialize(&mut self, handle: EnemyHandle, init: &EnemyInit) {
        // Players kill most enemies well before they would leave on their own.
        let fraction = self.rng.gen_range(0.25..1.0);
        let init = EnemyInit {
            lifespan: init.lifespan * fraction,
            ..*init
        };
        self.arena.initialize(handle, &init);
    }
}

/// Parameters of one headless run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RunSettings {
    pub(crate) stage: Stage,
    pub(crate) seconds: f32,
    pub(crate) hz: u32,
    pub(crate) pool_limit: usize,
}

/// Everything a finished run reports.
#[derive(Clone, Debug)]
pub(crate) struct Outcome {
    pub(crate) records: Vec<SpawnRecord>,
    pub(crate) stats: SpawnStats,
    pub(crate) lifetime: ArchetypeCounts,
    pub(crate) budget_remaining: u32,
    pub(crate) spice: u32,
    pub(crate) peak_alive: usize,
}

/// Runs one stage at a fixed step and collects every spawn.
pub(crate) fn simulate(config: &DirectorConfig, settings: RunSettings) -> Outcome {
    let stage = settings.stage;
    let mut director = Director::for_stage(config.clone(), stage);
    let mut arena = HostPool::new(
        settings.pool_limit,
        derive_labeled_seed(config.seed, "host-lifespans"),
    );
    let dt = 1.0 / settings.hz.max(1) as f32;
    let steps = (settings.seconds.max(0.0) / dt).round() as u64;
    let mut records = Vec::new();
    let mut peak_alive = 0;

    for step in 0..steps {
        let elapsed = step as f32 * dt;
        let population = arena.snapshot();
        let world = WorldView {
            elapsed,
            player_position: Vec2::from_angle(elapsed * 0.2) * PLAYER_ORBIT,
            stage,
            population: &population,
        };
        director.update(dt, &world, &mut arena, &mut records);
        peak_alive = peak_alive.max(arena.live());
        arena.advance(dt);
    }

    let state = director.state();
    Outcome {
        records,
        stats: director.stats().clone(),
        lifetime: *state.lifetime(),
        budget_remaining: state.budget_remaining(),
        spice: state.spice_count(),
        peak_alive,
    }
}

#[cfg(test)]
mod tests {
    use spawn_director_core::Archetype;

    use super::*;

    fn init(archetype: Archetype, lifespan: f32) -> EnemyInit {
        EnemyInit {
            archetype,
            position: Vec2::ZERO,
            hp_multiplier: 1.0,
            speed_multiplier: 1.0,
            escort: Default::default(),
            leader: None,
            velocity: None,
            entry: None,
            lifespan,
        }
    }

    #[test]
    fn lifespans_are_cut_short() {
        let mut pool = HostPool::new(4, 1);
        for _ in 0..4 {
            let handle = pool.acquire().expect("slot");
            pool.initialize(handle, &init(Archetype::Grunt, 10.0));
        }
        pool.advance(2.4);
        assert_eq!(pool.live(), 4);
        pool.advance(7.6);
        assert_eq!(pool.live(), 0);
        assert!(pool.acquire().is_some());
    }

    #[test]
    fn simulation_spends_budget() {
        let config = DirectorConfig::default();
        let outcome = simulate(
            &config,
            RunSettings {
                stage: Stage::new(2),
                seconds: 60.0,
                hz: 30,
                pool_limit: 128,
            },
        );
        assert!(!outcome.records.is_empty());
        assert_eq!(outcome.stats.total as usize, outcome.records.len());
        assert_eq!(outcome.lifetime.total() as usize, outcome.records.len());
        assert!(outcome.budget_remaining < config.stages.budget(Stage::new(2)));
    }
}
