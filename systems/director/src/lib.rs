#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative spawn director driving one encounter.
//!
//! The [`Director`] owns every queue, history and timer in a single
//! [`DirectorState`] and advances them once per simulation step. A cyclic phase
//! machine picks a generation recipe, the recipe fills the spawn queue, the
//! queue drains at the recipe's cadence and every released task is validated
//! against the rule registry, relaxed when blocked and finally materialised
//! through the host's enemy pool.

mod density;
mod executor;
mod fixed_sequence;
mod generators;
mod phase;
mod resolver;
mod state;
mod stats;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spawn_director_core::{
    derive_stage_seed, ArchetypeCounts, DirectorConfig, EnemyPool, PhaseKind, Role,
    SpawnDecision, SpawnSide, SpawnTask, Stage, StatsSink, WorldView,
};
use spawn_director_system_placement::{edge_position, place_on_side, place_single};
use spawn_director_system_rules::{RuleContext, RuleRegistry};
use spawn_director_system_selection::{CandidateContext, EncounterPlan};
use tracing::{debug, info, trace};

pub use density::{DensityController, PendingTask};
pub use phase::{phase_cooldown, Phase, PhaseState};
pub use resolver::{resolve, Resolution};
pub use state::DirectorState;
pub use stats::SpawnStats;

use crate::executor::execute;
use crate::generators::Generator;
use crate::phase::{choose_kind, PhaseHistory};

/// Single authoritative spawn director.
///
/// All randomness flows through one `R`, reseeded from the configured global
/// seed on every stage reset, so identical tick deltas replay identically.
#[derive(Debug)]
pub struct Director<R = ChaCha8Rng> {
    config: DirectorConfig,
    rules: RuleRegistry,
    rng: R,
    state: DirectorState,
}

impl Director<ChaCha8Rng> {
    /// Creates a director with the default rule set for `config`.
    #[must_use]
    pub fn for_stage(config: DirectorConfig, stage: Stage) -> Self {
        let rules = RuleRegistry::standard(&config);
        Self::new(config, rules, stage)
    }
}

impl<R: Rng + SeedableRng> Director<R> {
    /// Creates a director for `stage` using an explicit rule registry.
    #[must_use]
    pub fn new(config: DirectorConfig, rules: RuleRegistry, stage: Stage) -> Self {
        let mut rng = R::seed_from_u64(derive_stage_seed(config.seed, stage));
        let plan_offset = rng.gen_range(0..EncounterPlan::ALL.len());
        let state = DirectorState::new(&config, stage, plan_offset);
        Self {
            config,
            rules,
            rng,
            state,
        }
    }

    /// Discards every queue, history and timer and starts `stage` afresh.
    pub fn reset_for_stage(&mut self, stage: Stage) {
        self.rng = R::seed_from_u64(derive_stage_seed(self.config.seed, stage));
        let plan_offset = self.rng.gen_range(0..EncounterPlan::ALL.len());
        self.state = DirectorState::new(&self.config, stage, plan_offset);
        info!(
            stage = stage.get(),
            budget = self.state.budget_remaining,
            roster = self.state.roster_pending().len(),
            "director reset for stage"
        );
    }

    /// Advances the director by `dt` seconds.
    ///
    /// A stage change in `world` resets the director before anything else runs.
    pub fn update(
        &mut self,
        dt: f32,
        world: &WorldView<'_>,
        pool: &mut impl EnemyPool,
        sink: &mut impl StatsSink,
    ) {
        if world.stage != self.state.stage {
            self.reset_for_stage(world.stage);
        }
        let dt = dt.max(0.0);
        self.state.tick += 1;
        self.state.stage_time += dt;
        self.state.tick_counts.clear();
        self.state.cooldowns.tick(dt);
        self.state.selector.tick(dt);

        match self.state.phase_state {
            PhaseState::Generating => self.generate(world),
            PhaseState::Spawning => self.drain(dt, world, pool, sink),
            PhaseState::Waiting => self.wait(dt, world),
            PhaseState::Cooldown => {
                self.state.cooldown_timer -= dt;
                if self.state.cooldown_timer <= 0.0 {
                    self.transition(PhaseState::Generating);
                }
            }
        }

        self.inject_spice(dt, world);
        self.release_pending(dt, world, pool, sink);
    }

    /// Registered rules.
    #[must_use]
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Read-only view of the director state.
    #[must_use]
    pub fn state(&self) -> &DirectorState {
        &self.state
    }

    /// Telemetry accumulated since the stage started.
    #[must_use]
    pub fn stats(&self) -> &SpawnStats {
        &self.state.stats
    }

    fn transition(&mut self, next: PhaseState) {
        debug!(
            from = ?self.state.phase_state,
            to = ?next,
            stage_time = self.state.stage_time,
            "phase state changed"
        );
        self.state.phase_state = next;
    }

    fn alive(&self, world: &WorldView<'_>) -> ArchetypeCounts {
        combine(world.population.counts(), &self.state.tick_counts)
    }

    fn generate(&mut self, world: &WorldView<'_>) {
        if self.state.budget_remaining == 0 {
            self.state.phase_timer = 0.0;
            self.transition(PhaseState::Waiting);
            return;
        }

        let stage = self.state.stage;
        let history = PhaseHistory {
            previous_strong: self.state.previous_strong,
            phases_since_formation: self.state.phases_since_formation,
        };
        let kind = choose_kind(&self.config, stage, history, &mut self.rng);
        let alive = self.alive(world);
        let queued = self.state.queued();
        let state = &mut self.state;
        state.selector.begin_phase();

        let mut tasks = Vec::new();
        let phase = {
            let mut generator = Generator {
                config: &self.config,
                stage,
                stage_time: state.stage_time,
                cooldowns: &state.cooldowns,
                alive,
                queued,
                short_history: &state.short_history,
                long_history: &state.long_history,
                selector: &mut state.selector,
                sides: &state.sides,
                formation_history: &mut state.formation_history,
                next_group: &mut state.next_group,
                budget: state.budget_remaining.saturating_sub(queued.total()),
                rng: &mut self.rng,
            };
            match kind {
                PhaseKind::Recovery => generator.recovery(history.previous_strong, &mut tasks),
                PhaseKind::Formation => generator.formation(&mut tasks),
                PhaseKind::Mixed => generator.mixed(&mut tasks),
                PhaseKind::Pressure => generator.pressure(&mut tasks),
                PhaseKind::Standard => generator.standard(&mut tasks),
                PhaseKind::FixedSequence => match state.fixed.as_mut() {
                    Some(fixed) => fixed.generate(&mut generator, &state.lifetime, &mut tasks),
                    None => generator.standard(&mut tasks),
                },
            }
        };

        state.previous_strong = phase.strong;
        if kind == PhaseKind::Formation {
            state.phases_since_formation = 0;
        } else {
            state.phases_since_formation += 1;
        }
        state.phase_count += 1;
        state.wave_counts.clear();
        state.phase_timer = 0.0;
        state.release_timer = tasks.first().map_or(0.0, |task| task.delay);
        state.queue.extend(tasks);
        state.stats.record_phase(kind);
        debug!(
            phase = ?kind,
            count = phase.target_count,
            strong = phase.strong,
            primary = phase.primary.map(|archetype| archetype.name()),
            budget = state.budget_remaining,
            "phase generated"
        );
        state.phase = Some(phase);
        self.transition(PhaseState::Spawning);
    }

    fn drain(
        &mut self,
        dt: f32,
        world: &WorldView<'_>,
        pool: &mut impl EnemyPool,
        sink: &mut impl StatsSink,
    ) {
        self.state.phase_timer += dt;
        self.state.release_timer -= dt;
        let cap = self.config.stages.population_cap(self.state.stage);
        while self.state.release_timer <= 0.0 {
            let alive = world.population.total() + self.state.tick_counts.total();
            if alive >= cap {
                self.state.release_timer = 0.0;
                break;
            }
            let Some(task) = self.state.queue.pop_front() else {
                break;
            };
            self.process(task, true, world, pool, sink);
            match self.state.queue.front() {
                Some(next) => self.state.release_timer += next.delay,
                None => break,
            }
        }

        let max_duration = self
            .state
            .phase
            .as_ref()
            .map_or(self.config.waiting.max_duration, |phase| phase.max_duration);
        if self.state.queue.is_empty() {
            self.state.phase_timer = 0.0;
            self.transition(PhaseState::Waiting);
        } else if self.state.phase_timer > max_duration {
            let leftover = self.state.queue.len();
            while let Some(task) = self.state.queue.pop_front() {
                self.defer(task, true);
            }
            debug!(leftover, "phase overran its maximum duration");
            self.state.phase_timer = 0.0;
            self.transition(PhaseState::Waiting);
        }
    }

    fn wait(&mut self, dt: f32, world: &WorldView<'_>) {
        self.state.phase_timer += dt;
        let tuning = &self.config.waiting;
        let alive = world.population.total() + self.state.tick_counts.total();
        let strong = world.population.strong() + self.state.tick_counts.role(Role::Elite);
        let thinned = alive == 0 || (alive <= tuning.residual && strong <= tuning.max_strong);
        let max_duration = self
            .state
            .phase
            .as_ref()
            .map_or(tuning.max_duration, |phase| phase.max_duration);
        if thinned || self.state.phase_timer >= max_duration {
            self.state.cooldown_timer = self
                .state
                .phase
                .as_ref()
                .map_or(0.0, |phase| phase.cooldown);
            self.transition(PhaseState::Cooldown);
        }
    }

    fn inject_spice(&mut self, dt: f32, world: &WorldView<'_>) {
        if self.state.budget_remaining == 0 {
            return;
        }
        let alive = self.alive(world);
        let queued = self.state.queued();
        let state = &mut self.state;
        let Some(fixed) = state.fixed.as_mut() else {
            return;
        };
        let candidates = CandidateContext {
            config: &self.config,
            stage: state.stage,
            cooldowns: &state.cooldowns,
            alive: &alive,
            queued: &queued,
        };
        let blocked = state.selector.elites_blocked(state.stage.band());
        let spice = fixed.spice(
            dt,
            &self.config.fixed_sequence,
            &candidates,
            blocked,
            &mut self.rng,
        );
        if let Some(archetype) = spice {
            state.selector.note_external_pick(archetype);
            state
                .density
                .enqueue(SpawnTask::single(archetype, 0.0), 0.0, true);
            debug!(archetype = archetype.name(), "spice injected");
        }
    }

    fn release_pending(
        &mut self,
        dt: f32,
        world: &WorldView<'_>,
        pool: &mut impl EnemyPool,
        sink: &mut impl StatsSink,
    ) {
        let cap = self.config.stages.population_cap(self.state.stage);
        let alive = world.population.total() + self.state.tick_counts.total();
        let room = cap.saturating_sub(alive) as usize;
        let mut released = Vec::new();
        let flushed = self.state.density.handle(
            dt,
            self.state.stage_time,
            self.config.placement.spacing_window,
            &mut self.state.spacing,
            room,
            &mut released,
        );
        self.state.stats.flushes += flushed as u32;
        for pending in released {
            self.process(pending.task, pending.spacing_enforced, world, pool, sink);
        }
    }

    fn defer(&mut self, task: SpawnTask, spacing_enforced: bool) {
        self.state.density.defer(task, spacing_enforced);
        self.state.stats.deferrals += 1;
    }

    /// Places, validates, relaxes and executes one released task.
    fn process(
        &mut self,
        task: SpawnTask,
        spacing_enforced: bool,
        world: &WorldView<'_>,
        pool: &mut impl EnemyPool,
        sink: &mut impl StatsSink,
    ) {
        let mut decision = SpawnDecision::from_task(&task);
        decision.spacing_enforced = spacing_enforced;
        if decision.position.is_none() {
            let Some((side, position)) = self.place(&task, spacing_enforced) else {
                self.defer(task, spacing_enforced);
                return;
            };
            decision.side = Some(side);
            decision.position = Some(position);
        }

        let alive = self.alive(world);
        let queued = self.state.queued();
        let rules = RuleContext {
            stage: self.state.stage,
            alive: &alive,
            wave: &self.state.wave_counts,
            tick: &self.state.tick_counts,
            recent_points: self.state.spacing.points(),
            player_position: world.player_position,
        };
        let candidates = CandidateContext {
            config: &self.config,
            stage: self.state.stage,
            cooldowns: &self.state.cooldowns,
            alive: &alive,
            queued: &queued,
        };
        let resolution = resolve(decision, &self.rules, &rules, &candidates);
        for violation in resolution.report.advisories() {
            trace!(rule = violation.rule.as_str(), "advisory rule violated");
        }

        let decision = resolution.decision;
        let Some(position) = decision.position else {
            self.defer(task, decision.spacing_enforced);
            return;
        };
        if execute(&mut self.state, &self.config, &decision, position, pool, sink).is_none() {
            self.defer(task, decision.spacing_enforced);
        }
    }

    fn place(&mut self, task: &SpawnTask, spacing_enforced: bool) -> Option<(SpawnSide, Vec2)> {
        let tuning = &self.config.placement;
        let spacing = &self.state.spacing;
        match (task.side, spacing_enforced) {
            (Some(side), true) => {
                place_on_side(tuning, side, spacing, &mut self.rng).map(|position| (side, position))
            }
            (None, true) => place_single(tuning, &self.state.sides, spacing, &mut self.rng),
            (side, false) => {
                let side = side.unwrap_or_else(|| self.state.sides.choose(&mut self.rng));
                Some((side, edge_position(tuning, side, &mut self.rng)))
            }
        }
    }
}

/// Per-archetype sum of two counters.
fn combine(base: &ArchetypeCounts, extra: &ArchetypeCounts) -> ArchetypeCounts {
    let mut combined = *base;
    for (archetype, count) in extra.iter() {
        for _ in 0..count {
            combined.increment(archetype);
        }
    }
    combined
}
