use std::collections::{BTreeMap, VecDeque};

use spawn_director_core::{
    Archetype, ArchetypeCounts, DirectorConfig, EnemyHandle, GroupId, History, PlacementPattern,
    SpawnTask, Stage,
};
use spawn_director_system_placement::{SideSelector, SpacingHistory};
use spawn_director_system_selection::{CooldownMap, Roster, WeightedSelector};

use crate::density::DensityController;
use crate::fixed_sequence::FixedSequence;
use crate::phase::{Phase, PhaseState};
use crate::stats::SpawnStats;

/// Every piece of mutable state owned by one director.
///
/// Nothing survives a stage reset: queues, histories, timers and counters are
/// rebuilt from the configuration.
#[derive(Clone, Debug)]
pub struct DirectorState {
    pub(crate) stage: Stage,
    pub(crate) stage_time: f32,
    pub(crate) tick: u64,
    pub(crate) phase_state: PhaseState,
    pub(crate) phase: Option<Phase>,
    pub(crate) phase_timer: f32,
    pub(crate) cooldown_timer: f32,
    pub(crate) release_timer: f32,
    pub(crate) queue: VecDeque<SpawnTask>,
    pub(crate) budget_remaining: u32,
    pub(crate) previous_strong: bool,
    pub(crate) phases_since_formation: u32,
    pub(crate) phase_count: u32,
    pub(crate) wave_counts: ArchetypeCounts,
    pub(crate) tick_counts: ArchetypeCounts,
    pub(crate) cooldowns: CooldownMap,
    pub(crate) short_history: History<Archetype>,
    pub(crate) long_history: History<Archetype>,
    pub(crate) formation_history: History<PlacementPattern>,
    pub(crate) sides: SideSelector,
    pub(crate) spacing: SpacingHistory,
    pub(crate) selector: WeightedSelector,
    pub(crate) density: DensityController,
    pub(crate) fixed: Option<FixedSequence>,
    pub(crate) next_group: u32,
    pub(crate) commanders: BTreeMap<GroupId, EnemyHandle>,
    pub(crate) lifetime: ArchetypeCounts,
    pub(crate) stats: SpawnStats,
}

impl DirectorState {
    pub(crate) fn new(config: &DirectorConfig, stage: Stage, plan_offset: usize) -> Self {
        let fixed = (stage.get() == config.fixed_sequence.stage)
            .then(|| FixedSequence::new(&config.fixed_sequence));
        Self {
            stage,
            stage_time: 0.0,
            tick: 0,
            phase_state: PhaseState::Generating,
            phase: None,
            phase_timer: 0.0,
            cooldown_timer: 0.0,
            release_timer: 0.0,
            queue: VecDeque::new(),
            budget_remaining: config.stages.budget(stage),
            previous_strong: false,
            phases_since_formation: config.phases.formation.min_phase_gap,
            phase_count: 0,
            wave_counts: ArchetypeCounts::new(),
            tick_counts: ArchetypeCounts::new(),
            cooldowns: CooldownMap::new(),
            short_history: History::with_capacity(config.selector.short_window),
            long_history: History::with_capacity(config.selector.long_window),
            formation_history: History::with_capacity(config.phases.formation.history),
            sides: SideSelector::new(&config.placement),
            spacing: SpacingHistory::new(),
            selector: WeightedSelector::new(
                config,
                Roster::for_stage(config, stage),
                plan_offset,
            ),
            density: DensityController::new(config.density.clone()),
            fixed,
            next_group: 0,
            commanders: BTreeMap::new(),
            lifetime: ArchetypeCounts::new(),
            stats: SpawnStats::default(),
        }
    }

    /// Tasks waiting in the main queue or the density backlog, per archetype.
    #[must_use]
    pub fn queued(&self) -> ArchetypeCounts {
        let mut counts = ArchetypeCounts::new();
        self.queue
            .iter()
            .chain(self.density.iter().map(|pending| &pending.task))
            .for_each(|task| counts.increment(task.archetype));
        counts
    }

    /// Active stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Seconds since the stage started.
    #[must_use]
    pub fn stage_time(&self) -> f32 {
        self.stage_time
    }

    /// Updates processed since the stage started.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Current state of the phase machine.
    #[must_use]
    pub fn phase_state(&self) -> PhaseState {
        self.phase_state
    }

    /// Most recently generated phase.
    #[must_use]
    pub fn phase(&self) -> Option<&Phase> {
        self.phase.as_ref()
    }

    /// Tasks still waiting in the main spawn queue.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Tasks still waiting in the main spawn queue, next release first.
    pub fn queued_tasks(&self) -> impl Iterator<Item = &SpawnTask> {
        self.queue.iter()
    }

    /// Secondary queue of deferred tasks.
    #[must_use]
    pub fn density(&self) -> &DensityController {
        &self.density
    }

    /// Spawns the stage budget still allows.
    #[must_use]
    pub fn budget_remaining(&self) -> u32 {
        self.budget_remaining
    }

    /// Whether the last generated phase queued a strong archetype.
    #[must_use]
    pub fn previous_strong(&self) -> bool {
        self.previous_strong
    }

    /// Phases generated since the stage started.
    #[must_use]
    pub fn phase_count(&self) -> u32 {
        self.phase_count
    }

    /// Cumulative spawns per archetype since the stage started.
    #[must_use]
    pub fn lifetime(&self) -> &ArchetypeCounts {
        &self.lifetime
    }

    /// Short spawn history.
    #[must_use]
    pub fn short_history(&self) -> &History<Archetype> {
        &self.short_history
    }

    /// Long spawn history.
    #[must_use]
    pub fn long_history(&self) -> &History<Archetype> {
        &self.long_history
    }

    /// Recent spawn points.
    #[must_use]
    pub fn spacing(&self) -> &SpacingHistory {
        &self.spacing
    }

    /// Archetypes the roster still owes an appearance.
    #[must_use]
    pub fn roster_pending(&self) -> &[Archetype] {
        self.selector.roster().pending()
    }

    /// Commander handle leading `group`, while the group is known.
    #[must_use]
    pub fn commander(&self, group: GroupId) -> Option<EnemyHandle> {
        self.commanders.get(&group).copied()
    }

    /// Spice injections issued on the fixed-sequence stage.
    #[must_use]
    pub fn spice_count(&self) -> u32 {
        self.fixed.as_ref().map_or(0, FixedSequence::spice_count)
    }
}
