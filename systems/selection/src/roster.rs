use spawn_director_core::{Archetype, DirectorConfig, Stage};

/// Archetypes that must appear at least once early in a stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    pending: Vec<Archetype>,
}

impl Roster {
    /// Creates a roster from an explicit list.
    #[must_use]
    pub fn new(pending: Vec<Archetype>) -> Self {
        Self { pending }
    }

    /// Roster of every archetype newly unlocked on `stage`.
    #[must_use]
    pub fn for_stage(config: &DirectorConfig, stage: Stage) -> Self {
        let pending = Archetype::ALL
            .iter()
            .copied()
            .filter(|archetype| !archetype.is_commander_only())
            .filter(|archetype| config.unlock_stage(*archetype) == stage.get())
            .collect();
        Self { pending }
    }

    /// Removes and returns the first candidate still owed an appearance.
    pub fn take_first(&mut self, candidates: &[Archetype]) -> Option<Archetype> {
        let chosen = candidates
            .iter()
            .copied()
            .find(|candidate| self.pending.contains(candidate))?;
        self.pending.retain(|entry| *entry != chosen);
        Some(chosen)
    }

    /// Archetypes still owed an appearance.
    #[must_use]
    pub fn pending(&self) -> &[Archetype] {
        &self.pending
    }
}

/// Loosely rotating thematic bias of an encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncounterPlan {
    /// Crowds of small melee units.
    Swarm,
    /// Fast harassment.
    Skirmish,
    /// Area-denial bombardment.
    Siege,
    /// Space control around the player.
    Control,
}

impl EncounterPlan {
    /// Every plan in rotation order.
    pub const ALL: [EncounterPlan; 4] = [
        EncounterPlan::Swarm,
        EncounterPlan::Skirmish,
        EncounterPlan::Siege,
        EncounterPlan::Control,
    ];

    /// Archetype the plan favours.
    #[must_use]
    pub const fn favoured(self) -> Archetype {
        match self {
            Self::Swarm => Archetype::Swarmer,
            Self::Skirmish => Archetype::Dasher,
            Self::Siege => Archetype::Bomber,
            Self::Control => Archetype::Weaver,
        }
    }

    /// Plan active `stage_time` seconds into a stage whose rotation starts at `offset`.
    #[must_use]
    pub fn at(stage_time: f32, period: f32, offset: usize) -> Self {
        let step = if period > 0.0 {
            (stage_time.max(0.0) / period) as usize
        } else {
            0
        };
        Self::ALL[(offset + step) % Self::ALL.len()]
    }
}

/// Per-phase throttle on elite picks, independent of population caps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EliteLimiter {
    cooldown: f32,
    picks_this_phase: u32,
}

impl EliteLimiter {
    /// Advances the cooldown by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    /// Reports whether elite weights must be zeroed.
    #[must_use]
    pub fn blocks(&self, phase_cap: u32) -> bool {
        self.cooldown > 0.0 || self.picks_this_phase >= phase_cap
    }

    /// Registers an elite pick.
    pub fn record_pick(&mut self, cooldown: f32) {
        self.cooldown = cooldown;
        self.picks_this_phase += 1;
    }

    /// Clears the per-phase count at the start of a new phase.
    pub fn reset_phase(&mut self) {
        self.picks_this_phase = 0;
    }

    /// Elite picks made during the current phase.
    #[must_use]
    pub fn picks_this_phase(&self) -> u32 {
        self.picks_this_phase
    }
}
