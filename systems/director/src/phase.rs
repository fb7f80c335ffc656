use rand::Rng;
use spawn_director_core::{
    weighted_index, Archetype, DirectorConfig, PhaseKind, PlacementPattern, Stage,
};

/// Cyclic state of the phase machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseState {
    /// Next phase is generated on the coming tick.
    Generating,
    /// Spawn queue is being drained.
    Spawning,
    /// Waiting for the wave to thin out.
    Waiting,
    /// Counting down the inter-phase delay.
    Cooldown,
}

/// Currently active generation recipe.
#[derive(Clone, Debug, PartialEq)]
pub struct Phase {
    /// Recipe kind.
    pub kind: PhaseKind,
    /// Archetype the recipe centres on, when it has one.
    pub primary: Option<Archetype>,
    /// Placement pattern of the recipe.
    pub pattern: PlacementPattern,
    /// Number of tasks queued.
    pub target_count: u32,
    /// Delay spent in cooldown after the wave thins out.
    pub cooldown: f32,
    /// Upper bound on seconds spent spawning and again on seconds spent waiting.
    pub max_duration: f32,
    /// Whether the phase queued any strong archetype.
    pub strong: bool,
    /// Whether the phase was forced by a strong predecessor.
    pub after_strong: bool,
}

impl Phase {
    pub(crate) fn new(kind: PhaseKind, config: &DirectorConfig) -> Self {
        Self {
            kind,
            primary: None,
            pattern: PlacementPattern::Single,
            target_count: 0,
            cooldown: phase_cooldown(kind, config),
            max_duration: config.waiting.max_duration,
            strong: false,
            after_strong: false,
        }
    }
}

/// Inter-phase delay of a recipe.
#[must_use]
pub fn phase_cooldown(kind: PhaseKind, config: &DirectorConfig) -> f32 {
    let phases = &config.phases;
    match kind {
        PhaseKind::Recovery => phases.recovery.cooldown,
        PhaseKind::Formation => phases.formation.cooldown,
        PhaseKind::Mixed => phases.mixed.cooldown,
        PhaseKind::Pressure => phases.pressure.cooldown,
        PhaseKind::Standard => phases.standard.cooldown,
        PhaseKind::FixedSequence => config.fixed_sequence.cooldown,
    }
}

/// Inputs that steer which recipe runs next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PhaseHistory {
    pub(crate) previous_strong: bool,
    pub(crate) phases_since_formation: u32,
}

/// Picks the next recipe. A strong predecessor always yields recovery.
pub(crate) fn choose_kind<R: Rng + ?Sized>(
    config: &DirectorConfig,
    stage: Stage,
    history: PhaseHistory,
    rng: &mut R,
) -> PhaseKind {
    if history.previous_strong {
        return PhaseKind::Recovery;
    }
    if stage.get() == config.fixed_sequence.stage {
        return PhaseKind::FixedSequence;
    }

    let band = stage.band().index();
    let weights = &config.phases.weights;
    let formation_ready = history.phases_since_formation >= config.phases.formation.min_phase_gap;
    let table = [
        (PhaseKind::Recovery, weights.recovery[band]),
        (
            PhaseKind::Formation,
            if formation_ready {
                weights.formation[band]
            } else {
                0.0
            },
        ),
        (PhaseKind::Mixed, weights.mixed[band]),
        (PhaseKind::Pressure, weights.pressure[band]),
        (PhaseKind::Standard, weights.standard[band]),
    ];
    let odds = table.map(|(_, weight)| weight);
    weighted_index(&odds, rng).map_or(PhaseKind::Standard, |index| table[index].0)
}
