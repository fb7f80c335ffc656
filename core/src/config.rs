//! Configuration tables and tuning knobs for the spawn director.
//!
//! Every adjustable constant lives here. [`DirectorConfig::default`] carries
//! the shipped tuning; designers override any subset of it from TOML.

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Archetype, PlacementPattern, PlayBounds, Role, Stage, StageBand, MAX_STAGE};

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse director config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration file could not be read.
    #[error("failed to read director config from {path:?}: {source}")]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// A per-stage table does not have one entry per stage.
    #[error("stage table `{table}` has {len} entries; expected {expected}")]
    StageTableLength {
        /// Name of the offending table.
        table: &'static str,
        /// Number of entries found.
        len: usize,
        /// Number of entries required.
        expected: usize,
    },
    /// An archetype has no profile.
    #[error("archetype {0:?} has no profile")]
    MissingArchetype(Archetype),
    /// An archetype is profiled twice.
    #[error("archetype {0:?} is profiled more than once")]
    DuplicateArchetype(Archetype),
    /// A role has no concurrency cap entry.
    #[error("role {0:?} has no cap entry")]
    MissingRole(Role),
    /// A role has more than one cap entry.
    #[error("role {0:?} has more than one cap entry")]
    DuplicateRole(Role),
    /// The baseline archetype is gated, which would break the fallback guarantee.
    #[error("baseline archetype {0:?} must unlock on stage 1 without cap or cooldown")]
    BaselineGated(Archetype),
    /// Placement geometry is unusable.
    #[error("invalid placement tuning: {0}")]
    InvalidPlacement(String),
    /// A stage band has no formation patterns to draw from.
    #[error("formation pool for {0:?} stages is empty")]
    EmptyFormationPool(StageBand),
}

/// Complete director configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Encounter seed; each stage derives its own stream from it.
    pub seed: u64,
    /// Per-stage capacity curve, spawn budget and population cap.
    pub stages: StageTable,
    /// Per-archetype unlock stage, cooldown, caps, weights and lifespan.
    pub archetypes: Vec<ArchetypeProfile>,
    /// Per-role concurrency ceilings.
    pub roles: Vec<RoleCap>,
    /// Spawn-zone and spacing geometry.
    pub placement: PlacementTuning,
    /// Stage-gated formation pattern pools.
    pub formations: FormationTables,
    /// Weighted selector modifiers.
    pub selector: SelectorTuning,
    /// Phase generator recipes and phase-kind mix.
    pub phases: PhaseTuning,
    /// Wave-thinning thresholds used while waiting.
    pub waiting: WaitingTuning,
    /// Secondary queue throttling.
    pub density: DensityTuning,
    /// Fixed-sequence stage variant.
    pub fixed_sequence: FixedSequenceTuning,
    /// Tiered fallbacks for archetypes whose caps are frequently contested.
    pub substitutions: Vec<SubstitutionTable>,
    /// Stages on which a blocked elite is downgraded to the baseline immediately.
    pub early_elite_stage: u8,
    /// Hit-point growth applied per stage beyond the first.
    pub hp_growth: f32,
    /// Speed growth applied per stage beyond the first.
    pub speed_growth: f32,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_d1ec_7042_0001,
            stages: StageTable::default(),
            archetypes: default_profiles(),
            roles: vec![
                RoleCap::new(Role::Core, None),
                RoleCap::new(Role::Harasser, Some([5, 7, 9])),
                RoleCap::new(Role::Controller, Some([2, 4, 6])),
                RoleCap::new(Role::Elite, Some([1, 2, 3])),
            ],
            placement: PlacementTuning::default(),
            formations: FormationTables::default(),
            selector: SelectorTuning::default(),
            phases: PhaseTuning::default(),
            waiting: WaitingTuning::default(),
            density: DensityTuning::default(),
            fixed_sequence: FixedSequenceTuning::default(),
            substitutions: vec![
                SubstitutionTable {
                    archetype: Archetype::Sniper,
                    early: vec![Archetype::Dasher, Archetype::Swarmer],
                    mid: vec![Archetype::Dasher, Archetype::Bomber],
                    late: vec![Archetype::Bomber, Archetype::Weaver],
                },
                SubstitutionTable {
                    archetype: Archetype::Shielder,
                    early: vec![Archetype::Splitter, Archetype::Swarmer],
                    mid: vec![Archetype::Splitter, Archetype::Swarmer],
                    late: vec![Archetype::Orbiter, Archetype::Splitter],
                },
            ],
            early_elite_stage: 3,
            hp_growth: 0.12,
            speed_growth: 0.04,
        }
    }
}

impl DirectorConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: DirectorConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks internal consistency of every table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let expected = usize::from(MAX_STAGE);
        for (table, len) in [
            ("capacity", self.stages.capacity.len()),
            ("budget", self.stages.budget.len()),
            ("population_cap", self.stages.population_cap.len()),
        ] {
            if len != expected {
                return Err(ConfigError::StageTableLength {
                    table,
                    len,
                    expected,
                });
            }
        }

        let mut seen = HashSet::new();
        for profile in &self.archetypes {
            if !seen.insert(profile.archetype) {
                return Err(ConfigError::DuplicateArchetype(profile.archetype));
            }
        }
        if let Some(missing) = Archetype::ALL.iter().find(|a| !seen.contains(*a)) {
            return Err(ConfigError::MissingArchetype(*missing));
        }

        let mut roles = HashSet::new();
        for cap in &self.roles {
            if !roles.insert(cap.role) {
                return Err(ConfigError::DuplicateRole(cap.role));
            }
        }
        if let Some(missing) = Role::ALL.iter().find(|r| !roles.contains(*r)) {
            return Err(ConfigError::MissingRole(*missing));
        }

        let baseline = Archetype::BASELINE;
        let gated = self.profile(baseline).map_or(true, |profile| {
            profile.unlock_stage > 1 || profile.population_cap.is_some() || profile.cooldown > 0.0
        });
        if gated || self.role_cap(baseline.role(), StageBand::Early).is_some() {
            return Err(ConfigError::BaselineGated(baseline));
        }

        let placement = &self.placement;
        if placement.margin <= 0.0 {
            return Err(ConfigError::InvalidPlacement(format!(
                "margin must be positive, got {}",
                placement.margin
            )));
        }
        if placement.bounds.min.x >= placement.bounds.max.x
            || placement.bounds.min.y >= placement.bounds.max.y
        {
            return Err(ConfigError::InvalidPlacement(
                "bounds min must be below bounds max".into(),
            ));
        }

        for band in [StageBand::Early, StageBand::Mid, StageBand::Late] {
            let pool = self.formations.for_band(band);
            if pool.iter().all(|entry| entry.weight <= 0.0) {
                return Err(ConfigError::EmptyFormationPool(band));
            }
        }

        Ok(())
    }

    /// Profile of one archetype.
    #[must_use]
    pub fn profile(&self, archetype: Archetype) -> Option<&ArchetypeProfile> {
        self.archetypes
            .iter()
            .find(|profile| profile.archetype == archetype)
    }

    /// Stage on which the archetype becomes eligible; unprofiled archetypes never unlock.
    #[must_use]
    pub fn unlock_stage(&self, archetype: Archetype) -> u8 {
        self.profile(archetype)
            .map_or(MAX_STAGE + 1, |profile| profile.unlock_stage)
    }

    /// Seconds an archetype is suppressed after spawning.
    #[must_use]
    pub fn cooldown(&self, archetype: Archetype) -> f32 {
        self.profile(archetype).map_or(0.0, |profile| profile.cooldown)
    }

    /// Concurrent population ceiling of an archetype in a stage band.
    #[must_use]
    pub fn population_cap(&self, archetype: Archetype, band: StageBand) -> Option<u32> {
        self.profile(archetype)
            .and_then(|profile| profile.population_cap)
            .map(|caps| caps[band.index()])
    }

    /// Base selection weight of an archetype in a stage band.
    #[must_use]
    pub fn base_weight(&self, archetype: Archetype, band: StageBand) -> f32 {
        self.profile(archetype)
            .map_or(0.0, |profile| profile.base_weight[band.index()])
    }

    /// Seconds an archetype lingers before leaving on its own.
    #[must_use]
    pub fn lifespan(&self, archetype: Archetype) -> f32 {
        self.profile(archetype).map_or(30.0, |profile| profile.lifespan)
    }

    /// Concurrency ceiling of a role in a stage band.
    #[must_use]
    pub fn role_cap(&self, role: Role, band: StageBand) -> Option<u32> {
        self.roles
            .iter()
            .find(|cap| cap.role == role)
            .and_then(|cap| cap.caps)
            .map(|caps| caps[band.index()])
    }

    /// Ordered fallbacks for a contested archetype in a stage band.
    #[must_use]
    pub fn substitutions(&self, archetype: Archetype, band: StageBand) -> &[Archetype] {
        self.substitutions
            .iter()
            .find(|table| table.archetype == archetype)
            .map_or(&[], |table| table.for_band(band))
    }

    /// Hit-point multiplier for enemies spawned on `stage`.
    #[must_use]
    pub fn hp_multiplier(&self, stage: Stage) -> f32 {
        1.0 + self.hp_growth * f32::from(stage.get() - 1)
    }

    /// Speed multiplier for enemies spawned on `stage`.
    #[must_use]
    pub fn speed_multiplier(&self, stage: Stage) -> f32 {
        1.0 + self.speed_growth * f32::from(stage.get() - 1)
    }
}

/// Per-stage tables indexed by stage number.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTable {
    /// Nominal units per phase; phase generators scale their counts from it.
    pub capacity: Vec<u32>,
    /// Total spawns allowed over the whole stage.
    pub budget: Vec<u32>,
    /// Maximum live enemies before the queue drain pauses.
    pub population_cap: Vec<u32>,
}

impl Default for StageTable {
    fn default() -> Self {
        Self {
            capacity: vec![8, 10, 12, 14, 16, 18, 20, 22, 24, 26],
            budget: vec![40, 55, 70, 85, 100, 115, 130, 145, 160, 180],
            population_cap: vec![12, 14, 16, 18, 20, 22, 24, 26, 28, 30],
        }
    }
}

impl StageTable {
    /// Capacity curve value for `stage`.
    #[must_use]
    pub fn capacity(&self, stage: Stage) -> u32 {
        lookup(&self.capacity, stage)
    }

    /// Spawn budget for `stage`.
    #[must_use]
    pub fn budget(&self, stage: Stage) -> u32 {
        lookup(&self.budget, stage)
    }

    /// Live-enemy ceiling for `stage`.
    #[must_use]
    pub fn population_cap(&self, stage: Stage) -> u32 {
        lookup(&self.population_cap, stage)
    }
}

fn lookup(table: &[u32], stage: Stage) -> u32 {
    table
        .get(stage.index())
        .or_else(|| table.last())
        .copied()
        .unwrap_or(0)
}

/// Static spawn constraints of one archetype.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchetypeProfile {
    /// Archetype described by this profile.
    pub archetype: Archetype,
    /// First stage on which the archetype may appear.
    pub unlock_stage: u8,
    /// Suppression window after a successful spawn, in seconds.
    pub cooldown: f32,
    /// Concurrent population ceiling per `[early, mid, late]` band; `None` is uncapped.
    pub population_cap: Option<[u32; 3]>,
    /// Base selection weight per `[early, mid, late]` band.
    pub base_weight: [f32; 3],
    /// Seconds before the enemy leaves the field on its own.
    pub lifespan: f32,
}

fn profile(
    archetype: Archetype,
    unlock_stage: u8,
    cooldown: f32,
    population_cap: Option<[u32; 3]>,
    base_weight: [f32; 3],
    lifespan: f32,
) -> ArchetypeProfile {
    ArchetypeProfile {
        archetype,
        unlock_stage,
        cooldown,
        population_cap,
        base_weight,
        lifespan,
    }
}

fn default_profiles() -> Vec<ArchetypeProfile> {
    use Archetype::*;
    vec![
        profile(Grunt, 1, 0.0, None, [10.0, 8.0, 6.0], 40.0),
        profile(Swarmer, 1, 0.0, None, [6.0, 6.0, 5.0], 30.0),
        profile(Dasher, 2, 1.5, Some([4, 5, 6]), [4.0, 5.0, 5.0], 20.0),
        profile(Splitter, 3, 2.0, Some([3, 4, 5]), [3.0, 4.0, 4.0], 35.0),
        profile(Sniper, 3, 4.0, Some([2, 2, 3]), [2.0, 3.0, 3.5], 45.0),
        profile(Bomber, 4, 3.0, Some([2, 3, 4]), [2.0, 3.0, 3.5], 25.0),
        profile(Shielder, 4, 5.0, Some([2, 2, 3]), [1.5, 2.5, 3.0], 45.0),
        profile(Weaver, 5, 5.0, Some([1, 2, 3]), [1.0, 2.0, 3.0], 40.0),
        profile(Orbiter, 6, 6.0, Some([1, 2, 2]), [1.0, 1.5, 2.5], 40.0),
        profile(Juggernaut, 5, 12.0, Some([1, 1, 2]), [0.5, 1.0, 1.5], 60.0),
        profile(Summoner, 7, 15.0, Some([1, 1, 1]), [0.3, 0.6, 1.0], 60.0),
        profile(Warlord, 8, 20.0, Some([1, 1, 1]), [0.2, 0.4, 0.8], 70.0),
    ]
}

/// Concurrency ceiling shared by every archetype of one role.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleCap {
    /// Role constrained by this entry.
    pub role: Role,
    /// Ceiling per `[early, mid, late]` band; `None` is uncapped.
    pub caps: Option<[u32; 3]>,
}

impl RoleCap {
    /// Creates a role cap entry.
    #[must_use]
    pub fn new(role: Role, caps: Option<[u32; 3]>) -> Self {
        Self { role, caps }
    }
}

/// Spawn-zone geometry and spacing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementTuning {
    /// Play area; spawns land outside it.
    pub bounds: PlayBounds,
    /// Distance outside the bounds where single spawns land.
    pub margin: f32,
    /// Extra outward jitter applied to corner zones.
    pub diagonal_jitter: f32,
    /// Minimum distance between a new spawn and recent spawn points.
    pub min_separation: f32,
    /// Seconds a spawn point stays in the spacing history.
    pub spacing_window: f32,
    /// Placement attempts before a task is deferred.
    pub retries: u32,
    /// Distance between neighbouring formation members.
    pub formation_spacing: f32,
    /// Speed of the entry glide attached to formation members.
    pub glide_speed: f32,
    /// Radius around the player that spawns should stay out of.
    pub player_clearance: f32,
    /// Sliding window of sides used for the frequency discount.
    pub side_window: usize,
    /// Weight removed per unit of side frequency in the window.
    pub side_frequency_penalty: f32,
    /// Multiplier applied to the side opposite the previous one.
    pub opposite_boost: f32,
}

impl Default for PlacementTuning {
    fn default() -> Self {
        Self {
            bounds: PlayBounds::new(Vec2::new(-400.0, -300.0), Vec2::new(400.0, 300.0)),
            margin: 40.0,
            diagonal_jitter: 60.0,
            min_separation: 48.0,
            spacing_window: 3.0,
            retries: 4,
            formation_spacing: 52.0,
            glide_speed: 90.0,
            player_clearance: 160.0,
            side_window: 6,
            side_frequency_penalty: 0.75,
            opposite_boost: 2.0,
        }
    }
}

/// Weighted entry of a formation pool.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternWeight {
    /// Pattern offered by the pool.
    pub pattern: PlacementPattern,
    /// Relative draw weight.
    pub weight: f32,
}

impl PatternWeight {
    /// Creates a weighted pattern entry.
    #[must_use]
    pub const fn new(pattern: PlacementPattern, weight: f32) -> Self {
        Self { pattern, weight }
    }
}

/// Stage-gated formation pools.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationTables {
    /// Patterns offered on early stages.
    pub early: Vec<PatternWeight>,
    /// Patterns offered on mid stages.
    pub mid: Vec<PatternWeight>,
    /// Patterns offered on late stages.
    pub late: Vec<PatternWeight>,
}

impl FormationTables {
    /// Pool for a stage band.
    #[must_use]
    pub fn for_band(&self, band: StageBand) -> &[PatternWeight] {
        match band {
            StageBand::Early => &self.early,
            StageBand::Mid => &self.mid,
            StageBand::Late => &self.late,
        }
    }
}

impl Default for FormationTables {
    fn default() -> Self {
        use PlacementPattern::*;
        Self {
            early: vec![
                PatternWeight::new(Line, 3.0),
                PatternWeight::new(VShape, 2.0),
                PatternWeight::new(Arc, 1.0),
            ],
            mid: vec![
                PatternWeight::new(Line, 2.0),
                PatternWeight::new(VShape, 2.0),
                PatternWeight::new(Fan, 1.5),
                PatternWeight::new(Arc, 1.5),
                PatternWeight::new(Circle, 1.0),
                PatternWeight::new(Grid, 1.0),
                PatternWeight::new(Cross, 0.8),
            ],
            late: vec![
                PatternWeight::new(VShape, 1.5),
                PatternWeight::new(Fan, 1.5),
                PatternWeight::new(Circle, 1.2),
                PatternWeight::new(Grid, 1.0),
                PatternWeight::new(RandomCluster, 1.0),
                PatternWeight::new(Cross, 1.0),
                PatternWeight::new(DoubleRing, 1.0),
                PatternWeight::new(DoubleLine, 1.0),
                PatternWeight::new(StaggeredWave, 1.2),
            ],
        }
    }
}

/// Weighted selector modifiers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorTuning {
    /// Capacity of the short anti-streak history.
    pub short_window: usize,
    /// Capacity of the long ratio/quota history.
    pub long_window: usize,
    /// Seconds after stage start during which the roster guarantee applies.
    pub roster_window: f32,
    /// Baseline share target per band while the burst timer is off.
    pub ratio_calm: [f32; 3],
    /// Baseline share target per band while the burst timer is on.
    pub ratio_burst: [f32; 3],
    /// Seconds the burst timer stays on.
    pub burst_on: f32,
    /// Seconds the burst timer stays off.
    pub burst_off: f32,
    /// Baseline weight multiplier applied when its share exceeds the target.
    pub ratio_suppression: f32,
    /// Long-history entries required before ratio targeting applies.
    pub ratio_min_history: usize,
    /// Multiplier for archetypes absent from the recent long history.
    pub quota_boost: f32,
    /// Newest long-history entries inspected for absence.
    pub quota_window: usize,
    /// Long-history entries required before quota boosting applies.
    pub quota_min_history: usize,
    /// Multiplier for the archetype favoured by the encounter plan.
    pub plan_affinity: f32,
    /// Seconds between plan rotations.
    pub plan_period: f32,
    /// Per-repeat geometric discount over the short history.
    pub streak_decay: f32,
    /// Seconds elites are suppressed after an elite pick.
    pub elite_cooldown: f32,
    /// Maximum elite picks per phase per band.
    pub elite_phase_cap: [u32; 3],
    /// Probability a baseline draw is swapped for its adjacent archetype.
    pub baseline_swap_chance: f32,
    /// Ordered secondary archetypes scanned when the weighted draw fails.
    pub filler: Vec<Archetype>,
}

impl Default for SelectorTuning {
    fn default() -> Self {
        Self {
            short_window: 6,
            long_window: 40,
            roster_window: 60.0,
            ratio_calm: [0.45, 0.40, 0.35],
            ratio_burst: [0.60, 0.55, 0.50],
            burst_on: 20.0,
            burst_off: 40.0,
            ratio_suppression: 0.25,
            ratio_min_history: 10,
            quota_boost: 1.8,
            quota_window: 20,
            quota_min_history: 8,
            plan_affinity: 1.5,
            plan_period: 45.0,
            streak_decay: 0.35,
            elite_cooldown: 8.0,
            elite_phase_cap: [1, 1, 2],
            baseline_swap_chance: 0.2,
            filler: vec![
                Archetype::Swarmer,
                Archetype::Dasher,
                Archetype::Splitter,
                Archetype::Bomber,
            ],
        }
    }
}

/// Recovery recipe.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryTuning {
    /// Fraction of stage capacity issued.
    pub capacity_fraction: f32,
    /// Minimum units issued.
    pub minimum: u32,
    /// Seconds between releases.
    pub delay: f32,
    /// Seconds of cooldown after the phase.
    pub cooldown: f32,
    /// First stage on which a commander may lead the group.
    pub commander_min_stage: u8,
    /// Probability of wrapping the group around a commander.
    pub commander_chance: f32,
}

impl Default for RecoveryTuning {
    fn default() -> Self {
        Self {
            capacity_fraction: 0.2,
            minimum: 3,
            delay: 0.6,
            cooldown: 1.5,
            commander_min_stage: 6,
            commander_chance: 0.35,
        }
    }
}

/// Formation recipe.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationTuning {
    /// Fraction of stage capacity issued.
    pub capacity_fraction: f32,
    /// Minimum group size.
    pub minimum: u32,
    /// Maximum group size.
    pub maximum: u32,
    /// Seconds between member releases.
    pub member_delay: f32,
    /// Seconds of cooldown after the phase.
    pub cooldown: f32,
    /// Phases that must pass between two formation phases.
    pub min_phase_gap: u32,
    /// Weight multiplier for patterns present in the formation history.
    pub repeat_penalty: f32,
    /// Capacity of the formation-pattern history.
    pub history: usize,
}

impl Default for FormationTuning {
    fn default() -> Self {
        Self {
            capacity_fraction: 0.5,
            minimum: 4,
            maximum: 12,
            member_delay: 0.08,
            cooldown: 3.0,
            min_phase_gap: 3,
            repeat_penalty: 0.3,
            history: 4,
        }
    }
}

/// Mixed recipe.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MixedTuning {
    /// Fraction of stage capacity issued per sub-wave.
    pub capacity_fraction: f32,
    /// Minimum units per sub-wave.
    pub minimum: u32,
    /// Fewest sub-waves issued.
    pub min_subwaves: u32,
    /// Most sub-waves issued.
    pub max_subwaves: u32,
    /// Seconds between releases within a sub-wave.
    pub intra_delay: f32,
    /// Seconds between sub-waves.
    pub subwave_gap: f32,
    /// Probability that a repeated strong pick is demoted to the baseline.
    pub demote_chance: f32,
    /// Seconds of cooldown after the phase.
    pub cooldown: f32,
}

impl Default for MixedTuning {
    fn default() -> Self {
        Self {
            capacity_fraction: 0.25,
            minimum: 2,
            min_subwaves: 2,
            max_subwaves: 3,
            intra_delay: 0.35,
            subwave_gap: 2.5,
            demote_chance: 0.6,
            cooldown: 3.5,
        }
    }
}

/// Pressure recipe.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureTuning {
    /// Fraction of stage capacity issued.
    pub capacity_fraction: f32,
    /// Seconds between releases.
    pub interval: f32,
    /// Speed of the straight-line velocity override given to stream units.
    pub stream_speed: f32,
    /// Seconds of cooldown after the phase.
    pub cooldown: f32,
}

impl Default for PressureTuning {
    fn default() -> Self {
        Self {
            capacity_fraction: 0.6,
            interval: 0.25,
            stream_speed: 140.0,
            cooldown: 4.0,
        }
    }
}

/// Standard recipe.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardTuning {
    /// Fraction of stage capacity issued.
    pub capacity_fraction: f32,
    /// Shortest gap between releases.
    pub delay_min: f32,
    /// Longest gap between releases.
    pub delay_max: f32,
    /// Seconds of cooldown after the phase.
    pub cooldown: f32,
}

impl Default for StandardTuning {
    fn default() -> Self {
        Self {
            capacity_fraction: 0.45,
            delay_min: 0.05,
            delay_max: 0.1,
            cooldown: 2.5,
        }
    }
}

/// Relative weights of the phase kinds per `[early, mid, late]` band.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseWeights {
    /// Weight of a breather recovery phase.
    pub recovery: [f32; 3],
    /// Weight of a formation phase.
    pub formation: [f32; 3],
    /// Weight of a mixed phase.
    pub mixed: [f32; 3],
    /// Weight of a pressure phase.
    pub pressure: [f32; 3],
    /// Weight of a standard phase.
    pub standard: [f32; 3],
}

impl Default for PhaseWeights {
    fn default() -> Self {
        Self {
            recovery: [0.4, 0.3, 0.2],
            formation: [1.0, 1.5, 1.5],
            mixed: [0.5, 1.2, 1.6],
            pressure: [0.3, 0.8, 1.2],
            standard: [2.0, 1.2, 1.0],
        }
    }
}

/// Phase generator recipes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTuning {
    /// Phase-kind mix.
    pub weights: PhaseWeights,
    /// Recovery recipe.
    pub recovery: RecoveryTuning,
    /// Formation recipe.
    pub formation: FormationTuning,
    /// Mixed recipe.
    pub mixed: MixedTuning,
    /// Pressure recipe.
    pub pressure: PressureTuning,
    /// Standard recipe.
    pub standard: StandardTuning,
}

/// Wave-thinning thresholds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitingTuning {
    /// Live enemies tolerated when advancing early.
    pub residual: u32,
    /// Strong enemies tolerated among the residual.
    pub max_strong: u32,
    /// Upper bound on seconds spent spawning or waiting in one phase.
    pub max_duration: f32,
}

impl Default for WaitingTuning {
    fn default() -> Self {
        Self {
            residual: 3,
            max_strong: 1,
            max_duration: 40.0,
        }
    }
}

/// Density controller throttling.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityTuning {
    /// Backlog size past which the oldest entries are force-flushed.
    pub backlog_threshold: usize,
    /// Tasks released per tick when no flush is needed.
    pub release_per_tick: usize,
    /// Seconds a deferred task waits before it is retried.
    pub retry_delay: f32,
}

impl Default for DensityTuning {
    fn default() -> Self {
        Self {
            backlog_threshold: 20,
            release_per_tick: 2,
            retry_delay: 0.75,
        }
    }
}

/// Minimum lifetime count owed to one archetype on the fixed-sequence stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaEntry {
    /// Archetype owed the quota.
    pub archetype: Archetype,
    /// Minimum spawns by stage end.
    pub minimum: u32,
}

/// Weighted archetype entry of a wave shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeWeight {
    /// Archetype offered.
    pub archetype: Archetype,
    /// Relative draw weight.
    pub weight: f32,
}

/// Named wave shape with its own archetype weights.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaveShape {
    /// Display name.
    pub name: String,
    /// Archetype weight table.
    pub weights: Vec<ArchetypeWeight>,
}

fn shape(name: &str, weights: &[(Archetype, f32)]) -> WaveShape {
    WaveShape {
        name: name.to_owned(),
        weights: weights
            .iter()
            .map(|(archetype, weight)| ArchetypeWeight {
                archetype: *archetype,
                weight: *weight,
            })
            .collect(),
    }
}

/// Fixed-sequence stage variant.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedSequenceTuning {
    /// Stage that runs the fixed-sequence generator.
    pub stage: u8,
    /// Fraction of stage capacity issued per wave.
    pub capacity_fraction: f32,
    /// Seconds between releases.
    pub delay: f32,
    /// Seconds of cooldown after the phase.
    pub cooldown: f32,
    /// Wave shapes drawn from a shuffled bag.
    pub shapes: Vec<WaveShape>,
    /// Minimum lifetime counts guaranteed by stage end.
    pub quotas: Vec<QuotaEntry>,
    /// Every n-th pick bypasses weighting to force diversity.
    pub diversity_cadence: u32,
    /// Recent picks a forced-diversity pick must avoid.
    pub diversity_window: usize,
    /// Seconds between spice injections.
    pub spice_interval: f32,
    /// Spice injections allowed per stage.
    pub spice_cap: u32,
    /// Elevated-threat archetypes the spice injector may queue.
    pub spice_pool: Vec<Archetype>,
}

impl Default for FixedSequenceTuning {
    fn default() -> Self {
        use Archetype::*;
        Self {
            stage: 9,
            capacity_fraction: 0.45,
            delay: 0.3,
            cooldown: 3.0,
            shapes: vec![
                shape(
                    "vanguard",
                    &[(Grunt, 5.0), (Swarmer, 3.0), (Shielder, 1.5), (Dasher, 1.0)],
                ),
                shape(
                    "skirmish",
                    &[(Dasher, 4.0), (Sniper, 2.0), (Swarmer, 2.0), (Grunt, 2.0)],
                ),
                shape(
                    "siege",
                    &[(Bomber, 3.0), (Splitter, 3.0), (Weaver, 1.5), (Grunt, 2.0)],
                ),
                shape(
                    "onslaught",
                    &[(Grunt, 4.0), (Swarmer, 4.0), (Splitter, 2.0), (Juggernaut, 0.5)],
                ),
                shape(
                    "crossfire",
                    &[(Sniper, 2.0), (Orbiter, 2.0), (Weaver, 1.5), (Grunt, 3.0)],
                ),
            ],
            quotas: vec![
                QuotaEntry {
                    archetype: Sniper,
                    minimum: 6,
                },
                QuotaEntry {
                    archetype: Shielder,
                    minimum: 5,
                },
                QuotaEntry {
                    archetype: Weaver,
                    minimum: 5,
                },
                QuotaEntry {
                    archetype: Orbiter,
                    minimum: 4,
                },
            ],
            diversity_cadence: 7,
            diversity_window: 3,
            spice_interval: 30.0,
            spice_cap: 3,
            spice_pool: vec![Juggernaut, Summoner],
        }
    }
}

/// Tiered fallbacks for one contested archetype.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubstitutionTable {
    /// Contested archetype.
    pub archetype: Archetype,
    /// Fallbacks on early stages, in ladder order.
    pub early: Vec<Archetype>,
    /// Fallbacks on mid stages, in ladder order.
    pub mid: Vec<Archetype>,
    /// Fallbacks on late stages, in ladder order.
    pub late: Vec<Archetype>,
}

impl SubstitutionTable {
    /// Fallbacks for a stage band.
    #[must_use]
    pub fn for_band(&self, band: StageBand) -> &[Archetype] {
        match band {
            StageBand::Early => &self.early,
            StageBand::Mid => &self.mid,
            StageBand::Late => &self.late,
        }
    }
}
