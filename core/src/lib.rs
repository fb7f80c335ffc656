#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the spawn director.
//!
//! This crate defines the vocabulary that connects the host game, the
//! authoritative director and the pure systems it is composed of. The host
//! hands the director a [`WorldView`] once per simulation step together with an
//! [`EnemyPool`] and a [`StatsSink`]. Systems exchange [`SpawnTask`] values
//! (queued intent) and [`SpawnDecision`] values (concrete proposals under
//! validation), and the director reports every materialised enemy as a
//! [`SpawnRecord`].

mod arena;
mod config;
mod draw;
mod history;
mod seed;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use arena::ArenaPool;
pub use config::{
    ArchetypeProfile, ArchetypeWeight, ConfigError, DensityTuning, DirectorConfig,
    FixedSequenceTuning, FormationTables, FormationTuning, MixedTuning, PatternWeight,
    PhaseTuning, PhaseWeights, PlacementTuning, PressureTuning, QuotaEntry, RecoveryTuning,
    RoleCap, SelectorTuning, StageTable, StandardTuning, SubstitutionTable, WaitingTuning,
    WaveShape,
};
pub use draw::{last_positive, weighted_index};
pub use history::History;
pub use seed::{derive_labeled_seed, derive_stage_seed};

/// Highest stage index supported by the encounter.
pub const MAX_STAGE: u8 = 10;

/// Upper bound on relaxation attempts applied to a single decision.
pub const MAX_RELAXATION_DEPTH: u8 = 5;

/// One-based stage number clamped to `1..=MAX_STAGE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Stage(u8);

impl Stage {
    /// Creates a stage, clamping the value into the supported range.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value == 0 {
            Self(1)
        } else if value > MAX_STAGE {
            Self(MAX_STAGE)
        } else {
            Self(value)
        }
    }

    /// Retrieves the one-based stage number.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Zero-based index into per-stage tables.
    #[must_use]
    pub const fn index(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// Coarse band used by tiered tables.
    #[must_use]
    pub const fn band(&self) -> StageBand {
        match self.0 {
            1..=3 => StageBand::Early,
            4..=6 => StageBand::Mid,
            _ => StageBand::Late,
        }
    }

    /// Iterates every stage in ascending order.
    pub fn all() -> impl Iterator<Item = Stage> {
        (1..=MAX_STAGE).map(Stage::new)
    }
}

/// Coarse grouping of stages used by tiered caps, weights and fallbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageBand {
    /// Stages one through three.
    Early,
    /// Stages four through six.
    Mid,
    /// Stages seven and beyond.
    Late,
}

impl StageBand {
    /// Zero-based index into `[early, mid, late]` tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Early => 0,
            Self::Mid => 1,
            Self::Late => 2,
        }
    }
}

/// Coarse behavioural role shared by several archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Bread-and-butter melee bodies.
    Core,
    /// Fast or ranged units that pick at the player.
    Harasser,
    /// Units that shape space around the player.
    Controller,
    /// Heavy threats that dominate an encounter.
    Elite,
}

impl Role {
    /// Every role in canonical order.
    pub const ALL: [Role; 4] = [Role::Core, Role::Harasser, Role::Controller, Role::Elite];

    /// Zero-based index used by per-role tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Closed set of enemy archetypes the director may spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Baseline melee unit; legal under every rule.
    Grunt,
    /// Small fast melee unit that arrives in numbers.
    Swarmer,
    /// Charger that lunges at the player.
    Dasher,
    /// Splits into fragments when destroyed.
    Splitter,
    /// Long-range shooter.
    Sniper,
    /// Suicide unit with area damage.
    Bomber,
    /// Projects a shield over nearby enemies.
    Shielder,
    /// Lays slowing fields.
    Weaver,
    /// Circles the player at range.
    Orbiter,
    /// Heavily armoured elite.
    Juggernaut,
    /// Elite that raises minions.
    Summoner,
    /// Elite that only ever appears as a commander.
    Warlord,
}

impl Archetype {
    /// Number of archetypes.
    pub const COUNT: usize = 12;

    /// Every archetype in canonical order.
    pub const ALL: [Archetype; Archetype::COUNT] = [
        Archetype::Grunt,
        Archetype::Swarmer,
        Archetype::Dasher,
        Archetype::Splitter,
        Archetype::Sniper,
        Archetype::Bomber,
        Archetype::Shielder,
        Archetype::Weaver,
        Archetype::Orbiter,
        Archetype::Juggernaut,
        Archetype::Summoner,
        Archetype::Warlord,
    ];

    /// The guaranteed-always-legal fallback archetype.
    pub const BASELINE: Archetype = Archetype::Grunt;

    /// Zero-based index used by per-archetype tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Role group the archetype belongs to.
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::Grunt | Self::Swarmer | Self::Splitter => Role::Core,
            Self::Dasher | Self::Sniper | Self::Bomber => Role::Harasser,
            Self::Shielder | Self::Weaver | Self::Orbiter => Role::Controller,
            Self::Juggernaut | Self::Summoner | Self::Warlord => Role::Elite,
        }
    }

    /// Reports whether the archetype counts as a strong (elite-tier) threat.
    #[must_use]
    pub const fn is_strong(self) -> bool {
        matches!(self.role(), Role::Elite)
    }

    /// Reports whether the archetype may only lead an escort group.
    #[must_use]
    pub const fn is_commander_only(self) -> bool {
        matches!(self, Self::Warlord)
    }

    /// Reports whether population pressure gates this archetype hard enough
    /// that force-flushed tasks must drop it.
    #[must_use]
    pub const fn is_capacity_gated(self) -> bool {
        self.is_strong()
    }

    /// Reports whether the archetype tolerates metronomic stream placement.
    #[must_use]
    pub const fn is_rapid_fire_suitable(self) -> bool {
        !matches!(
            self,
            Self::Sniper | Self::Orbiter | Self::Juggernaut | Self::Summoner | Self::Warlord
        )
    }

    /// Thematically adjacent archetype used to add variety to baseline draws.
    #[must_use]
    pub const fn adjacent(self) -> Option<Archetype> {
        match self {
            Self::Grunt => Some(Self::Swarmer),
            Self::Swarmer => Some(Self::Grunt),
            Self::Dasher => Some(Self::Bomber),
            Self::Sniper => Some(Self::Orbiter),
            _ => None,
        }
    }

    /// Stable lowercase name used in dumps and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grunt => "grunt",
            Self::Swarmer => "swarmer",
            Self::Dasher => "dasher",
            Self::Splitter => "splitter",
            Self::Sniper => "sniper",
            Self::Bomber => "bomber",
            Self::Shielder => "shielder",
            Self::Weaver => "weaver",
            Self::Orbiter => "orbiter",
            Self::Juggernaut => "juggernaut",
            Self::Summoner => "summoner",
            Self::Warlord => "warlord",
        }
    }
}

/// One of the eight spawn zones surrounding the play area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnSide {
    /// Above the play area.
    Top,
    /// Above and to the right.
    TopRight,
    /// Right of the play area.
    Right,
    /// Below and to the right.
    BottomRight,
    /// Below the play area.
    Bottom,
    /// Below and to the left.
    BottomLeft,
    /// Left of the play area.
    Left,
    /// Above and to the left.
    TopLeft,
}

impl SpawnSide {
    /// Every side in clockwise order starting at the top.
    pub const ALL: [SpawnSide; 8] = [
        SpawnSide::Top,
        SpawnSide::TopRight,
        SpawnSide::Right,
        SpawnSide::BottomRight,
        SpawnSide::Bottom,
        SpawnSide::BottomLeft,
        SpawnSide::Left,
        SpawnSide::TopLeft,
    ];

    /// Zero-based clockwise index.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Diametrically opposite zone.
    #[must_use]
    pub const fn opposite(self) -> SpawnSide {
        Self::ALL[(self.index() + 4) % 8]
    }

    /// Reports whether the zone sits on a corner.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        self.index() % 2 == 1
    }

    /// Unit vector pointing away from the play-area centre through this zone.
    ///
    /// World space is y-up, so [`SpawnSide::Top`] points along `+y`.
    #[must_use]
    pub fn outward(self) -> Vec2 {
        let raw = match self {
            Self::Top => Vec2::new(0.0, 1.0),
            Self::TopRight => Vec2::new(1.0, 1.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::BottomRight => Vec2::new(1.0, -1.0),
            Self::Bottom => Vec2::new(0.0, -1.0),
            Self::BottomLeft => Vec2::new(-1.0, -1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::TopLeft => Vec2::new(-1.0, 1.0),
        };
        raw.normalize()
    }
}

/// Named geometric arrangement used to place a spawn or a group of spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPattern {
    /// A lone unit.
    Single,
    /// Units abreast, perpendicular to the approach.
    Line,
    /// Chevron pointing at the play area.
    VShape,
    /// Units spread across a widening angle.
    Fan,
    /// Ring around the anchor.
    Circle,
    /// Shallow arc bulging toward the play area.
    Arc,
    /// Rows and columns.
    Grid,
    /// Jittered clump.
    RandomCluster,
    /// Plus-shaped arms.
    Cross,
    /// Two concentric rings.
    DoubleRing,
    /// Two parallel lines.
    DoubleLine,
    /// Line with alternate members pushed back.
    StaggeredWave,
}

impl PlacementPattern {
    /// Every group pattern, excluding [`PlacementPattern::Single`].
    pub const GROUPS: [PlacementPattern; 11] = [
        PlacementPattern::Line,
        PlacementPattern::VShape,
        PlacementPattern::Fan,
        PlacementPattern::Circle,
        PlacementPattern::Arc,
        PlacementPattern::Grid,
        PlacementPattern::RandomCluster,
        PlacementPattern::Cross,
        PlacementPattern::DoubleRing,
        PlacementPattern::DoubleLine,
        PlacementPattern::StaggeredWave,
    ];

    /// Reports whether the pattern places more than one unit.
    #[must_use]
    pub const fn is_group(self) -> bool {
        !matches!(self, Self::Single)
    }
}

/// Generation recipe active during a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Small, low-threat breather.
    Recovery,
    /// One geometric group.
    Formation,
    /// Several sequential sub-waves.
    Mixed,
    /// Metronomic stream of one archetype.
    Pressure,
    /// Single bulk injection.
    Standard,
    /// Shuffled wave-shape bag with quotas, used on one late stage.
    FixedSequence,
}

/// Arena handle of an enemy owned by the host pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyHandle(u32);

impl EnemyHandle {
    /// Wraps an arena slot index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the arena slot index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier tying the members of one formation or escort group together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(u32);

impl GroupId {
    /// Creates a group identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commander/escort structuring attached to a spawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscortLink {
    /// Independent unit.
    #[default]
    None,
    /// Leader of the group.
    Commander(GroupId),
    /// Ordinary unit following the group's commander.
    Escort(GroupId),
}

impl EscortLink {
    /// Group the unit belongs to, if any.
    #[must_use]
    pub const fn group(&self) -> Option<GroupId> {
        match self {
            Self::None => None,
            Self::Commander(group) | Self::Escort(group) => Some(*group),
        }
    }
}

/// Entry animation descriptor handed to the host.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryMotion {
    /// Velocity toward the play-area centre used while gliding in.
    pub glide: Vec2,
}

/// Formation membership metadata.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormationSlot {
    /// Pattern the group was laid out with.
    pub pattern: PlacementPattern,
    /// Group shared by every member.
    pub group: GroupId,
    /// Zero-based member index within the group.
    pub index: u32,
}

/// Explicit per-task options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnOptions {
    /// Entry glide, attached to every formation member.
    pub entry: Option<EntryMotion>,
    /// Formation membership; stripped by the first relaxation step.
    pub formation: Option<FormationSlot>,
    /// Commander/escort structure.
    pub escort: EscortLink,
    /// Initial velocity replacing the archetype's default approach.
    pub velocity: Option<Vec2>,
}

/// Queued intent to spawn one enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnTask {
    /// Archetype to spawn.
    pub archetype: Archetype,
    /// Placement pattern tag.
    pub pattern: PlacementPattern,
    /// Explicit position; resolved at execution time when absent.
    pub position: Option<Vec2>,
    /// Spawn side the explicit position was generated for.
    pub side: Option<SpawnSide>,
    /// Seconds to wait after the previous task before releasing this one.
    pub delay: f32,
    /// Explicit options.
    pub options: SpawnOptions,
}

impl SpawnTask {
    /// Creates a single-unit task released after `delay` seconds.
    #[must_use]
    pub fn single(archetype: Archetype, delay: f32) -> Self {
        Self {
            archetype,
            pattern: PlacementPattern::Single,
            position: None,
            side: None,
            delay,
            options: SpawnOptions::default(),
        }
    }
}

/// Concrete, mutable proposal flowing through validation and relaxation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnDecision {
    /// Archetype currently proposed.
    pub archetype: Archetype,
    /// Archetype originally requested, preserved across relaxation.
    pub original: Archetype,
    /// Resolved position, or `None` while still pending.
    pub position: Option<Vec2>,
    /// Placement pattern currently proposed.
    pub pattern: PlacementPattern,
    /// Spawn side the position belongs to.
    pub side: Option<SpawnSide>,
    /// Explicit options.
    pub options: SpawnOptions,
    /// Number of relaxation steps applied so far.
    pub relaxation: u8,
    /// Whether spacing and position rules still apply.
    pub spacing_enforced: bool,
}

impl SpawnDecision {
    /// Lifts a queued task into a decision with no relaxation applied.
    #[must_use]
    pub fn from_task(task: &SpawnTask) -> Self {
        Self {
            archetype: task.archetype,
            original: task.archetype,
            position: task.position,
            pattern: task.pattern,
            side: task.side,
            options: task.options,
            relaxation: 0,
            spacing_enforced: true,
        }
    }
}

/// Record of one materialised spawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    /// Simulation step the spawn happened on.
    pub tick: u64,
    /// Archetype that was spawned.
    pub archetype: Archetype,
    /// World position of the spawn.
    pub position: Vec2,
    /// Placement pattern the spawn was issued under.
    pub pattern: PlacementPattern,
    /// Spawn side, when one was chosen.
    pub side: Option<SpawnSide>,
    /// Relaxation depth the decision reached.
    pub relaxation: u8,
}

/// Initial fields written into an acquired enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyInit {
    /// Archetype to instantiate.
    pub archetype: Archetype,
    /// World position.
    pub position: Vec2,
    /// Multiplier applied to base hit points.
    pub hp_multiplier: f32,
    /// Multiplier applied to base movement speed.
    pub speed_multiplier: f32,
    /// Commander/escort structure.
    pub escort: EscortLink,
    /// Partner handle of the commander an escort follows.
    pub leader: Option<EnemyHandle>,
    /// Initial velocity override.
    pub velocity: Option<Vec2>,
    /// Entry glide.
    pub entry: Option<EntryMotion>,
    /// Seconds before the enemy leaves the field on its own.
    pub lifespan: f32,
}

/// Object pool owned by the host game.
pub trait EnemyPool {
    /// Acquires a free slot, or `None` when the pool is exhausted.
    fn acquire(&mut self) -> Option<EnemyHandle>;

    /// Returns a slot to the pool.
    fn release(&mut self, handle: EnemyHandle);

    /// Writes the initial fields of a freshly acquired enemy.
    fn initialize(&mut self, handle: EnemyHandle, init: &EnemyInit);
}

/// Optional receiver of per-spawn telemetry.
pub trait StatsSink {
    /// Observes a materialised spawn.
    fn record(&mut self, record: &SpawnRecord);
}

impl StatsSink for () {
    fn record(&mut self, _record: &SpawnRecord) {}
}

impl StatsSink for Vec<SpawnRecord> {
    fn record(&mut self, record: &SpawnRecord) {
        self.push(*record);
    }
}

/// Dense per-archetype counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchetypeCounts {
    counts: [u32; Archetype::COUNT],
}

impl ArchetypeCounts {
    /// Creates an all-zero counter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: [0; Archetype::COUNT],
        }
    }

    /// Count recorded for one archetype.
    #[must_use]
    pub const fn get(&self, archetype: Archetype) -> u32 {
        self.counts[archetype.index()]
    }

    /// Increments the count for one archetype.
    pub fn increment(&mut self, archetype: Archetype) {
        let slot = &mut self.counts[archetype.index()];
        *slot = slot.saturating_add(1);
    }

    /// Decrements the count for one archetype, saturating at zero.
    pub fn decrement(&mut self, archetype: Archetype) {
        let slot = &mut self.counts[archetype.index()];
        *slot = slot.saturating_sub(1);
    }

    /// Sum across every archetype.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Sum across every archetype sharing `role`.
    #[must_use]
    pub fn role(&self, role: Role) -> u32 {
        Archetype::ALL
            .iter()
            .filter(|archetype| archetype.role() == role)
            .map(|archetype| self.get(*archetype))
            .sum()
    }

    /// Resets every counter to zero.
    pub fn clear(&mut self) {
        self.counts = [0; Archetype::COUNT];
    }

    /// Iterates `(archetype, count)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Archetype, u32)> + '_ {
        Archetype::ALL
            .iter()
            .map(move |archetype| (*archetype, self.get(*archetype)))
    }
}

/// Live-enemy counts precomputed by the host once per tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulationSnapshot {
    alive: ArchetypeCounts,
}

impl PopulationSnapshot {
    /// Builds a snapshot from the archetypes of every live enemy.
    #[must_use]
    pub fn from_alive(alive: impl IntoIterator<Item = Archetype>) -> Self {
        let mut counts = ArchetypeCounts::new();
        for archetype in alive {
            counts.increment(archetype);
        }
        Self { alive: counts }
    }

    /// Live instances of one archetype.
    #[must_use]
    pub const fn alive(&self, archetype: Archetype) -> u32 {
        self.alive.get(archetype)
    }

    /// Live instances sharing `role`.
    #[must_use]
    pub fn role(&self, role: Role) -> u32 {
        self.alive.role(role)
    }

    /// Live enemies of every archetype.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.alive.total()
    }

    /// Live strong (elite-tier) enemies.
    #[must_use]
    pub fn strong(&self) -> u32 {
        self.alive.role(Role::Elite)
    }

    /// Underlying per-archetype counts.
    #[must_use]
    pub const fn counts(&self) -> &ArchetypeCounts {
        &self.alive
    }
}

/// Read-only world state handed to the director every tick.
#[derive(Clone, Copy, Debug)]
pub struct WorldView<'a> {
    /// Monotonic game time in seconds; pausable by the host.
    pub elapsed: f32,
    /// Current player position.
    pub player_position: Vec2,
    /// Active stage.
    pub stage: Stage,
    /// Live-enemy counts refreshed this tick.
    pub population: &'a PopulationSnapshot,
}

/// Axis-aligned play area in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayBounds {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl PlayBounds {
    /// Creates bounds from two corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Centre of the play area.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Reports whether `point` lies strictly inside the bounds grown by `margin`.
    #[must_use]
    pub fn contains_with_margin(&self, point: Vec2, margin: f32) -> bool {
        point.x > self.min.x - margin
            && point.x < self.max.x + margin
            && point.y > self.min.y - margin
            && point.y < self.max.y + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_clamps_and_bands() {
        assert_eq!(Stage::new(0).get(), 1);
        assert_eq!(Stage::new(42).get(), MAX_STAGE);
        assert_eq!(Stage::new(3).band(), StageBand::Early);
        assert_eq!(Stage::new(4).band(), StageBand::Mid);
        assert_eq!(Stage::new(7).band(), StageBand::Late);
        assert_eq!(Stage::all().count(), usize::from(MAX_STAGE));
    }

    #[test]
    fn archetype_indices_follow_canonical_order() {
        for (index, archetype) in Archetype::ALL.iter().enumerate() {
            assert_eq!(archetype.index(), index);
        }
    }

    #[test]
    fn baseline_is_core_and_not_strong() {
        assert_eq!(Archetype::BASELINE.role(), Role::Core);
        assert!(!Archetype::BASELINE.is_strong());
        assert!(!Archetype::BASELINE.is_capacity_gated());
    }

    #[test]
    fn opposite_sides_pair_up() {
        for side in SpawnSide::ALL {
            assert_eq!(side.opposite().opposite(), side);
            assert_ne!(side.opposite(), side);
            let dot = side.outward().dot(side.opposite().outward());
            assert!((dot + 1.0).abs() < 1e-5);
        }
        assert_eq!(SpawnSide::Top.opposite(), SpawnSide::Bottom);
        assert_eq!(SpawnSide::TopRight.opposite(), SpawnSide::BottomLeft);
    }

    #[test]
    fn population_snapshot_counts_roles_and_strong() {
        let snapshot = PopulationSnapshot::from_alive([
            Archetype::Grunt,
            Archetype::Grunt,
            Archetype::Juggernaut,
            Archetype::Sniper,
        ]);
        assert_eq!(snapshot.total(), 4);
        assert_eq!(snapshot.alive(Archetype::Grunt), 2);
        assert_eq!(snapshot.role(Role::Harasser), 1);
        assert_eq!(snapshot.strong(), 1);
    }

    #[test]
    fn spawn_record_serializes_through_bincode() {
        let record = SpawnRecord {
            tick: 9,
            archetype: Archetype::Weaver,
            position: Vec2::new(12.5, -330.0),
            pattern: PlacementPattern::Arc,
            side: Some(SpawnSide::Bottom),
            relaxation: 2,
        };
        let bytes = bincode::serialize(&record).expect("serialize");
        let restored: SpawnRecord = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, record);
    }

    #[test]
    fn margin_containment_is_strict() {
        let bounds = PlayBounds::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0));
        assert!(bounds.contains_with_margin(Vec2::ZERO, 5.0));
        assert!(!bounds.contains_with_margin(Vec2::new(15.0, 0.0), 5.0));
        assert!(bounds.contains_with_margin(Vec2::new(14.9, 0.0), 5.0));
    }
}
