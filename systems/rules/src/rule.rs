//! Declarative rule records and their evaluation against a single decision.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use spawn_director_core::{Archetype, ArchetypeCounts, PlacementPattern, SpawnDecision, Stage};

/// Coarse classification of a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    /// Ceiling on concurrent instances.
    Cap,
    /// Ceiling on instances issued within a wave or tick.
    Limit,
    /// Minimum number of other enemies that must accompany the target.
    Floor,
    /// Forbidden placement patterns.
    Exclusion,
    /// Spatial predicate over the proposed position.
    Position,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cap => "CAP",
            Self::Limit => "LIMIT",
            Self::Floor => "FLOOR",
            Self::Exclusion => "EXCLUSION",
            Self::Position => "POSITION",
        };
        f.pad(label)
    }
}

/// Archetype a rule applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleTarget {
    /// Every archetype.
    Any,
    /// One archetype.
    Archetype(Archetype),
}

impl RuleTarget {
    /// Reports whether the target covers `archetype`.
    #[must_use]
    pub fn matches(self, archetype: Archetype) -> bool {
        match self {
            Self::Any => true,
            Self::Archetype(target) => target == archetype,
        }
    }

    /// Reports whether the target covers the baseline archetype.
    #[must_use]
    pub fn covers_baseline(self) -> bool {
        self.matches(Archetype::BASELINE)
    }
}

impl fmt::Display for RuleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.pad("any"),
            Self::Archetype(archetype) => f.pad(archetype.name()),
        }
    }
}

/// Population a count-based rule measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountScope {
    /// Enemies currently alive, including those materialised this tick.
    Alive,
    /// Enemies issued since the current phase began.
    Wave,
    /// Enemies issued during the current tick.
    Tick,
}

impl fmt::Display for CountScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Alive => "alive",
            Self::Wave => "wave",
            Self::Tick => "tick",
        };
        f.pad(label)
    }
}

/// Stage applicability of a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StagePredicate {
    /// Every stage.
    Always,
    /// Stages up to and including the bound.
    AtMost(u8),
    /// Stages from the bound onwards.
    AtLeast(u8),
    /// Stages within the inclusive range.
    Between(u8, u8),
}

impl StagePredicate {
    /// Reports whether the predicate holds on `stage`.
    #[must_use]
    pub fn holds(self, stage: Stage) -> bool {
        let value = stage.get();
        match self {
            Self::Always => true,
            Self::AtMost(bound) => value <= bound,
            Self::AtLeast(bound) => value >= bound,
            Self::Between(low, high) => (low..=high).contains(&value),
        }
    }
}

impl fmt::Display for StagePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.pad("all"),
            Self::AtMost(bound) => f.pad(&format!("<={bound}")),
            Self::AtLeast(bound) => f.pad(&format!(">={bound}")),
            Self::Between(low, high) => f.pad(&format!("{low}-{high}")),
        }
    }
}

/// Whether a violation stops the spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Violations hand the decision to the resolver.
    Blocking,
    /// Violations are collected for diagnostics only.
    Advisory,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocking => f.pad("blocking"),
            Self::Advisory => f.pad("advisory"),
        }
    }
}

/// Named spatial predicate used by POSITION rules.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PositionCheck {
    /// Every recent spawn point must lie at least `radius` away.
    MinSpacing {
        /// Minimum distance in world units.
        radius: f32,
    },
    /// The player must lie at least `radius` away.
    PlayerClearance {
        /// Minimum distance in world units.
        radius: f32,
    },
}

impl PositionCheck {
    fn accepts(self, position: Vec2, context: &RuleContext<'_>) -> bool {
        match self {
            Self::MinSpacing { radius } => {
                let limit = radius * radius;
                context
                    .recent_points
                    .iter()
                    .all(|point| point.distance_squared(position) >= limit)
            }
            Self::PlayerClearance { radius } => {
                context.player_position.distance_squared(position) >= radius * radius
            }
        }
    }

    fn radius(self) -> f32 {
        match self {
            Self::MinSpacing { radius } | Self::PlayerClearance { radius } => radius,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::MinSpacing { .. } => "min-spacing",
            Self::PlayerClearance { .. } => "player-clearance",
        }
    }
}

/// Kind-specific payload of a rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RuleCheck {
    /// Violated when the counted value is at or above the threshold.
    Cap {
        /// Ceiling.
        threshold: u32,
        /// Population measured.
        scope: CountScope,
    },
    /// Violated when the counted value is at or above the threshold.
    Limit {
        /// Ceiling.
        threshold: u32,
        /// Population measured.
        scope: CountScope,
    },
    /// Violated when fewer than `threshold` non-target enemies are counted.
    Floor {
        /// Minimum company.
        threshold: u32,
        /// Population measured.
        scope: CountScope,
    },
    /// Violated when the decision carries one of the listed patterns.
    Exclusion {
        /// Forbidden patterns.
        patterns: Vec<PlacementPattern>,
    },
    /// Violated when the spatial predicate rejects the proposed position.
    Position(PositionCheck),
}

/// One declarative constraint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    /// Unique identifier used in dumps and reports.
    pub name: String,
    /// Archetype the rule constrains.
    pub target: RuleTarget,
    /// Stages on which the rule applies.
    pub stages: StagePredicate,
    /// Consequence of a violation.
    pub severity: Severity,
    /// Kind-specific payload.
    pub check: RuleCheck,
}

impl SpawnRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        target: RuleTarget,
        stages: StagePredicate,
        severity: Severity,
        check: RuleCheck,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            stages,
            severity,
            check,
        }
    }

    /// Kind of the rule.
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self.check {
            RuleCheck::Cap { .. } => RuleKind::Cap,
            RuleCheck::Limit { .. } => RuleKind::Limit,
            RuleCheck::Floor { .. } => RuleKind::Floor,
            RuleCheck::Exclusion { .. } => RuleKind::Exclusion,
            RuleCheck::Position(_) => RuleKind::Position,
        }
    }

    /// Reports whether the rule is evaluated for `decision` on `stage`.
    #[must_use]
    pub fn applies(&self, decision: &SpawnDecision, stage: Stage) -> bool {
        self.stages.holds(stage) && self.target.matches(decision.archetype)
    }

    /// Reports whether the decision breaks the rule. Inapplicable rules never do.
    #[must_use]
    pub fn is_violated(&self, decision: &SpawnDecision, context: &RuleContext<'_>) -> bool {
        if !self.applies(decision, context.stage) {
            return false;
        }
        match &self.check {
            RuleCheck::Cap { threshold, scope } | RuleCheck::Limit { threshold, scope } => {
                self.counted(context.counts(*scope)) >= *threshold
            }
            RuleCheck::Floor { threshold, scope } => {
                let counts = context.counts(*scope);
                let company = match self.target {
                    RuleTarget::Any => counts.total(),
                    RuleTarget::Archetype(target) => {
                        counts.total().saturating_sub(counts.get(target))
                    }
                };
                company < *threshold
            }
            RuleCheck::Exclusion { patterns } => patterns.contains(&decision.pattern),
            RuleCheck::Position(check) => {
                if !decision.spacing_enforced {
                    return false;
                }
                match decision.position {
                    Some(position) => !check.accepts(position, context),
                    None => false,
                }
            }
        }
    }

    fn counted(&self, counts: &ArchetypeCounts) -> u32 {
        match self.target {
            RuleTarget::Any => counts.total(),
            RuleTarget::Archetype(target) => counts.get(target),
        }
    }

    /// Threshold column shown in the dump.
    pub(crate) fn threshold_label(&self) -> String {
        match &self.check {
            RuleCheck::Cap { threshold, .. }
            | RuleCheck::Limit { threshold, .. }
            | RuleCheck::Floor { threshold, .. } => threshold.to_string(),
            RuleCheck::Exclusion { patterns } => format!("{} patterns", patterns.len()),
            RuleCheck::Position(check) => format!("{}", check.radius()),
        }
    }

    /// Scope column shown in the dump.
    pub(crate) fn scope_label(&self) -> String {
        match &self.check {
            RuleCheck::Cap { scope, .. }
            | RuleCheck::Limit { scope, .. }
            | RuleCheck::Floor { scope, .. } => scope.to_string(),
            RuleCheck::Exclusion { .. } => "pattern".to_owned(),
            RuleCheck::Position(check) => check.label().to_owned(),
        }
    }
}

/// Counters and spatial history a rule is evaluated against.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    /// Active stage.
    pub stage: Stage,
    /// Live enemies plus those materialised earlier this tick.
    pub alive: &'a ArchetypeCounts,
    /// Enemies issued during the current phase.
    pub wave: &'a ArchetypeCounts,
    /// Enemies issued during the current tick.
    pub tick: &'a ArchetypeCounts,
    /// Recent spawn points still inside the spacing window.
    pub recent_points: &'a [Vec2],
    /// Current player position.
    pub player_position: Vec2,
}

impl<'a> RuleContext<'a> {
    /// Counter backing one scope.
    #[must_use]
    pub fn counts(&self, scope: CountScope) -> &'a ArchetypeCounts {
        match scope {
            CountScope::Alive => self.alive,
            CountScope::Wave => self.wave,
            CountScope::Tick => self.tick,
        }
    }
}
