#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rule registry that validates spawn decisions against declarative constraints.
//!
//! Rules are plain data registered once per encounter. The registry refuses
//! any blocking rule that could reject the baseline archetype, which keeps the
//! resolver's terminal step legal by construction.

mod rule;

use std::fmt;

use spawn_director_core::{Archetype, DirectorConfig, PlacementPattern, SpawnDecision};
use thiserror::Error;

pub use rule::{
    CountScope, PositionCheck, RuleCheck, RuleContext, RuleKind, RuleTarget, Severity,
    SpawnRule, StagePredicate,
};

/// Errors raised while registering rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// A blocking rule could reject the baseline archetype.
    #[error("rule `{0}` could block the baseline archetype")]
    BaselineConflict(String),
    /// Another rule already uses the name.
    #[error("rule `{0}` is already registered")]
    DuplicateName(String),
}

/// One rule broken by a decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Name of the broken rule.
    pub rule: String,
    /// Kind of the broken rule.
    pub kind: RuleKind,
    /// Consequence of the violation.
    pub severity: Severity,
}

/// Every violation collected for one decision.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Violations in registration order.
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Reports whether any collected violation blocks the spawn.
    #[must_use]
    pub fn has_blocking(&self) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.severity == Severity::Blocking)
    }

    /// Iterates blocking violations.
    pub fn blocking(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|violation| violation.severity == Severity::Blocking)
    }

    /// Iterates advisory violations.
    pub fn advisories(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|violation| violation.severity == Severity::Advisory)
    }

    /// Reports whether any blocking violation belongs to `kind`.
    #[must_use]
    pub fn blocks_with(&self, kind: RuleKind) -> bool {
        self.blocking().any(|violation| violation.kind == kind)
    }
}

/// Flat collection of registered rules.
#[derive(Clone, Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<SpawnRule>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the shipped rule set, taking spatial radii from the placement tuning.
    #[must_use]
    pub fn standard(config: &DirectorConfig) -> Self {
        let mut registry = Self::new();
        for rule in standard_rules(config) {
            if let Err(error) = registry.register(rule) {
                debug_assert!(false, "standard rule rejected: {error}");
            }
        }
        registry
    }

    /// Adds a rule after checking it cannot block the baseline archetype.
    pub fn register(&mut self, rule: SpawnRule) -> Result<(), RuleError> {
        if self.rules.iter().any(|existing| existing.name == rule.name) {
            return Err(RuleError::DuplicateName(rule.name));
        }
        if conflicts_with_baseline(&rule) {
            return Err(RuleError::BaselineConflict(rule.name));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Registered rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[SpawnRule] {
        &self.rules
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Reports whether no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluates every applicable rule against the decision.
    #[must_use]
    pub fn validate(&self, decision: &SpawnDecision, context: &RuleContext<'_>) -> ValidationReport {
        let violations = self
            .rules
            .iter()
            .filter(|rule| rule.is_violated(decision, context))
            .map(|rule| Violation {
                rule: rule.name.clone(),
                kind: rule.kind(),
                severity: rule.severity,
            })
            .collect();
        ValidationReport { violations }
    }
}

impl fmt::Display for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<24} {:<9} {:<10} {:>10} {:<16} {:<6} severity",
            "name", "kind", "target", "threshold", "scope", "stages"
        )?;
        for rule in &self.rules {
            writeln!(
                f,
                "{:<24} {:<9} {:<10} {:>10} {:<16} {:<6} {}",
                rule.name,
                rule.kind(),
                rule.target,
                rule.threshold_label(),
                rule.scope_label(),
                rule.stages,
                rule.severity,
            )?;
        }
        Ok(())
    }
}

fn conflicts_with_baseline(rule: &SpawnRule) -> bool {
    if rule.severity != Severity::Blocking || !rule.target.covers_baseline() {
        return false;
    }
    match &rule.check {
        RuleCheck::Cap { .. } | RuleCheck::Limit { .. } | RuleCheck::Floor { .. } => true,
        RuleCheck::Exclusion { patterns } => patterns.contains(&PlacementPattern::Single),
        RuleCheck::Position(_) => false,
    }
}

fn standard_rules(config: &DirectorConfig) -> Vec<SpawnRule> {
    use Archetype::*;
    use RuleTarget::{Any, Archetype as Only};
    use Severity::{Advisory, Blocking};
    use StagePredicate::{Always, AtLeast, AtMost};

    let cap = |name: &str, archetype, threshold, stages| {
        SpawnRule::new(
            name,
            Only(archetype),
            stages,
            Blocking,
            RuleCheck::Cap {
                threshold,
                scope: CountScope::Alive,
            },
        )
    };

    vec![
        cap("juggernaut-cap-early", Juggernaut, 1, AtMost(6)),
        cap("juggernaut-cap-late", Juggernaut, 2, AtLeast(7)),
        cap("summoner-cap", Summoner, 1, Always),
        cap("warlord-cap", Warlord, 1, Always),
        cap("sniper-cap-early", Sniper, 2, AtMost(6)),
        cap("sniper-cap-late", Sniper, 3, AtLeast(7)),
        cap("shielder-cap-early", Shielder, 2, AtMost(6)),
        cap("shielder-cap-late", Shielder, 3, AtLeast(7)),
        SpawnRule::new(
            "bomber-wave-limit",
            Only(Bomber),
            Always,
            Blocking,
            RuleCheck::Limit {
                threshold: 4,
                scope: CountScope::Wave,
            },
        ),
        SpawnRule::new(
            "dasher-tick-limit",
            Only(Dasher),
            Always,
            Blocking,
            RuleCheck::Limit {
                threshold: 3,
                scope: CountScope::Tick,
            },
        ),
        SpawnRule::new(
            "tick-burst-advisory",
            Any,
            Always,
            Advisory,
            RuleCheck::Limit {
                threshold: 8,
                scope: CountScope::Tick,
            },
        ),
        SpawnRule::new(
            "summoner-escort-floor",
            Only(Summoner),
            Always,
            Blocking,
            RuleCheck::Floor {
                threshold: 3,
                scope: CountScope::Alive,
            },
        ),
        SpawnRule::new(
            "warlord-single-only",
            Only(Warlord),
            Always,
            Blocking,
            RuleCheck::Exclusion {
                patterns: PlacementPattern::GROUPS.to_vec(),
            },
        ),
        SpawnRule::new(
            "sniper-no-encircle",
            Only(Sniper),
            Always,
            Blocking,
            RuleCheck::Exclusion {
                patterns: vec![
                    PlacementPattern::Circle,
                    PlacementPattern::DoubleRing,
                    PlacementPattern::Cross,
                ],
            },
        ),
        SpawnRule::new(
            "min-spacing",
            Any,
            Always,
            Blocking,
            RuleCheck::Position(PositionCheck::MinSpacing {
                radius: config.placement.min_separation,
            }),
        ),
        SpawnRule::new(
            "player-clearance",
            Any,
            Always,
            Advisory,
            RuleCheck::Position(PositionCheck::PlayerClearance {
                radius: config.placement.player_clearance,
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use spawn_director_core::{ArchetypeCounts, SpawnTask, Stage};

    use super::*;

    fn decision(archetype: Archetype) -> SpawnDecision {
        SpawnDecision::from_task(&SpawnTask::single(archetype, 0.0))
    }

    #[test]
    fn standard_set_registers_every_rule() {
        let registry = RuleRegistry::standard(&DirectorConfig::default());
        assert_eq!(registry.len(), 16);
    }

    #[test]
    fn rejects_wildcard_blocking_cap() {
        let mut registry = RuleRegistry::new();
        let error = registry
            .register(SpawnRule::new(
                "total-cap",
                RuleTarget::Any,
                StagePredicate::Always,
                Severity::Blocking,
                RuleCheck::Cap {
                    threshold: 20,
                    scope: CountScope::Alive,
                },
            ))
            .expect_err("wildcard cap must be refused");
        assert_eq!(error, RuleError::BaselineConflict("total-cap".into()));
    }

    #[test]
    fn accepts_advisory_wildcard_and_rejects_duplicates() {
        let mut registry = RuleRegistry::new();
        let rule = SpawnRule::new(
            "crowd",
            RuleTarget::Any,
            StagePredicate::Always,
            Severity::Advisory,
            RuleCheck::Cap {
                threshold: 20,
                scope: CountScope::Alive,
            },
        );
        registry.register(rule.clone()).expect("advisory is allowed");
        assert_eq!(
            registry.register(rule),
            Err(RuleError::DuplicateName("crowd".into()))
        );
    }

    #[test]
    fn stage_predicates_bound_inclusively() {
        assert!(StagePredicate::AtMost(6).holds(Stage::new(6)));
        assert!(!StagePredicate::AtMost(6).holds(Stage::new(7)));
        assert!(StagePredicate::AtLeast(7).holds(Stage::new(7)));
        assert!(StagePredicate::Between(3, 5).holds(Stage::new(4)));
        assert!(!StagePredicate::Between(3, 5).holds(Stage::new(6)));
    }

    #[test]
    fn cap_counts_alive_scope() {
        let registry = RuleRegistry::standard(&DirectorConfig::default());
        let mut alive = ArchetypeCounts::new();
        alive.increment(Archetype::Juggernaut);
        let empty = ArchetypeCounts::new();
        let context = RuleContext {
            stage: Stage::new(5),
            alive: &alive,
            wave: &empty,
            tick: &empty,
            recent_points: &[],
            player_position: Vec2::ZERO,
        };
        let report = registry.validate(&decision(Archetype::Juggernaut), &context);
        assert!(report.has_blocking());
        assert!(report.blocks_with(RuleKind::Cap));

        let late = RuleContext {
            stage: Stage::new(8),
            ..context
        };
        assert!(!registry
            .validate(&decision(Archetype::Juggernaut), &late)
            .has_blocking());
    }

    #[test]
    fn floor_counts_company_other_than_target() {
        let registry = RuleRegistry::standard(&DirectorConfig::default());
        let mut alive = ArchetypeCounts::new();
        alive.increment(Archetype::Grunt);
        alive.increment(Archetype::Grunt);
        let empty = ArchetypeCounts::new();
        let context = RuleContext {
            stage: Stage::new(8),
            alive: &alive,
            wave: &empty,
            tick: &empty,
            recent_points: &[],
            player_position: Vec2::ZERO,
        };
        let report = registry.validate(&decision(Archetype::Summoner), &context);
        assert!(report.blocks_with(RuleKind::Floor));

        let mut escorted = alive;
        escorted.increment(Archetype::Swarmer);
        let context = RuleContext {
            alive: &escorted,
            ..context
        };
        let report = registry.validate(&decision(Archetype::Summoner), &context);
        assert!(!report.has_blocking());
    }

    #[test]
    fn position_rules_respect_spacing_flag() {
        let registry = RuleRegistry::standard(&DirectorConfig::default());
        let empty = ArchetypeCounts::new();
        let points = [Vec2::new(0.0, 340.0)];
        let context = RuleContext {
            stage: Stage::new(1),
            alive: &empty,
            wave: &empty,
            tick: &empty,
            recent_points: &points,
            player_position: Vec2::new(500.0, 500.0),
        };
        let mut crowded = decision(Archetype::Grunt);
        crowded.position = Some(Vec2::new(10.0, 340.0));
        assert!(registry.validate(&crowded, &context).blocks_with(RuleKind::Position));

        crowded.spacing_enforced = false;
        assert!(registry.validate(&crowded, &context).violations.is_empty());
    }

    #[test]
    fn advisory_violations_never_block() {
        let registry = RuleRegistry::standard(&DirectorConfig::default());
        let empty = ArchetypeCounts::new();
        let context = RuleContext {
            stage: Stage::new(1),
            alive: &empty,
            wave: &empty,
            tick: &empty,
            recent_points: &[],
            player_position: Vec2::new(0.0, 330.0),
        };
        let mut near_player = decision(Archetype::Grunt);
        near_player.position = Some(Vec2::new(0.0, 340.0));
        let report = registry.validate(&near_player, &context);
        assert_eq!(report.advisories().count(), 1);
        assert!(!report.has_blocking());
    }

    #[test]
    fn exclusion_blocks_group_warlord() {
        let registry = RuleRegistry::standard(&DirectorConfig::default());
        let empty = ArchetypeCounts::new();
        let context = RuleContext {
            stage: Stage::new(9),
            alive: &empty,
            wave: &empty,
            tick: &empty,
            recent_points: &[],
            player_position: Vec2::ZERO,
        };
        let mut grouped = decision(Archetype::Warlord);
        grouped.pattern = PlacementPattern::Circle;
        assert!(registry
            .validate(&grouped, &context)
            .blocks_with(RuleKind::Exclusion));
    }

    #[test]
    fn dump_lists_every_rule() {
        let registry = RuleRegistry::standard(&DirectorConfig::default());
        let dump = registry.to_string();
        assert_eq!(dump.lines().count(), registry.len() + 1);
        assert!(dump.contains("summoner-escort-floor"));
        assert!(dump.contains("FLOOR"));
        assert!(dump.contains("<=6"));
    }
}
