//! Bounded relaxation ladder applied to decisions that break a blocking rule.

use spawn_director_core::{
    Archetype, EscortLink, PlacementPattern, SpawnDecision, MAX_RELAXATION_DEPTH,
};
use spawn_director_system_rules::{RuleContext, RuleRegistry, ValidationReport};
use spawn_director_system_selection::{is_eligible, CandidateContext, CandidateFilter};
use tracing::debug;

/// Outcome of resolving one decision.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// Decision after every applied relaxation.
    pub decision: SpawnDecision,
    /// Validation of the final decision, advisories included.
    pub report: ValidationReport,
}

impl Resolution {
    /// Reports whether the ladder reached its terminal step.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.decision.relaxation >= MAX_RELAXATION_DEPTH
    }
}

/// Validates `decision` and relaxes it until no blocking rule fires.
///
/// Depth 1 drops formation metadata (and downgrades a strong archetype to the
/// baseline on early stages), depth 2 disables spacing, depths 3 and 4 walk the
/// archetype's substitution ladder and depth 5 forces the baseline
/// archetype as a lone unit with spacing off. A commander that stops being
/// strong loses its command, leaving its escorts leaderless.
pub fn resolve(
    mut decision: SpawnDecision,
    registry: &RuleRegistry,
    rules: &RuleContext<'_>,
    candidates: &CandidateContext<'_>,
) -> Resolution {
    let mut report = registry.validate(&decision, rules);
    while report.has_blocking() && decision.relaxation < MAX_RELAXATION_DEPTH {
        decision.relaxation += 1;
        relax(&mut decision, candidates);
        report = registry.validate(&decision, rules);
    }
    if decision.relaxation >= MAX_RELAXATION_DEPTH {
        debug!(
            requested = decision.original.name(),
            blocking = report.blocking().count(),
            "resolver reached terminal step"
        );
    }
    Resolution { decision, report }
}

fn relax(decision: &mut SpawnDecision, candidates: &CandidateContext<'_>) {
    let config = candidates.config;
    let stage = candidates.stage;
    match decision.relaxation {
        1 => {
            strip_formation(decision);
            if decision.archetype.is_strong() && stage.get() <= config.early_elite_stage {
                decision.archetype = Archetype::BASELINE;
            }
        }
        2 => decision.spacing_enforced = false,
        3 | 4 => {
            let ladder = config.substitutions(decision.original, stage.band());
            let rung = usize::from(decision.relaxation - 3);
            if let Some(substitute) = ladder.get(rung).copied() {
                if is_eligible(substitute, candidates, CandidateFilter::SUBSTITUTE) {
                    decision.archetype = substitute;
                }
            }
        }
        _ => {
            decision.archetype = Archetype::BASELINE;
            decision.spacing_enforced = false;
            strip_formation(decision);
        }
    }
    if !decision.archetype.is_strong() {
        if let EscortLink::Commander(_) = decision.options.escort {
            decision.options.escort = EscortLink::None;
        }
    }
}

fn strip_formation(decision: &mut SpawnDecision) {
    decision.pattern = PlacementPattern::Single;
    decision.options.formation = None;
    decision.options.entry = None;
}
