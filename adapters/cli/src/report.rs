//! Human-readable and JSON summaries of a headless run.

use std::fmt;

use serde::Serialize;
use spawn_director_core::{
    Archetype, DirectorConfig, PhaseKind, PlacementPattern, SpawnSide, Stage,
};

use crate::host::Outcome;

const PHASES: [(PhaseKind, &str); 6] = [
    (PhaseKind::Recovery, "recovery"),
    (PhaseKind::Formation, "formation"),
    (PhaseKind::Mixed, "mixed"),
    (PhaseKind::Pressure, "pressure"),
    (PhaseKind::Standard, "standard"),
    (PhaseKind::FixedSequence, "fixed-sequence"),
];

/// Progress toward one fixed-sequence quota.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub(crate) struct QuotaProgress {
    pub(crate) archetype: Archetype,
    pub(crate) spawned: u32,
    pub(crate) minimum: u32,
}

/// Summary of one simulated stage.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct Report {
    pub(crate) stage: Stage,
    pub(crate) seconds: f32,
    pub(crate) spawned: u32,
    pub(crate) budget_remaining: u32,
    pub(crate) peak_alive: usize,
    pub(crate) baseline_share: f32,
    pub(crate) ratio_calm: f32,
    pub(crate) ratio_burst: f32,
    pub(crate) archetypes: Vec<(Archetype, u32)>,
    pub(crate) sides: Vec<(SpawnSide, u32)>,
    pub(crate) patterns: Vec<(PlacementPattern, u32)>,
    pub(crate) phases: Vec<(&'static str, u32)>,
    pub(crate) relaxation: Vec<u32>,
    pub(crate) substitutions: u32,
    pub(crate) deferrals: u32,
    pub(crate) flushes: u32,
    pub(crate) quotas: Vec<QuotaProgress>,
    pub(crate) spice: u32,
}

impl Report {
    pub(crate) fn new(config: &DirectorConfig, stage: Stage, seconds: f32, outcome: &Outcome) -> Self {
        let stats = &outcome.stats;
        let band = stage.band().index();
        let quotas = if stage.get() == config.fixed_sequence.stage {
            config
                .fixed_sequence
                .quotas
                .iter()
                .map(|quota| QuotaProgress {
                    archetype: quota.archetype,
                    spawned: outcome.lifetime.get(quota.archetype),
                    minimum: quota.minimum,
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            stage,
            seconds,
            spawned: stats.total,
            budget_remaining: outcome.budget_remaining,
            peak_alive: outcome.peak_alive,
            baseline_share: stats.baseline_share(),
            ratio_calm: config.selector.ratio_calm[band],
            ratio_burst: config.selector.ratio_burst[band],
            archetypes: stats.archetypes.iter().filter(|(_, count)| *count > 0).collect(),
            sides: SpawnSide::ALL
                .iter()
                .map(|side| (*side, stats.side(*side)))
                .collect(),
            patterns: std::iter::once(PlacementPattern::Single)
                .chain(PlacementPattern::GROUPS)
                .map(|pattern| (pattern, stats.pattern(pattern)))
                .filter(|(_, count)| *count > 0)
                .collect(),
            phases: PHASES
                .iter()
                .map(|(kind, label)| (*label, stats.phase(*kind)))
                .filter(|(_, count)| *count > 0)
                .collect(),
            relaxation: stats.relaxation.to_vec(),
            substitutions: stats.substitutions,
            deferrals: stats.deferrals,
            flushes: stats.flushes,
            quotas,
            spice: outcome.spice,
        }
    }

    /// Reports whether every fixed-sequence quota was met.
    pub(crate) fn quotas_met(&self) -> bool {
        self.quotas
            .iter()
            .all(|quota| quota.spawned >= quota.minimum)
    }

    /// One-line digest used by `sweep`.
    pub(crate) fn summary_line(&self) -> String {
        format!(
            "stage {:>2}  spawned {:>4}  left {:>4}  peak {:>3}  baseline {:>5.1}%  subs {:>3}  deferred {:>3}  flushed {:>3}",
            self.stage.get(),
            self.spawned,
            self.budget_remaining,
            self.peak_alive,
            self.baseline_share * 100.0,
            self.substitutions,
            self.deferrals,
            self.flushes,
        )
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "stage {} over {:.0}s: {} spawns, {} budget left, peak {} alive",
            self.stage.get(),
            self.seconds,
            self.spawned,
            self.budget_remaining,
            self.peak_alive
        )?;
        writeln!(
            f,
            "baseline share {:.1}% (calm target {:.0}%, burst target {:.0}%)",
            self.baseline_share * 100.0,
            self.ratio_calm * 100.0,
            self.ratio_burst * 100.0
        )?;

        writeln!(f, "archetypes:")?;
        for (archetype, count) in &self.archetypes {
            writeln!(f, "  {:<12}{count:>5}", archetype.name())?;
        }

        if !self.quotas.is_empty() {
            writeln!(f, "quotas:")?;
            for quota in &self.quotas {
                let mark = if quota.spawned >= quota.minimum { "met" } else { "owed" };
                writeln!(
                    f,
                    "  {:<12}{:>5} / {:<3} {mark}",
                    quota.archetype.name(),
                    quota.spawned,
                    quota.minimum
                )?;
            }
            writeln!(f, "  spice injections: {}", self.spice)?;
        }

        writeln!(f, "sides:")?;
        for (side, count) in &self.sides {
            writeln!(f, "  {:<12}{count:>5}", format!("{side:?}"))?;
        }

        writeln!(f, "patterns:")?;
        for (pattern, count) in &self.patterns {
            writeln!(f, "  {:<14}{count:>5}", format!("{pattern:?}"))?;
        }

        writeln!(f, "phases:")?;
        for (label, count) in &self.phases {
            writeln!(f, "  {label:<14}{count:>5}")?;
        }

        write!(f, "relaxation depths:")?;
        for (depth, count) in self.relaxation.iter().enumerate() {
            write!(f, " {depth}={count}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "substitutions {}, deferrals {}, flushes {}",
            self.substitutions, self.deferrals, self.flushes
        )
    }
}
