use serde::Serialize;
use spawn_director_core::{
    Archetype, ArchetypeCounts, PhaseKind, PlacementPattern, SpawnRecord, SpawnSide,
    MAX_RELAXATION_DEPTH,
};

/// Aggregated telemetry over every spawn of the current stage.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SpawnStats {
    /// Materialised spawns.
    pub total: u32,
    /// Spawns per archetype.
    pub archetypes: ArchetypeCounts,
    /// Spawns per side, clockwise from the top; side-less spawns are not counted.
    pub sides: [u32; 8],
    /// Spawns per placement pattern in declaration order.
    pub patterns: [u32; 12],
    /// Spawns per relaxation depth.
    pub relaxation: [u32; MAX_RELAXATION_DEPTH as usize + 1],
    /// Spawns whose archetype differs from the one requested.
    pub substitutions: u32,
    /// Tasks handed to the density controller.
    pub deferrals: u32,
    /// Tasks force-flushed by the safety valve.
    pub flushes: u32,
    /// Generated phases per kind in declaration order.
    pub phases: [u32; 6],
}

impl SpawnStats {
    /// Folds one materialised spawn into the totals.
    pub fn record(&mut self, record: &SpawnRecord, requested: Archetype) {
        self.total += 1;
        self.archetypes.increment(record.archetype);
        if let Some(side) = record.side {
            self.sides[side.index()] += 1;
        }
        self.patterns[pattern_index(record.pattern)] += 1;
        let depth = usize::from(record.relaxation.min(MAX_RELAXATION_DEPTH));
        self.relaxation[depth] += 1;
        if record.archetype != requested {
            self.substitutions += 1;
        }
    }

    /// Counts a generated phase.
    pub fn record_phase(&mut self, kind: PhaseKind) {
        self.phases[phase_index(kind)] += 1;
    }

    /// Fraction of spawns that were the baseline archetype.
    #[must_use]
    pub fn baseline_share(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.archetypes.get(Archetype::BASELINE) as f32 / self.total as f32
    }

    /// Spawns that entered from `side`.
    #[must_use]
    pub fn side(&self, side: SpawnSide) -> u32 {
        self.sides[side.index()]
    }

    /// Spawns issued under `pattern`.
    #[must_use]
    pub fn pattern(&self, pattern: PlacementPattern) -> u32 {
        self.patterns[pattern_index(pattern)]
    }

    /// Phases generated of `kind`.
    #[must_use]
    pub fn phase(&self, kind: PhaseKind) -> u32 {
        self.phases[phase_index(kind)]
    }
}

fn pattern_index(pattern: PlacementPattern) -> usize {
    pattern as usize
}

fn phase_index(kind: PhaseKind) -> usize {
    kind as usize
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    #[test]
    fn records_substitutions_and_depths() {
        let mut stats = SpawnStats::default();
        let record = SpawnRecord {
            tick: 1,
            archetype: Archetype::Grunt,
            position: Vec2::ZERO,
            pattern: PlacementPattern::Single,
            side: Some(SpawnSide::Left),
            relaxation: 5,
        };
        stats.record(&record, Archetype::Sniper);
        stats.record(&record, Archetype::Grunt);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.substitutions, 1);
        assert_eq!(stats.relaxation[5], 2);
        assert_eq!(stats.side(SpawnSide::Left), 2);
        assert!((stats.baseline_share() - 1.0).abs() < f32::EPSILON);
    }
}
