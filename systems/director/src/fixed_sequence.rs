//! Pre-authored wave shapes for the fixed-sequence stage.

use rand::seq::SliceRandom;
use rand::Rng;
use spawn_director_core::{
    Archetype, ArchetypeCounts, FixedSequenceTuning, History, PhaseKind, SpawnTask,
};
use spawn_director_system_selection::{is_eligible, CandidateContext, CandidateFilter};
use tracing::debug;

use crate::generators::{weighted_choice, Generator};
use crate::phase::Phase;

/// Shape bag, pick cadence and spice timer of the fixed-sequence stage.
#[derive(Clone, Debug)]
pub(crate) struct FixedSequence {
    bag: Vec<usize>,
    picks: u32,
    recent: History<Archetype>,
    spice_timer: f32,
    spice_count: u32,
}

impl FixedSequence {
    pub(crate) fn new(tuning: &FixedSequenceTuning) -> Self {
        Self {
            bag: Vec::with_capacity(tuning.shapes.len()),
            picks: 0,
            recent: History::with_capacity(tuning.diversity_window),
            spice_timer: 0.0,
            spice_count: 0,
        }
    }

    pub(crate) fn spice_count(&self) -> u32 {
        self.spice_count
    }

    /// Advances the spice timer and returns an elevated-threat archetype when one is due.
    ///
    /// A due injection with nothing eligible stays armed until a slot frees up.
    pub(crate) fn spice<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        tuning: &FixedSequenceTuning,
        candidates: &CandidateContext<'_>,
        elites_blocked: bool,
        rng: &mut R,
    ) -> Option<Archetype> {
        if self.spice_count >= tuning.spice_cap || tuning.spice_interval <= 0.0 {
            return None;
        }
        self.spice_timer += dt;
        if self.spice_timer < tuning.spice_interval {
            return None;
        }
        let eligible: Vec<Archetype> = tuning
            .spice_pool
            .iter()
            .copied()
            .filter(|archetype| !(archetype.is_strong() && elites_blocked))
            .filter(|archetype| is_eligible(*archetype, candidates, CandidateFilter::STANDARD))
            .collect();
        let chosen = eligible.choose(rng).copied()?;
        self.spice_timer -= tuning.spice_interval;
        self.spice_count += 1;
        Some(chosen)
    }

    /// Queues one wave drawn from the next shape in the bag.
    ///
    /// Every `diversity_cadence`-th pick avoids the most recent picks; other
    /// picks serve unmet quotas first and the shape's weights otherwise.
    pub(crate) fn generate<R: Rng + ?Sized>(
        &mut self,
        generator: &mut Generator<'_, R>,
        lifetime: &ArchetypeCounts,
        out: &mut Vec<SpawnTask>,
    ) -> Phase {
        let config = generator.config;
        let tuning = &config.fixed_sequence;
        let mut phase = Phase::new(PhaseKind::FixedSequence, config);

        if self.bag.is_empty() {
            self.bag.extend(0..tuning.shapes.len());
            self.bag.shuffle(&mut *generator.rng);
        }
        let shape = self.bag.pop().and_then(|index| tuning.shapes.get(index));
        if let Some(shape) = shape {
            debug!(shape = shape.name.as_str(), "fixed-sequence wave");
        }

        let count = generator
            .scaled(tuning.capacity_fraction)
            .min(generator.budget);
        for _ in 0..count {
            self.picks += 1;
            let forced = tuning.diversity_cadence > 0 && self.picks % tuning.diversity_cadence == 0;
            let archetype = if forced {
                self.diverse(generator)
            } else if let Some(archetype) = quota_pick(generator, lifetime) {
                archetype
            } else {
                let weights: Vec<(Archetype, f32)> = shape
                    .map(|shape| {
                        shape
                            .weights
                            .iter()
                            .map(|entry| (entry.archetype, entry.weight))
                            .collect()
                    })
                    .unwrap_or_default();
                shaped_pick(generator, &weights)
            };
            self.recent.push(archetype);
            out.push(SpawnTask::single(archetype, tuning.delay));
        }

        phase.strong = out.iter().any(|task| task.archetype.is_strong());
        phase.target_count = out.len() as u32;
        phase
    }

    fn diverse<R: Rng + ?Sized>(&self, generator: &mut Generator<'_, R>) -> Archetype {
        let blocked = generator.selector.elites_blocked(generator.stage.band());
        let fresh: Vec<Archetype> = generator
            .candidates(CandidateFilter::STANDARD)
            .into_iter()
            .filter(|archetype| self.recent.count(*archetype) == 0)
            .filter(|archetype| !(archetype.is_strong() && blocked))
            .collect();
        match fresh.choose(&mut *generator.rng).copied() {
            Some(archetype) => {
                generator.selector.note_external_pick(archetype);
                generator.reserve(archetype);
                archetype
            }
            None => generator.pick(CandidateFilter::STANDARD),
        }
    }
}

fn quota_pick<R: Rng + ?Sized>(
    generator: &mut Generator<'_, R>,
    lifetime: &ArchetypeCounts,
) -> Option<Archetype> {
    let config = generator.config;
    let quotas = &config.fixed_sequence.quotas;
    let owed = quotas.iter().find(|quota| {
        lifetime.get(quota.archetype) + generator.queued.get(quota.archetype) < quota.minimum
            && generator.eligible(quota.archetype, CandidateFilter::STANDARD)
    })?;
    let archetype = owed.archetype;
    generator.selector.note_external_pick(archetype);
    generator.reserve(archetype);
    Some(archetype)
}

fn shaped_pick<R: Rng + ?Sized>(
    generator: &mut Generator<'_, R>,
    weights: &[(Archetype, f32)],
) -> Archetype {
    let blocked = generator.selector.elites_blocked(generator.stage.band());
    let pool: Vec<(Archetype, f32)> = weights
        .iter()
        .copied()
        .filter(|(archetype, _)| !(archetype.is_strong() && blocked))
        .filter(|(archetype, _)| generator.eligible(*archetype, CandidateFilter::STANDARD))
        .collect();
    match weighted_choice(&pool, &mut *generator.rng) {
        Some(archetype) => {
            generator.selector.note_external_pick(archetype);
            generator.reserve(archetype);
            archetype
        }
        None => generator.pick(CandidateFilter::STANDARD),
    }
}

#[cfg(test)]
mod tests {
    use spawn_director_core::DirectorConfig;

    use super::*;
    use crate::generators::fixture::Fixture;

    #[test]
    fn bag_visits_every_shape_before_repeating() {
        let config = DirectorConfig::default();
        let mut sequence = FixedSequence::new(&config.fixed_sequence);
        let mut fixture = Fixture::new(21);
        let lifetime = ArchetypeCounts::new();
        let shapes = config.fixed_sequence.shapes.len();
        for _ in 0..shapes {
            let mut out = Vec::new();
            let phase = sequence.generate(&mut fixture.generator(9), &lifetime, &mut out);
            assert_eq!(phase.kind, PhaseKind::FixedSequence);
        }
        assert!(sequence.bag.is_empty());
        let mut out = Vec::new();
        let _ = sequence.generate(&mut fixture.generator(9), &lifetime, &mut out);
        assert_eq!(sequence.bag.len(), shapes - 1);
    }

    #[test]
    fn unmet_quota_overrides_the_shape() {
        let config = DirectorConfig::default();
        let mut sequence = FixedSequence::new(&config.fixed_sequence);
        let mut fixture = Fixture::new(22);
        let lifetime = ArchetypeCounts::new();
        let mut out = Vec::new();
        let _ = sequence.generate(&mut fixture.generator(9), &lifetime, &mut out);
        assert_eq!(out[0].archetype, Archetype::Sniper);
        assert!(out.iter().any(|task| task.archetype == Archetype::Shielder));
    }

    #[test]
    fn spice_respects_interval_and_cap() {
        let config = DirectorConfig::default();
        let tuning = &config.fixed_sequence;
        let mut sequence = FixedSequence::new(tuning);
        let fixture = Fixture::new(23);
        let alive = ArchetypeCounts::new();
        let queued = ArchetypeCounts::new();
        let context = CandidateContext {
            config: &config,
            stage: spawn_director_core::Stage::new(9),
            cooldowns: &fixture.cooldowns,
            alive: &alive,
            queued: &queued,
        };
        let mut rng = fixture.rng.clone();
        assert!(sequence.spice(29.0, tuning, &context, false, &mut rng).is_none());
        let first = sequence.spice(1.0, tuning, &context, false, &mut rng);
        assert!(first.map_or(false, |archetype| tuning.spice_pool.contains(&archetype)));
        assert!(sequence.spice(1.0, tuning, &context, true, &mut rng).is_none());
        for _ in 0..10 {
            let _ = sequence.spice(30.0, tuning, &context, false, &mut rng);
        }
        assert_eq!(sequence.spice_count(), tuning.spice_cap);
    }
}
