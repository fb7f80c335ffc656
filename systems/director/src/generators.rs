//! Phase recipes that fill the spawn queue with timed tasks.

use rand::Rng;
use spawn_director_core::{
    last_positive, weighted_index, Archetype, ArchetypeCounts, DirectorConfig, EntryMotion,
    EscortLink, FormationSlot, GroupId, History, PhaseKind, PlacementPattern, SpawnTask, Stage,
};
use spawn_director_system_placement::{layout_formation, SideSelector};
use spawn_director_system_selection::{
    build_candidates, is_eligible, CandidateContext, CandidateFilter, CooldownMap,
    SelectionContext, WeightedSelector,
};

use crate::phase::Phase;

/// Borrowed director state a recipe draws from while generating one phase.
pub(crate) struct Generator<'a, R: ?Sized> {
    pub(crate) config: &'a DirectorConfig,
    pub(crate) stage: Stage,
    pub(crate) stage_time: f32,
    pub(crate) cooldowns: &'a CooldownMap,
    pub(crate) alive: ArchetypeCounts,
    pub(crate) queued: ArchetypeCounts,
    pub(crate) short_history: &'a History<Archetype>,
    pub(crate) long_history: &'a History<Archetype>,
    pub(crate) selector: &'a mut WeightedSelector,
    pub(crate) sides: &'a SideSelector,
    pub(crate) formation_history: &'a mut History<PlacementPattern>,
    pub(crate) next_group: &'a mut u32,
    pub(crate) budget: u32,
    pub(crate) rng: &'a mut R,
}

impl<R: Rng + ?Sized> Generator<'_, R> {
    pub(crate) fn capacity(&self) -> u32 {
        self.config.stages.capacity(self.stage)
    }

    pub(crate) fn scaled(&self, fraction: f32) -> u32 {
        (self.capacity() as f32 * fraction).round().max(0.0) as u32
    }

    pub(crate) fn candidate_context(&self) -> CandidateContext<'_> {
        CandidateContext {
            config: self.config,
            stage: self.stage,
            cooldowns: self.cooldowns,
            alive: &self.alive,
            queued: &self.queued,
        }
    }

    pub(crate) fn eligible(&self, archetype: Archetype, filter: CandidateFilter) -> bool {
        is_eligible(archetype, &self.candidate_context(), filter)
    }

    pub(crate) fn candidates(&self, filter: CandidateFilter) -> Vec<Archetype> {
        let mut candidates = Vec::with_capacity(Archetype::COUNT);
        build_candidates(&self.candidate_context(), filter, &mut candidates);
        candidates
    }

    /// Runs the weighted selector over the filtered candidates and reserves the pick.
    pub(crate) fn pick(&mut self, filter: CandidateFilter) -> Archetype {
        let candidates = self.candidates(filter);
        let context = SelectionContext {
            stage: self.stage,
            stage_time: self.stage_time,
            short_history: self.short_history,
            long_history: self.long_history,
        };
        let selection = self.selector.select(&candidates, &context, &mut *self.rng);
        self.reserve(selection.archetype);
        selection.archetype
    }

    pub(crate) fn reserve(&mut self, archetype: Archetype) {
        self.queued.increment(archetype);
        self.budget = self.budget.saturating_sub(1);
    }

    /// Swaps an already reserved archetype for another.
    pub(crate) fn replace(&mut self, from: Archetype, to: Archetype) {
        self.queued.decrement(from);
        self.queued.increment(to);
    }

    /// Keeps `preferred` while its caps allow, otherwise the baseline; reserves the result.
    fn repeat_or_baseline(&mut self, preferred: Archetype) -> Archetype {
        let archetype = if self.eligible(preferred, CandidateFilter::SUBSTITUTE) {
            preferred
        } else {
            Archetype::BASELINE
        };
        self.reserve(archetype);
        archetype
    }

    fn group(&mut self) -> GroupId {
        let group = GroupId::new(*self.next_group);
        *self.next_group = self.next_group.wrapping_add(1);
        group
    }

    /// Small, low-threat breather, optionally led by a strong commander.
    pub(crate) fn recovery(&mut self, after_strong: bool, out: &mut Vec<SpawnTask>) -> Phase {
        let config = self.config;
        let tuning = &config.phases.recovery;
        let mut phase = Phase::new(PhaseKind::Recovery, config);
        phase.after_strong = after_strong;
        let count = self
            .scaled(tuning.capacity_fraction)
            .max(tuning.minimum)
            .min(self.budget);

        let mut escort = EscortLink::None;
        let wants_commander = !after_strong
            && count >= 2
            && self.stage.get() >= tuning.commander_min_stage
            && self.rng.gen::<f32>() < tuning.commander_chance;
        if wants_commander {
            if let Some(commander) = self.commander() {
                let group = self.group();
                let mut task = SpawnTask::single(commander, tuning.delay);
                task.options.escort = EscortLink::Commander(group);
                out.push(task);
                escort = EscortLink::Escort(group);
                phase.primary = Some(commander);
                phase.strong = true;
            }
        }

        while (out.len() as u32) < count {
            let mut archetype = self.pick(CandidateFilter::NON_STRONG);
            if escort != EscortLink::None && archetype.is_commander_only() {
                self.replace(archetype, Archetype::BASELINE);
                archetype = Archetype::BASELINE;
            }
            let mut task = SpawnTask::single(archetype, tuning.delay);
            task.options.escort = escort;
            out.push(task);
        }
        phase.target_count = out.len() as u32;
        phase
    }

    fn commander(&mut self) -> Option<Archetype> {
        if self.selector.elites_blocked(self.stage.band()) {
            return None;
        }
        let band = self.stage.band();
        let leaders: Vec<(Archetype, f32)> = self
            .candidates(CandidateFilter::COMMANDER)
            .into_iter()
            .filter(|archetype| archetype.is_strong())
            .map(|archetype| (archetype, self.config.base_weight(archetype, band)))
            .filter(|(_, weight)| *weight > 0.0)
            .collect();
        let leader = weighted_choice(&leaders, &mut *self.rng)?;
        self.selector.note_external_pick(leader);
        self.reserve(leader);
        Some(leader)
    }

    /// One geometric group of a single primary archetype.
    pub(crate) fn formation(&mut self, out: &mut Vec<SpawnTask>) -> Phase {
        let config = self.config;
        let tuning = &config.phases.formation;
        let mut phase = Phase::new(PhaseKind::Formation, config);
        let count = self
            .scaled(tuning.capacity_fraction)
            .clamp(tuning.minimum, tuning.maximum.max(tuning.minimum))
            .min(self.budget);
        if count == 0 {
            return phase;
        }

        let pattern = self.formation_pattern();
        self.formation_history.push(pattern);
        let primary = self.pick(CandidateFilter::NON_STRONG);
        let side = self.sides.choose(&mut *self.rng);
        let layout = layout_formation(
            &config.placement,
            pattern,
            side,
            count as usize,
            &mut *self.rng,
        );
        let group = self.group();

        for (index, position) in layout.positions.iter().enumerate() {
            let archetype = if index == 0 {
                primary
            } else {
                self.repeat_or_baseline(primary)
            };
            let mut task = SpawnTask::single(archetype, tuning.member_delay);
            task.pattern = pattern;
            task.position = Some(*position);
            task.side = Some(side);
            task.options.entry = Some(EntryMotion { glide: layout.glide });
            task.options.formation = Some(FormationSlot {
                pattern,
                group,
                index: index as u32,
            });
            out.push(task);
        }

        phase.primary = Some(primary);
        phase.pattern = pattern;
        phase.target_count = out.len() as u32;
        phase
    }

    fn formation_pattern(&mut self) -> PlacementPattern {
        let config = self.config;
        let tuning = &config.phases.formation;
        let pool: Vec<(PlacementPattern, f32)> = config
            .formations
            .for_band(self.stage.band())
            .iter()
            .map(|entry| {
                let penalty = if self.formation_history.count(entry.pattern) > 0 {
                    tuning.repeat_penalty
                } else {
                    1.0
                };
                (entry.pattern, entry.weight.max(0.0) * penalty)
            })
            .collect();
        weighted_choice(&pool, &mut *self.rng).unwrap_or(PlacementPattern::Line)
    }

    /// Two or three sequential sub-waves of individually selected units.
    pub(crate) fn mixed(&mut self, out: &mut Vec<SpawnTask>) -> Phase {
        let config = self.config;
        let tuning = &config.phases.mixed;
        let mut phase = Phase::new(PhaseKind::Mixed, config);
        let low = tuning.min_subwaves.max(1);
        let waves = self.rng.gen_range(low..=tuning.max_subwaves.max(low));
        let size = self.scaled(tuning.capacity_fraction).max(tuning.minimum);
        let mut strong_seen = false;

        'waves: for wave in 0..waves {
            for member in 0..size {
                if self.budget == 0 {
                    break 'waves;
                }
                let mut archetype = self.pick(CandidateFilter::STANDARD);
                if archetype.is_strong() {
                    if strong_seen && self.rng.gen::<f32>() < tuning.demote_chance {
                        self.replace(archetype, Archetype::BASELINE);
                        archetype = Archetype::BASELINE;
                    } else {
                        strong_seen = true;
                    }
                }
                let delay = if member == 0 && wave > 0 {
                    tuning.subwave_gap
                } else {
                    tuning.intra_delay
                };
                out.push(SpawnTask::single(archetype, delay));
            }
        }

        phase.strong = out.iter().any(|task| task.archetype.is_strong());
        phase.target_count = out.len() as u32;
        phase
    }

    /// Metronomic stream of one rapid-fire-suitable archetype from a single side.
    pub(crate) fn pressure(&mut self, out: &mut Vec<SpawnTask>) -> Phase {
        let config = self.config;
        let tuning = &config.phases.pressure;
        let mut phase = Phase::new(PhaseKind::Pressure, config);
        let count = self.scaled(tuning.capacity_fraction).min(self.budget);
        if count == 0 {
            return phase;
        }

        let primary = self.pick(CandidateFilter::RAPID_FIRE);
        let side = self.sides.choose(&mut *self.rng);
        let velocity = -side.outward() * tuning.stream_speed;
        for index in 0..count {
            let archetype = if index == 0 {
                primary
            } else {
                self.repeat_or_baseline(primary)
            };
            let mut task = SpawnTask::single(archetype, tuning.interval);
            task.side = Some(side);
            task.options.velocity = Some(velocity);
            out.push(task);
        }

        phase.primary = Some(primary);
        phase.strong = true;
        phase.target_count = out.len() as u32;
        phase
    }

    /// Single bulk injection with near-simultaneous releases.
    pub(crate) fn standard(&mut self, out: &mut Vec<SpawnTask>) -> Phase {
        let config = self.config;
        let tuning = &config.phases.standard;
        let mut phase = Phase::new(PhaseKind::Standard, config);
        let count = self.scaled(tuning.capacity_fraction).min(self.budget);
        for _ in 0..count {
            let archetype = self.pick(CandidateFilter::STANDARD);
            let delay = if tuning.delay_max > tuning.delay_min {
                self.rng.gen_range(tuning.delay_min..=tuning.delay_max)
            } else {
                tuning.delay_min
            };
            out.push(SpawnTask::single(archetype, delay));
        }
        phase.strong = out.iter().any(|task| task.archetype.is_strong());
        phase.target_count = out.len() as u32;
        phase
    }
}

/// Cumulative-weight draw over `(value, weight)` pairs; `None` when every weight is zero.
pub(crate) fn weighted_choice<T: Copy, R: Rng + ?Sized>(
    entries: &[(T, f32)],
    rng: &mut R,
) -> Option<T> {
    let weights: Vec<f32> = entries.iter().map(|(_, weight)| *weight).collect();
    weighted_index(&weights, rng)
        .or_else(|| last_positive(&weights))
        .map(|index| entries[index].0)
}

#[cfg(test)]
pub(crate) mod fixture {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use spawn_director_system_selection::Roster;

    use super::*;

    pub(crate) struct Fixture {
        pub(crate) config: DirectorConfig,
        pub(crate) cooldowns: CooldownMap,
        pub(crate) short: History<Archetype>,
        pub(crate) long: History<Archetype>,
        pub(crate) selector: WeightedSelector,
        pub(crate) sides: SideSelector,
        pub(crate) formations: History<PlacementPattern>,
        pub(crate) next_group: u32,
        pub(crate) rng: ChaCha8Rng,
    }

    impl Fixture {
        pub(crate) fn new(seed: u64) -> Self {
            let config = DirectorConfig::default();
            let selector = WeightedSelector::new(&config, Roster::default(), 0);
            let sides = SideSelector::new(&config.placement);
            Self {
                short: History::with_capacity(config.selector.short_window),
                long: History::with_capacity(config.selector.long_window),
                formations: History::with_capacity(config.phases.formation.history),
                cooldowns: CooldownMap::new(),
                selector,
                sides,
                next_group: 0,
                rng: ChaCha8Rng::seed_from_u64(seed),
                config,
            }
        }

        pub(crate) fn generator(&mut self, stage: u8) -> Generator<'_, ChaCha8Rng> {
            Generator {
                config: &self.config,
                stage: Stage::new(stage),
                stage_time: 120.0,
                cooldowns: &self.cooldowns,
                alive: ArchetypeCounts::new(),
                queued: ArchetypeCounts::new(),
                short_history: &self.short,
                long_history: &self.long,
                selector: &mut self.selector,
                sides: &self.sides,
                formation_history: &mut self.formations,
                next_group: &mut self.next_group,
                budget: 500,
                rng: &mut self.rng,
            }
        }
    }
}
