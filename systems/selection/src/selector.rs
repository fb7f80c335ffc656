use rand::Rng;
use spawn_director_core::{
    weighted_index, Archetype, DirectorConfig, History, SelectorTuning, Stage, StageBand,
};

use crate::roster::{EliteLimiter, EncounterPlan, Roster};

/// How a selection was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionReason {
    /// Forced by the roster guarantee.
    Roster,
    /// Cumulative weighted draw.
    Weighted,
    /// Baseline draw swapped for its adjacent archetype.
    BaselineSwap,
    /// Weighted pool empty; first eligible filler entry.
    Filler,
    /// Nothing else eligible.
    Baseline,
}

/// Chosen archetype together with how it was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Archetype to issue.
    pub archetype: Archetype,
    /// Path through the selector.
    pub reason: SelectionReason,
}

/// Read-only inputs to one selection.
#[derive(Clone, Copy, Debug)]
pub struct SelectionContext<'a> {
    /// Active stage.
    pub stage: Stage,
    /// Seconds since the stage started.
    pub stage_time: f32,
    /// Short spawn history used for anti-streak.
    pub short_history: &'a History<Archetype>,
    /// Long spawn history used for ratio targeting and quota boosting.
    pub long_history: &'a History<Archetype>,
}

/// Stateful weighted selector owning the roster, plan rotation and elite limiter.
#[derive(Clone, Debug)]
pub struct WeightedSelector {
    tuning: SelectorTuning,
    base_weights: [[f32; 3]; Archetype::COUNT],
    roster: Roster,
    limiter: EliteLimiter,
    plan_offset: usize,
}

impl WeightedSelector {
    /// Creates a selector for the stage whose roster is supplied.
    #[must_use]
    pub fn new(config: &DirectorConfig, roster: Roster, plan_offset: usize) -> Self {
        let mut base_weights = [[0.0; 3]; Archetype::COUNT];
        for archetype in Archetype::ALL {
            for band in [StageBand::Early, StageBand::Mid, StageBand::Late] {
                base_weights[archetype.index()][band.index()] = config.base_weight(archetype, band);
            }
        }
        Self {
            tuning: config.selector.clone(),
            base_weights,
            roster,
            limiter: EliteLimiter::default(),
            plan_offset,
        }
    }

    /// Advances the elite cooldown.
    pub fn tick(&mut self, dt: f32) {
        self.limiter.tick(dt);
    }

    /// Clears per-phase elite counts.
    pub fn begin_phase(&mut self) {
        self.limiter.reset_phase();
    }

    /// Archetypes the roster still owes an appearance.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Plan active at `stage_time`.
    #[must_use]
    pub fn plan(&self, stage_time: f32) -> EncounterPlan {
        EncounterPlan::at(stage_time, self.tuning.plan_period, self.plan_offset)
    }

    /// Baseline share target in effect at `stage_time`.
    #[must_use]
    pub fn ratio_target(&self, band: StageBand, stage_time: f32) -> f32 {
        let cycle = self.tuning.burst_on + self.tuning.burst_off;
        let bursting = cycle > 0.0 && stage_time.rem_euclid(cycle) >= self.tuning.burst_off;
        if bursting {
            self.tuning.ratio_burst[band.index()]
        } else {
            self.tuning.ratio_calm[band.index()]
        }
    }

    /// Modified weight of every candidate, in candidate order.
    #[must_use]
    pub fn weights(&self, candidates: &[Archetype], context: &SelectionContext<'_>) -> Vec<f32> {
        let band = context.stage.band();
        let tuning = &self.tuning;
        let long = context.long_history;
        let favoured = self.plan(context.stage_time).favoured();
        let elite_blocked = self
            .limiter
            .blocks(tuning.elite_phase_cap[band.index()]);

        candidates
            .iter()
            .map(|archetype| {
                let mut weight = self.base_weights[archetype.index()][band.index()];

                if *archetype == Archetype::BASELINE
                    && long.len() >= tuning.ratio_min_history
                    && long.share(*archetype) > self.ratio_target(band, context.stage_time)
                {
                    weight *= tuning.ratio_suppression;
                }

                if long.len() >= tuning.quota_min_history
                    && long.count_recent(*archetype, tuning.quota_window) == 0
                {
                    weight *= tuning.quota_boost;
                }

                if *archetype == favoured {
                    weight *= tuning.plan_affinity;
                }

                let repeats = context.short_history.count(*archetype);
                weight *= tuning.streak_decay.powi(repeats as i32);

                if archetype.is_strong() && elite_blocked {
                    weight = 0.0;
                }
                weight.max(0.0)
            })
            .collect()
    }

    /// Picks one archetype from `candidates`.
    ///
    /// The roster guarantee pre-empts the draw during the roster window. An
    /// empty or exhausted pool falls back to the filler list and finally to
    /// the baseline archetype.
    pub fn select<R: Rng + ?Sized>(
        &mut self,
        candidates: &[Archetype],
        context: &SelectionContext<'_>,
        rng: &mut R,
    ) -> Selection {
        if context.stage_time < self.tuning.roster_window {
            if let Some(archetype) = self.roster.take_first(candidates) {
                return self.commit(archetype, SelectionReason::Roster);
            }
        }

        let weights = self.weights(candidates, context);
        if let Some(index) = weighted_index(&weights, rng) {
            return self.finish_draw(candidates[index], candidates, rng);
        }

        let band = context.stage.band();
        let elite_blocked = self
            .limiter
            .blocks(self.tuning.elite_phase_cap[band.index()]);
        let filler = self
            .tuning
            .filler
            .iter()
            .copied()
            .find(|archetype| {
                candidates.contains(archetype) && !(archetype.is_strong() && elite_blocked)
            });
        match filler {
            Some(archetype) => self.commit(archetype, SelectionReason::Filler),
            None => self.commit(Archetype::BASELINE, SelectionReason::Baseline),
        }
    }

    fn finish_draw<R: Rng + ?Sized>(
        &mut self,
        drawn: Archetype,
        candidates: &[Archetype],
        rng: &mut R,
    ) -> Selection {
        if drawn == Archetype::BASELINE && rng.gen::<f32>() < self.tuning.baseline_swap_chance {
            if let Some(adjacent) = drawn.adjacent().filter(|a| candidates.contains(a)) {
                return self.commit(adjacent, SelectionReason::BaselineSwap);
            }
        }
        self.commit(drawn, SelectionReason::Weighted)
    }

    fn commit(&mut self, archetype: Archetype, reason: SelectionReason) -> Selection {
        if archetype.is_strong() {
            self.limiter.record_pick(self.tuning.elite_cooldown);
        }
        Selection { archetype, reason }
    }

    /// Reports whether the elite limiter currently zeroes strong archetypes.
    #[must_use]
    pub fn elites_blocked(&self, band: StageBand) -> bool {
        self.limiter.blocks(self.tuning.elite_phase_cap[band.index()])
    }

    /// Registers a strong archetype issued outside [`WeightedSelector::select`].
    pub fn note_external_pick(&mut self, archetype: Archetype) {
        if archetype.is_strong() {
            self.limiter.record_pick(self.tuning.elite_cooldown);
        }
    }
}
