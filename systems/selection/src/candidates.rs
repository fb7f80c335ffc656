use spawn_director_core::{Archetype, ArchetypeCounts, DirectorConfig, Stage};

/// Per-archetype suppression timers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CooldownMap {
    remaining: [f32; Archetype::COUNT],
}

impl CooldownMap {
    /// Creates a map with every timer expired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every timer by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        for remaining in &mut self.remaining {
            *remaining = (*remaining - dt).max(0.0);
        }
    }

    /// Starts the timer of `archetype`, keeping any longer remaining time.
    pub fn start(&mut self, archetype: Archetype, seconds: f32) {
        let slot = &mut self.remaining[archetype.index()];
        *slot = slot.max(seconds);
    }

    /// Seconds left on the timer of `archetype`.
    #[must_use]
    pub fn remaining(&self, archetype: Archetype) -> f32 {
        self.remaining[archetype.index()]
    }

    /// Reports whether `archetype` is still suppressed.
    #[must_use]
    pub fn is_active(&self, archetype: Archetype) -> bool {
        self.remaining(archetype) > 0.0
    }

    /// Expires every timer.
    pub fn clear(&mut self) {
        self.remaining = [0.0; Archetype::COUNT];
    }
}

/// Recipe-specific narrowing applied on top of the standard eligibility checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidateFilter {
    /// Excludes strong archetypes.
    pub exclude_strong: bool,
    /// Keeps only archetypes that tolerate metronomic stream placement.
    pub rapid_fire_only: bool,
    /// Admits archetypes that may only lead an escort group.
    pub allow_commander_only: bool,
    /// Ignores cooldown timers.
    pub ignore_cooldown: bool,
}

impl CandidateFilter {
    /// Standard filter: everything except commander-only archetypes.
    pub const STANDARD: Self = Self {
        exclude_strong: false,
        rapid_fire_only: false,
        allow_commander_only: false,
        ignore_cooldown: false,
    };

    /// Non-strong roster used by recovery and escorts.
    pub const NON_STRONG: Self = Self {
        exclude_strong: true,
        ..Self::STANDARD
    };

    /// Threat-excluded pool used by pressure streams.
    pub const RAPID_FIRE: Self = Self {
        rapid_fire_only: true,
        ..Self::STANDARD
    };

    /// Strong leaders for commander/escort groups.
    pub const COMMANDER: Self = Self {
        allow_commander_only: true,
        ..Self::STANDARD
    };

    /// Population-only checks used when substituting a blocked archetype.
    pub const SUBSTITUTE: Self = Self {
        ignore_cooldown: true,
        ..Self::STANDARD
    };
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// World state the candidate builder filters against.
#[derive(Clone, Copy, Debug)]
pub struct CandidateContext<'a> {
    /// Configuration tables.
    pub config: &'a DirectorConfig,
    /// Active stage.
    pub stage: Stage,
    /// Suppression timers.
    pub cooldowns: &'a CooldownMap,
    /// Live enemies, including those materialised this tick.
    pub alive: &'a ArchetypeCounts,
    /// Tasks waiting in the spawn and pending queues.
    pub queued: &'a ArchetypeCounts,
}

impl CandidateContext<'_> {
    fn committed(&self, archetype: Archetype) -> u32 {
        self.alive.get(archetype) + self.queued.get(archetype)
    }
}

/// Reports whether `archetype` passes the unlock, cooldown, population and role gates.
#[must_use]
pub fn is_eligible(
    archetype: Archetype,
    context: &CandidateContext<'_>,
    filter: CandidateFilter,
) -> bool {
    if filter.exclude_strong && archetype.is_strong() {
        return false;
    }
    if filter.rapid_fire_only && !archetype.is_rapid_fire_suitable() {
        return false;
    }
    if archetype.is_commander_only() && !filter.allow_commander_only {
        return false;
    }

    let config = context.config;
    if context.stage.get() < config.unlock_stage(archetype) {
        return false;
    }
    if !filter.ignore_cooldown && context.cooldowns.is_active(archetype) {
        return false;
    }

    let band = context.stage.band();
    if let Some(cap) = config.population_cap(archetype, band) {
        if context.committed(archetype) >= cap {
            return false;
        }
    }
    let role = archetype.role();
    if let Some(cap) = config.role_cap(role, band) {
        let committed = context.alive.role(role) + context.queued.role(role);
        if committed >= cap {
            return false;
        }
    }
    true
}

/// Collects every eligible archetype in canonical order.
pub fn build_candidates(
    context: &CandidateContext<'_>,
    filter: CandidateFilter,
    out: &mut Vec<Archetype>,
) {
    out.clear();
    out.extend(
        Archetype::ALL
            .iter()
            .copied()
            .filter(|archetype| is_eligible(*archetype, context, filter)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context<'a>(
        config: &'a DirectorConfig,
        stage: u8,
        cooldowns: &'a CooldownMap,
        alive: &'a ArchetypeCounts,
        queued: &'a ArchetypeCounts,
    ) -> CandidateContext<'a> {
        CandidateContext {
            config,
            stage: Stage::new(stage),
            cooldowns,
            alive,
            queued,
        }
    }

    #[test]
    fn unlock_gate_limits_first_stage() {
        let config = DirectorConfig::default();
        let cooldowns = CooldownMap::new();
        let counts = ArchetypeCounts::new();
        let mut out = Vec::new();
        build_candidates(
            &context(&config, 1, &cooldowns, &counts, &counts),
            CandidateFilter::STANDARD,
            &mut out,
        );
        assert_eq!(out, vec![Archetype::Grunt, Archetype::Swarmer]);
    }

    #[test]
    fn cooldown_suppresses_until_expired() {
        let config = DirectorConfig::default();
        let mut cooldowns = CooldownMap::new();
        let counts = ArchetypeCounts::new();
        cooldowns.start(Archetype::Dasher, 1.5);
        let ctx = context(&config, 4, &cooldowns, &counts, &counts);
        assert!(!is_eligible(Archetype::Dasher, &ctx, CandidateFilter::STANDARD));
        assert!(is_eligible(Archetype::Dasher, &ctx, CandidateFilter::SUBSTITUTE));
        cooldowns.tick(2.0);
        let ctx = context(&config, 4, &cooldowns, &counts, &counts);
        assert!(is_eligible(Archetype::Dasher, &ctx, CandidateFilter::STANDARD));
    }

    #[test]
    fn queued_units_count_against_caps() {
        let config = DirectorConfig::default();
        let cooldowns = CooldownMap::new();
        let mut alive = ArchetypeCounts::new();
        let mut queued = ArchetypeCounts::new();
        alive.increment(Archetype::Sniper);
        let ctx = context(&config, 5, &cooldowns, &alive, &queued);
        assert!(is_eligible(Archetype::Sniper, &ctx, CandidateFilter::STANDARD));
        queued.increment(Archetype::Sniper);
        let ctx = context(&config, 5, &cooldowns, &alive, &queued);
        assert!(!is_eligible(Archetype::Sniper, &ctx, CandidateFilter::STANDARD));
    }

    #[test]
    fn role_caps_share_one_ceiling() {
        let config = DirectorConfig::default();
        let cooldowns = CooldownMap::new();
        let mut alive = ArchetypeCounts::new();
        let queued = ArchetypeCounts::new();
        for _ in 0..3 {
            alive.increment(Archetype::Dasher);
        }
        alive.increment(Archetype::Sniper);
        alive.increment(Archetype::Sniper);
        let ctx = context(&config, 3, &cooldowns, &alive, &queued);
        assert!(!is_eligible(Archetype::Dasher, &ctx, CandidateFilter::STANDARD));
        let ctx = context(&config, 4, &cooldowns, &alive, &queued);
        assert!(is_eligible(Archetype::Dasher, &ctx, CandidateFilter::STANDARD));
    }

    #[test]
    fn filters_narrow_the_pool() {
        let config = DirectorConfig::default();
        let cooldowns = CooldownMap::new();
        let counts = ArchetypeCounts::new();
        let ctx = context(&config, 10, &cooldowns, &counts, &counts);
        let mut out = Vec::new();
        build_candidates(&ctx, CandidateFilter::STANDARD, &mut out);
        assert!(!out.contains(&Archetype::Warlord));
        build_candidates(&ctx, CandidateFilter::COMMANDER, &mut out);
        assert!(out.contains(&Archetype::Warlord));
        build_candidates(&ctx, CandidateFilter::NON_STRONG, &mut out);
        assert!(out.iter().all(|archetype| !archetype.is_strong()));
        build_candidates(&ctx, CandidateFilter::RAPID_FIRE, &mut out);
        assert!(!out.contains(&Archetype::Sniper));
        assert!(out.contains(&Archetype::Grunt));
    }
}
