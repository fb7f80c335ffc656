//! Terminal step that materialises a validated decision through the host pool.

use glam::Vec2;
use spawn_director_core::{
    DirectorConfig, EnemyInit, EnemyPool, EscortLink, SpawnDecision, SpawnRecord, StatsSink,
};

use crate::state::DirectorState;

/// Acquires a slot, initialises the enemy and records every side effect of the spawn.
///
/// Returns `None` without touching any state when the pool is exhausted.
pub(crate) fn execute(
    state: &mut DirectorState,
    config: &DirectorConfig,
    decision: &SpawnDecision,
    position: Vec2,
    pool: &mut impl EnemyPool,
    sink: &mut impl StatsSink,
) -> Option<SpawnRecord> {
    let handle = pool.acquire()?;
    let archetype = decision.archetype;
    let escort = decision.options.escort;
    let leader = match escort {
        EscortLink::Escort(group) => state.commanders.get(&group).copied(),
        EscortLink::Commander(_) | EscortLink::None => None,
    };

    let init = EnemyInit {
        archetype,
        position,
        hp_multiplier: config.hp_multiplier(state.stage),
        speed_multiplier: config.speed_multiplier(state.stage),
        escort,
        leader,
        velocity: decision.options.velocity,
        entry: decision.options.entry,
        lifespan: config.lifespan(archetype),
    };
    pool.initialize(handle, &init);
    if let EscortLink::Commander(group) = escort {
        let _ = state.commanders.insert(group, handle);
    }

    let cooldown = config.cooldown(archetype);
    if cooldown > 0.0 {
        state.cooldowns.start(archetype, cooldown);
    }
    state.short_history.push(archetype);
    state.long_history.push(archetype);
    state.lifetime.increment(archetype);
    state.wave_counts.increment(archetype);
    state.tick_counts.increment(archetype);
    state.spacing.push(state.stage_time, position);
    if let Some(side) = decision.side {
        state.sides.record(side);
    }
    state.budget_remaining = state.budget_remaining.saturating_sub(1);

    let record = SpawnRecord {
        tick: state.tick,
        archetype,
        position,
        pattern: decision.pattern,
        side: decision.side,
        relaxation: decision.relaxation,
    };
    state.stats.record(&record, decision.original);
    sink.record(&record);
    Some(record)
}

#[cfg(test)]
mod tests {
    use spawn_director_core::{
        Archetype, EnemyHandle, GroupId, SpawnSide, SpawnTask, Stage,
    };

    use super::*;

    #[derive(Default)]
    struct RecordingPool {
        next: u32,
        capacity: u32,
        initialized: Vec<(EnemyHandle, EnemyInit)>,
    }

    impl EnemyPool for RecordingPool {
        fn acquire(&mut self) -> Option<EnemyHandle> {
            if self.next >= self.capacity {
                return None;
            }
            self.next += 1;
            Some(EnemyHandle::new(self.next - 1))
        }

        fn release(&mut self, _handle: EnemyHandle) {}

        fn initialize(&mut self, handle: EnemyHandle, init: &EnemyInit) {
            self.initialized.push((handle, *init));
        }
    }

    fn decision(archetype: Archetype, escort: EscortLink) -> SpawnDecision {
        let mut task = SpawnTask::single(archetype, 0.0);
        task.options.escort = escort;
        let mut decision = SpawnDecision::from_task(&task);
        decision.side = Some(SpawnSide::Right);
        decision
    }

    #[test]
    fn escorts_inherit_their_commander_handle() {
        let config = DirectorConfig::default();
        let mut state = DirectorState::new(&config, Stage::new(8), 0);
        let mut pool = RecordingPool {
            capacity: 4,
            ..RecordingPool::default()
        };
        let mut sink = Vec::new();
        let group = GroupId::new(3);
        let leader = decision(Archetype::Warlord, EscortLink::Commander(group));
        let escort = decision(Archetype::Grunt, EscortLink::Escort(group));

        let _ = execute(&mut state, &config, &leader, Vec2::new(450.0, 0.0), &mut pool, &mut sink);
        let _ = execute(&mut state, &config, &escort, Vec2::new(450.0, 60.0), &mut pool, &mut sink);

        assert_eq!(pool.initialized[1].1.leader, Some(EnemyHandle::new(0)));
        assert_eq!(state.commander(group), Some(EnemyHandle::new(0)));
        assert_eq!(sink.len(), 2);
        assert!(state.cooldowns.is_active(Archetype::Warlord));
        assert!(!state.cooldowns.is_active(Archetype::Grunt));
    }

    #[test]
    fn exhausted_pool_leaves_state_untouched() {
        let config = DirectorConfig::default();
        let mut state = DirectorState::new(&config, Stage::new(2), 0);
        let budget = state.budget_remaining();
        let mut pool = RecordingPool::default();
        let record = execute(
            &mut state,
            &config,
            &decision(Archetype::Dasher, EscortLink::None),
            Vec2::new(450.0, 0.0),
            &mut pool,
            &mut (),
        );
        assert!(record.is_none());
        assert_eq!(state.budget_remaining(), budget);
        assert_eq!(state.lifetime().total(), 0);
        assert!(state.spacing().is_empty());
    }

    #[test]
    fn stat_multipliers_scale_with_stage() {
        let config = DirectorConfig::default();
        let mut state = DirectorState::new(&config, Stage::new(6), 0);
        let mut pool = RecordingPool {
            capacity: 1,
            ..RecordingPool::default()
        };
        let _ = execute(
            &mut state,
            &config,
            &decision(Archetype::Grunt, EscortLink::None),
            Vec2::new(450.0, 0.0),
            &mut pool,
            &mut (),
        );
        let init = pool.initialized[0].1;
        assert!((init.hp_multiplier - 1.6).abs() < 1e-5);
        assert!((init.speed_multiplier - 1.2).abs() < 1e-5);
        assert!((init.lifespan - 40.0).abs() < f32::EPSILON);
        assert_eq!(state.stats.total, 1);
    }
}
