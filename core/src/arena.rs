//! Arena-backed [`EnemyPool`] for headless hosts.

use crate::{Archetype, EnemyHandle, EnemyInit, EnemyPool, PopulationSnapshot};

#[derive(Clone, Copy, Debug)]
struct Slot {
    archetype: Archetype,
    remaining: f32,
}

/// Fixed-capacity enemy arena with a free list.
///
/// Enemies leave on their own once `lifespan * lifespan_scale` seconds have
/// been consumed by [`ArenaPool::advance`].
#[derive(Clone, Debug)]
pub struct ArenaPool {
    slots: Vec<Option<Slot>>,
    free: Vec<u32>,
    limit: usize,
    lifespan_scale: f32,
}

impl ArenaPool {
    /// Creates an arena holding at most `limit` live enemies.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            slots: Vec::with_capacity(limit),
            free: Vec::new(),
            limit,
            lifespan_scale: 1.0,
        }
    }

    /// Scales every lifespan written by [`EnemyPool::initialize`].
    #[must_use]
    pub fn with_lifespan_scale(mut self, scale: f32) -> Self {
        self.lifespan_scale = scale;
        self
    }

    /// Live-enemy counts for the coming tick.
    #[must_use]
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot::from_alive(self.slots.iter().flatten().map(|slot| slot.archetype))
    }

    /// Live enemies.
    #[must_use]
    pub fn live(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Ages every live enemy by `dt` and releases those whose time is up.
    pub fn advance(&mut self, dt: f32) {
        let mut expired = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(enemy) = slot {
                enemy.remaining -= dt;
                if enemy.remaining <= 0.0 {
                    expired.push(EnemyHandle::new(index as u32));
                }
            }
        }
        for handle in expired {
            self.release(handle);
        }
    }
}

impl EnemyPool for ArenaPool {
    fn acquire(&mut self) -> Option<EnemyHandle> {
        if let Some(index) = self.free.pop() {
            return Some(EnemyHandle::new(index));
        }
        if self.slots.len() >= self.limit {
            return None;
        }
        self.slots.push(None);
        Some(EnemyHandle::new(self.slots.len() as u32 - 1))
    }

    fn release(&mut self, handle: EnemyHandle) {
        if let Some(slot) = self.slots.get_mut(handle.get() as usize) {
            if slot.take().is_some() {
                self.free.push(handle.get());
            }
        }
    }

    fn initialize(&mut self, handle: EnemyHandle, init: &EnemyInit) {
        if let Some(slot) = self.slots.get_mut(handle.get() as usize) {
            *slot = Some(Slot {
                archetype: init.archetype,
                remaining: init.lifespan * self.lifespan_scale,
            });
        }
    }
}
