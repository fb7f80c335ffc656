//! Minimal host used by the integration tests: an arena pool whose enemies
//! leave after a fixed fraction of their lifespan.

#![allow(dead_code)]

use glam::Vec2;
pub use spawn_director_core::ArenaPool as Arena;
use spawn_director_core::{SpawnRecord, Stage, WorldView};
use spawn_director_system_director::Director;

pub const DT: f32 = 1.0 / 30.0;

/// Advances `director` and the host by one step, appending new spawns to `records`.
pub fn step(director: &mut Director, arena: &mut Arena, stage: Stage, records: &mut Vec<SpawnRecord>) {
    let population = arena.snapshot();
    let world = WorldView {
        elapsed: director.state().stage_time(),
        player_position: Vec2::ZERO,
        stage,
        population: &population,
    };
    director.update(DT, &world, arena, records);
    arena.advance(DT);
}

/// Runs one stage for `seconds` and returns every spawn record.
pub fn run(director: &mut Director, stage: Stage, seconds: f32) -> Vec<SpawnRecord> {
    let mut arena = Arena::new(64).with_lifespan_scale(0.3);
    let mut records = Vec::new();
    let steps = (seconds / DT).round() as usize;
    for _ in 0..steps {
        step(director, &mut arena, stage, &mut records);
    }
    records
}
