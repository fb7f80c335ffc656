use std::collections::VecDeque;

use spawn_director_core::{Archetype, DensityTuning, SpawnTask};
use spawn_director_system_placement::SpacingHistory;
use tracing::warn;

/// Task that could not be placed or materialised immediately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingTask {
    /// Deferred task.
    pub task: SpawnTask,
    /// Seconds until the task may be retried.
    pub retry_in: f32,
    /// Whether spacing and position rules still apply to the task.
    pub spacing_enforced: bool,
}

/// Secondary FIFO that throttles deferred tasks and force-flushes its backlog.
#[derive(Clone, Debug)]
pub struct DensityController {
    tuning: DensityTuning,
    backlog: VecDeque<PendingTask>,
}

impl DensityController {
    /// Creates an empty controller.
    #[must_use]
    pub fn new(tuning: DensityTuning) -> Self {
        Self {
            tuning,
            backlog: VecDeque::new(),
        }
    }

    /// Defers a task for the configured retry delay.
    pub fn defer(&mut self, task: SpawnTask, spacing_enforced: bool) {
        self.enqueue(task, self.tuning.retry_delay, spacing_enforced);
    }

    /// Appends a task that becomes eligible after `retry_in` seconds.
    pub fn enqueue(&mut self, task: SpawnTask, retry_in: f32, spacing_enforced: bool) {
        self.backlog.push_back(PendingTask {
            task,
            retry_in,
            spacing_enforced,
        });
    }

    /// Runs one controller tick and returns how many entries were force-flushed.
    ///
    /// Spacing entries older than `spacing_window` are pruned first. A backlog
    /// above the threshold flushes its oldest excess entries with spacing
    /// disabled and capacity-gated archetypes replaced by the baseline;
    /// otherwise up to the per-tick release count of due entries, and never
    /// more than `room`, leave in FIFO order.
    pub fn handle(
        &mut self,
        dt: f32,
        now: f32,
        spacing_window: f32,
        spacing: &mut SpacingHistory,
        room: usize,
        out: &mut Vec<PendingTask>,
    ) -> usize {
        spacing.prune(now, spacing_window);
        for pending in &mut self.backlog {
            pending.retry_in = (pending.retry_in - dt).max(0.0);
        }

        let threshold = self.tuning.backlog_threshold;
        if self.backlog.len() > threshold {
            let excess = self.backlog.len() - threshold;
            for mut pending in self.backlog.drain(..excess) {
                if pending.task.archetype.is_capacity_gated() {
                    pending.task.archetype = Archetype::BASELINE;
                }
                pending.spacing_enforced = false;
                pending.retry_in = 0.0;
                out.push(pending);
            }
            warn!(
                flushed = excess,
                backlog = self.backlog.len(),
                threshold,
                "density backlog force-flushed"
            );
            return excess;
        }

        let limit = self.tuning.release_per_tick.min(room);
        let mut released = 0;
        let mut index = 0;
        while index < self.backlog.len() && released < limit {
            if self.backlog[index].retry_in <= 0.0 {
                if let Some(pending) = self.backlog.remove(index) {
                    out.push(pending);
                    released += 1;
                }
            } else {
                index += 1;
            }
        }
        0
    }

    /// Deferred entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PendingTask> {
        self.backlog.iter()
    }

    /// Number of deferred entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backlog.len()
    }

    /// Reports whether nothing is deferred.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backlog.is_empty()
    }

    /// Drops every deferred entry.
    pub fn clear(&mut self) {
        self.backlog.clear();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn controller() -> DensityController {
        DensityController::new(DensityTuning::default())
    }

    #[test]
    fn safety_valve_flushes_exact_excess() {
        let mut density = controller();
        let mut spacing = SpacingHistory::new();
        for index in 0..25 {
            let archetype = if index % 2 == 0 {
                Archetype::Juggernaut
            } else {
                Archetype::Dasher
            };
            density.defer(SpawnTask::single(archetype, 0.0), true);
        }
        let mut out = Vec::new();
        let flushed = density.handle(0.016, 1.0, 3.0, &mut spacing, 0, &mut out);
        assert_eq!(flushed, 5);
        assert_eq!(out.len(), 5);
        assert_eq!(density.len(), 20);
        assert!(out.iter().all(|pending| !pending.spacing_enforced));
        assert!(out
            .iter()
            .all(|pending| !pending.task.archetype.is_capacity_gated()));
        assert_eq!(out[0].task.archetype, Archetype::BASELINE);
        assert_eq!(out[1].task.archetype, Archetype::Dasher);
    }

    #[test]
    fn releases_due_entries_at_the_tick_rate() {
        let mut density = controller();
        let mut spacing = SpacingHistory::new();
        for _ in 0..5 {
            density.defer(SpawnTask::single(Archetype::Swarmer, 0.0), true);
        }
        let mut out = Vec::new();
        assert_eq!(density.handle(0.5, 1.0, 3.0, &mut spacing, 10, &mut out), 0);
        assert!(out.is_empty());
        assert_eq!(density.handle(0.5, 1.5, 3.0, &mut spacing, 10, &mut out), 0);
        assert_eq!(out.len(), 2);
        assert_eq!(density.len(), 3);
        out.clear();
        assert_eq!(density.handle(0.5, 2.0, 3.0, &mut spacing, 1, &mut out), 0);
        assert_eq!(out.len(), 1);
        out.clear();
        assert_eq!(density.handle(0.5, 2.5, 3.0, &mut spacing, 0, &mut out), 0);
        assert!(out.is_empty());
        assert_eq!(density.len(), 2);
    }

    #[test]
    fn prunes_spacing_history() {
        let mut density = controller();
        let mut spacing = SpacingHistory::new();
        spacing.push(0.0, Vec2::ZERO);
        let mut out = Vec::new();
        let _ = density.handle(0.1, 5.0, 3.0, &mut spacing, 2, &mut out);
        assert!(spacing.is_empty());
    }
}
