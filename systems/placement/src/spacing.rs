use glam::Vec2;

/// Recent spawn points kept for minimum-separation checks.
#[derive(Clone, Debug, Default)]
pub struct SpacingHistory {
    stamps: Vec<f32>,
    points: Vec<Vec2>,
}

impl SpacingHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a spawn point at game time `now`.
    pub fn push(&mut self, now: f32, point: Vec2) {
        self.stamps.push(now);
        self.points.push(point);
    }

    /// Drops every point recorded more than `window` seconds before `now`.
    pub fn prune(&mut self, now: f32, window: f32) {
        let cutoff = now - window;
        let stale = self.stamps.iter().take_while(|stamp| **stamp < cutoff).count();
        if stale > 0 {
            let _ = self.stamps.drain(..stale);
            let _ = self.points.drain(..stale);
        }
    }

    /// Reports whether `point` keeps at least `radius` from every recorded point.
    #[must_use]
    pub fn is_clear(&self, point: Vec2, radius: f32) -> bool {
        let limit = radius * radius;
        self.points
            .iter()
            .all(|recorded| recorded.distance_squared(point) >= limit)
    }

    /// Recorded points, oldest first.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Number of recorded points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether no points are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drops every point.
    pub fn clear(&mut self) {
        self.stamps.clear();
        self.points.clear();
    }
}
