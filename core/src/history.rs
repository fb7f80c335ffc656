//! Fixed-capacity ring buffer that evicts its oldest entry when full.

use std::collections::VecDeque;

/// Bounded history of recent values, oldest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy + PartialEq> History<T> {
    /// Creates an empty history holding at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a value, evicting the oldest entry when the buffer is full.
    pub fn push(&mut self, value: T) {
        if self.entries.len() == self.capacity {
            let _ = self.entries.pop_front();
        }
        self.entries.push_back(value);
    }

    /// Most recently pushed value.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.entries.back().copied()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the history holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates stored entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = T> + '_ {
        self.entries.iter().copied()
    }

    /// Iterates the newest `count` entries, newest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = T> + '_ {
        self.entries.iter().rev().take(count).copied()
    }

    /// Occurrences of `value` across the whole buffer.
    #[must_use]
    pub fn count(&self, value: T) -> usize {
        self.entries.iter().filter(|entry| **entry == value).count()
    }

    /// Occurrences of `value` among the newest `window` entries.
    #[must_use]
    pub fn count_recent(&self, value: T, window: usize) -> usize {
        self.recent(window).filter(|entry| *entry == value).count()
    }

    /// Fraction of the buffer equal to `value`; zero when empty.
    #[must_use]
    pub fn share(&self, value: T) -> f32 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.count(value) as f32 / self.entries.len() as f32
    }

    /// Number of newest entries in an unbroken run equal to `value`.
    #[must_use]
    pub fn trailing_run(&self, value: T) -> usize {
        self.entries
            .iter()
            .rev()
            .take_while(|entry| **entry == value)
            .count()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
