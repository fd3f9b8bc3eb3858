use std::collections::{BTreeSet, VecDeque};

use gridmind_engine::Position;

/// Two-tier record of where the agent has been.
///
/// The short-term tier is a bounded FIFO of recent cells and is what the
/// candidate enumerator filters against; entries age out as new cells are
/// recorded, and the enumerator may evict early when the agent is boxed in.
/// The long-term tier keeps every cell visited this episode and only feeds
/// the novelty reward term. It is never evicted, only [`reset`] between
/// episodes.
///
/// [`reset`]: RouteMemory::reset
#[derive(Debug, Clone)]
pub struct RouteMemory {
    short: VecDeque<Position>,
    capacity: usize,
    long: BTreeSet<Position>,
}

impl RouteMemory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            short: VecDeque::with_capacity(capacity),
            capacity,
            long: BTreeSet::new(),
        }
    }

    /// Records a visited cell in both tiers, aging out the oldest short-term
    /// entry if the FIFO is full.
    pub fn record(&mut self, pos: Position) {
        if self.short.len() == self.capacity {
            self.short.pop_front();
        }
        self.short.push_back(pos);
        self.long.insert(pos);
    }

    /// Whether `pos` is in the short-term FIFO.
    #[must_use]
    pub fn contains_recent(&self, pos: Position) -> bool {
        self.short.contains(&pos)
    }

    /// Whether `pos` has been visited at any point this episode.
    #[must_use]
    pub fn was_visited(&self, pos: Position) -> bool {
        self.long.contains(&pos)
    }

    /// Drops the oldest short-term entry. Returns it, or `None` if the FIFO
    /// is already empty.
    pub fn evict_oldest(&mut self) -> Option<Position> {
        self.short.pop_front()
    }

    #[must_use]
    pub fn recent_len(&self) -> usize {
        self.short.len()
    }

    #[must_use]
    pub fn visited_len(&self) -> usize {
        self.long.len()
    }

    /// Clears both tiers for a fresh episode.
    pub fn reset(&mut self) {
        self.short.clear();
        self.long.clear();
    }
}
