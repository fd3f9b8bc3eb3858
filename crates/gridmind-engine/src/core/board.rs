use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::position::Position;

/// Static board geometry: a square grid plus a set of obstacle cells.
///
/// The board never changes during an episode; dynamic entities (agent, goal,
/// adversaries) live in [`GridWorld`](crate::engine::GridWorld). Obstacles are
/// kept in a `BTreeSet` so iteration order is deterministic, which downstream
/// state encoding relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: u8,
    obstacles: BTreeSet<Position>,
}

impl Board {
    #[must_use]
    pub fn new(rows: u8, obstacles: BTreeSet<Position>) -> Self {
        Self { rows, obstacles }
    }

    /// Side length of the square grid.
    #[must_use]
    pub const fn rows(&self) -> u8 {
        self.rows
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        usize::from(self.rows) * usize::from(self.rows)
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.rows && pos.y < self.rows
    }

    #[must_use]
    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.obstacles.contains(&pos)
    }

    /// Whether the cell is inside the board and not an obstacle.
    #[must_use]
    pub fn is_open(&self, pos: Position) -> bool {
        self.contains(pos) && !self.is_obstacle(pos)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = Position> + '_ {
        self.obstacles.iter().copied()
    }

    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }
}
