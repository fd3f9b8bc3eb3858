use serde::{Deserialize, Serialize};

/// A cell coordinate on the grid.
///
/// The origin is the top-left corner; `x` grows rightward and `y` grows
/// downward, so [`Direction::Up`] decreases `y`. Positions are plain copyable
/// values: movement produces a new `Position` rather than mutating in place.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Returns the cell one step in `direction`, or `None` if the step would
    /// leave the coordinate space (upper bounds are checked by the board).
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.offset();
        Some(Self {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }

    /// Manhattan (L1) distance to `other`.
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> u16 {
        u16::from(self.x.abs_diff(other.x)) + u16::from(self.y.abs_diff(other.y))
    }

    /// Euclidean (L2) distance to `other`.
    #[must_use]
    pub fn euclidean_distance(self, other: Self) -> f32 {
        let dx = f32::from(self.x.abs_diff(other.x));
        let dy = f32::from(self.y.abs_diff(other.y));
        dx.hypot(dy)
    }

    /// Whether `other` is reachable from `self` in a single tick: the same
    /// cell (a "stay" action) or one of the four cardinal neighbors.
    #[must_use]
    pub fn is_step_reachable(self, other: Self) -> bool {
        self.manhattan_distance(other) <= 1
    }
}

/// One-cell movement on the grid. No diagonal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    /// Remain on the current cell. Only enumerated when explicitly enabled.
    Stay,
}

impl Direction {
    pub const CARDINAL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    #[must_use]
    pub const fn offset(self) -> (i8, i8) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Stay => (0, 0),
        }
    }
}

/// Distance metric used by reward shaping. One metric is chosen by
/// configuration and applied to every distance term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
}

impl DistanceMetric {
    #[must_use]
    pub fn distance(self, a: Position, b: Position) -> f32 {
        match self {
            Self::Euclidean => a.euclidean_distance(b),
            Self::Manhattan => f32::from(a.manhattan_distance(b)),
        }
    }

    /// The largest distance between two cells of a `rows` x `rows` board,
    /// used to normalize distances into `[0, 1]`.
    #[must_use]
    pub fn span(self, rows: u8) -> f32 {
        let extent = f32::from(rows.saturating_sub(1));
        match self {
            Self::Euclidean => extent * std::f32::consts::SQRT_2,
            Self::Manhattan => extent * 2.0,
        }
    }
}
