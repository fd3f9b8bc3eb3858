pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, derive_more::Display, derive_more::Error)]
#[display("illegal move to ({}, {}): {reason}", target.x, target.y)]
pub struct IllegalMoveError {
    pub target: Position,
    pub reason: IllegalMoveReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum IllegalMoveReason {
    #[display("destination is outside the board")]
    OutOfBounds,
    #[display("destination is an obstacle cell")]
    Obstacle,
    #[display("destination is not reachable in one step")]
    NotAdjacent,
}
