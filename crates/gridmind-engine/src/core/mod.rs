pub use self::{board::*, position::*};

pub(crate) mod board;
pub(crate) mod position;
