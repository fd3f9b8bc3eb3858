pub use self::{world::*, world_config::*};

pub(crate) mod world;
pub(crate) mod world_config;
