use gridmind_engine::{GridWorld, Position};

/// Dense multi-channel encoding of a world state.
///
/// The layout is channel-major: channel 0 marks the agent cell, channel 1 the
/// obstacles, channel 2 the goal, and channels `3..` hold one adversary each.
/// Every cell is `0.0` or `1.0`. Two observations of the same state compare
/// bit-identically, so encoding is usable as a map key upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    rows: u8,
    adversary_channels: usize,
    data: Vec<f32>,
}

impl Observation {
    /// Encodes the world as seen right now.
    #[must_use]
    pub fn encode(world: &GridWorld) -> Self {
        Self::encode_with_agent(world, world.agent())
    }

    /// Encodes the world as it would look with the agent standing on
    /// `agent`. Candidate actions are observed this way: the agent channel
    /// marks the destination cell while everything else stays put.
    #[must_use]
    pub fn encode_with_agent(world: &GridWorld, agent: Position) -> Self {
        let rows = world.board().rows();
        let adversary_channels = world.adversaries().len();
        let channels = FIXED_CHANNELS + adversary_channels;
        let mut observation = Self {
            rows,
            adversary_channels,
            data: vec![0.0; channels * usize::from(rows) * usize::from(rows)],
        };
        observation.mark(CH_AGENT, agent);
        for obstacle in world.board().obstacles() {
            observation.mark(CH_OBSTACLES, obstacle);
        }
        observation.mark(CH_GOAL, world.goal());
        for (i, &adversary) in world.adversaries().iter().enumerate() {
            observation.mark(FIXED_CHANNELS + i, adversary);
        }
        observation
    }

    #[must_use]
    pub const fn rows(&self) -> u8 {
        self.rows
    }

    /// Total channel count, including one channel per adversary.
    #[must_use]
    pub const fn channels(&self) -> usize {
        FIXED_CHANNELS + self.adversary_channels
    }

    #[must_use]
    pub fn get(&self, channel: usize, pos: Position) -> f32 {
        self.data[self.index(channel, pos)]
    }

    /// Flat channel-major view of the encoding.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn mark(&mut self, channel: usize, pos: Position) {
        let index = self.index(channel, pos);
        self.data[index] = 1.0;
    }

    fn index(&self, channel: usize, pos: Position) -> usize {
        let rows = usize::from(self.rows);
        channel * rows * rows + usize::from(pos.y) * rows + usize::from(pos.x)
    }
}

pub const CH_AGENT: usize = 0;
pub const CH_OBSTACLES: usize = 1;
pub const CH_GOAL: usize = 2;
const FIXED_CHANNELS: usize = 3;

#[cfg(test)]
mod tests {
    use gridmind_engine::{WorldConfig, WorldSeed};

    use super::*;

    fn world() -> GridWorld {
        let config = WorldConfig {
            rows: 4,
            agent: Position::new(0, 0),
            goal: Position::new(3, 3),
            obstacles: vec![Position::new(1, 1)],
            adversaries: vec![Position::new(3, 0), Position::new(0, 3)],
            seed: Some(WorldSeed::from_bytes([3; 16])),
        };
        GridWorld::from_config(&config).unwrap()
    }

    #[test]
    fn channels_mark_their_entities() {
        let world = world();
        let obs = Observation::encode(&world);
        assert_eq!(obs.channels(), 5);
        assert_eq!(obs.get(CH_AGENT, Position::new(0, 0)), 1.0);
        assert_eq!(obs.get(CH_OBSTACLES, Position::new(1, 1)), 1.0);
        assert_eq!(obs.get(CH_GOAL, Position::new(3, 3)), 1.0);
        assert_eq!(obs.get(3, Position::new(3, 0)), 1.0);
        assert_eq!(obs.get(4, Position::new(0, 3)), 1.0);
        assert_eq!(obs.get(CH_AGENT, Position::new(1, 0)), 0.0);
    }

    #[test]
    fn encoding_is_deterministic() {
        let world = world();
        assert_eq!(Observation::encode(&world), Observation::encode(&world));
    }

    #[test]
    fn candidate_encoding_moves_only_the_agent_channel() {
        let world = world();
        let here = Observation::encode(&world);
        let there = Observation::encode_with_agent(&world, Position::new(1, 0));
        assert_eq!(there.get(CH_AGENT, Position::new(1, 0)), 1.0);
        assert_eq!(there.get(CH_AGENT, Position::new(0, 0)), 0.0);
        let rows = usize::from(here.rows()) * usize::from(here.rows());
        assert_eq!(here.as_slice()[rows..], there.as_slice()[rows..]);
    }

    #[test]
    fn flat_layout_is_channel_major() {
        let world = world();
        let obs = Observation::encode(&world);
        // Obstacle (1, 1) on a 4-row board: channel 1, offset 1 * 4 + 1.
        assert_eq!(obs.as_slice()[16 + 5], 1.0);
    }
}
