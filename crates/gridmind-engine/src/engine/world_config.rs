use std::{collections::BTreeSet, fmt::Write as _};

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{Board, Position};

/// Immutable board configuration, read once at episode start.
///
/// Typically loaded from a JSON file. The configuration must pass
/// [`WorldConfig::validate`] before a world is built from it; validation
/// enforces the data-model invariants (agent never on an obstacle, goal and
/// obstacles never overlapping, everything in bounds).
///
/// # Example
///
/// ```
/// use gridmind_engine::{Position, WorldConfig};
///
/// let config: WorldConfig = serde_json::from_str(
///     r#"{
///         "rows": 5,
///         "agent": { "x": 0, "y": 0 },
///         "goal": { "x": 4, "y": 4 },
///         "obstacles": [{ "x": 2, "y": 2 }]
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(config.goal, Position::new(4, 4));
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Side length of the square grid.
    pub rows: u8,
    /// Initial agent position.
    pub agent: Position,
    /// Initial goal position.
    pub goal: Position,
    /// Static obstacle cells.
    #[serde(default)]
    pub obstacles: Vec<Position>,
    /// Initial adversary positions. May be empty.
    #[serde(default)]
    pub adversaries: Vec<Position>,
    /// Seed for goal respawn. `None` draws a random seed at world creation.
    #[serde(default)]
    pub seed: Option<WorldSeed>,
}

impl WorldConfig {
    /// Checks the configuration against the world invariants.
    pub fn validate(&self) -> Result<(), WorldConfigError> {
        if self.rows < MIN_ROWS {
            return Err(WorldConfigError::RowsTooSmall { rows: self.rows });
        }
        let board = self.board();
        for &pos in [&self.agent, &self.goal]
            .into_iter()
            .chain(&self.obstacles)
            .chain(&self.adversaries)
        {
            if !board.contains(pos) {
                return Err(WorldConfigError::PositionOutOfBounds { position: pos });
            }
        }
        if board.is_obstacle(self.agent) {
            return Err(WorldConfigError::AgentOnObstacle { position: self.agent });
        }
        if board.is_obstacle(self.goal) {
            return Err(WorldConfigError::GoalOnObstacle { position: self.goal });
        }
        if self.agent == self.goal {
            return Err(WorldConfigError::GoalOnAgent { position: self.goal });
        }
        if self.adversaries.contains(&self.agent) {
            return Err(WorldConfigError::AdversaryOnAgent { position: self.agent });
        }
        Ok(())
    }

    #[must_use]
    pub fn board(&self) -> Board {
        let obstacles: BTreeSet<Position> = self.obstacles.iter().copied().collect();
        Board::new(self.rows, obstacles)
    }
}

const MIN_ROWS: u8 = 3;

#[derive(Debug, Clone, Copy, derive_more::Display, derive_more::Error)]
pub enum WorldConfigError {
    #[display("grid of {rows} rows is too small (minimum {MIN_ROWS})")]
    RowsTooSmall { rows: u8 },
    #[display("position ({}, {}) is outside the board", position.x, position.y)]
    PositionOutOfBounds { position: Position },
    #[display("agent starts on an obstacle cell ({}, {})", position.x, position.y)]
    AgentOnObstacle { position: Position },
    #[display("goal overlaps an obstacle cell ({}, {})", position.x, position.y)]
    GoalOnObstacle { position: Position },
    #[display("goal coincides with the agent start ({}, {})", position.x, position.y)]
    GoalOnAgent { position: Position },
    #[display("adversary starts on the agent cell ({}, {})", position.x, position.y)]
    AdversaryOnAgent { position: Position },
}

/// 128-bit seed for the world's random number generator.
///
/// Serialized as a 32-character hex string. The same seed produces the same
/// goal respawn sequence, enabling reproducible episodes and deterministic
/// test fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldSeed(pub(crate) [u8; 16]);

impl WorldSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl Serialize for WorldSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for WorldSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<WorldSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> WorldSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        WorldSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> WorldConfig {
        WorldConfig {
            rows: 5,
            agent: Position::new(0, 0),
            goal: Position::new(4, 4),
            obstacles: vec![],
            adversaries: vec![],
            seed: None,
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn accepts_well_formed_config() {
            base_config().validate().unwrap();
        }

        #[test]
        fn rejects_tiny_grid() {
            let config = WorldConfig {
                rows: 2,
                ..base_config()
            };
            assert!(matches!(
                config.validate(),
                Err(WorldConfigError::RowsTooSmall { rows: 2 })
            ));
        }

        #[test]
        fn rejects_out_of_bounds_entities() {
            let config = WorldConfig {
                adversaries: vec![Position::new(5, 0)],
                ..base_config()
            };
            assert!(matches!(
                config.validate(),
                Err(WorldConfigError::PositionOutOfBounds { .. })
            ));
        }

        #[test]
        fn rejects_agent_on_obstacle() {
            let config = WorldConfig {
                obstacles: vec![Position::new(0, 0)],
                ..base_config()
            };
            assert!(matches!(
                config.validate(),
                Err(WorldConfigError::AgentOnObstacle { .. })
            ));
        }

        #[test]
        fn rejects_goal_on_obstacle() {
            let config = WorldConfig {
                obstacles: vec![Position::new(4, 4)],
                ..base_config()
            };
            assert!(matches!(
                config.validate(),
                Err(WorldConfigError::GoalOnObstacle { .. })
            ));
        }

        #[test]
        fn rejects_goal_on_agent_start() {
            let config = WorldConfig {
                goal: Position::new(0, 0),
                ..base_config()
            };
            assert!(matches!(
                config.validate(),
                Err(WorldConfigError::GoalOnAgent { .. })
            ));
        }
    }

    mod seed_serialization {
        use super::*;

        #[test]
        fn roundtrip_random_seed() {
            let seed: WorldSeed = rand::rng().random();
            let serialized = serde_json::to_string(&seed).unwrap();
            let deserialized: WorldSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(seed, deserialized);
        }

        #[test]
        fn format_is_32_char_hex() {
            let seed = WorldSeed::from_bytes([0u8; 16]);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"00000000000000000000000000000000\"");
        }

        #[test]
        fn byte_order_is_big_endian() {
            let seed = WorldSeed::from_bytes([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76,
                0x54, 0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
        }

        #[test]
        fn rejects_wrong_length() {
            let result: Result<WorldSeed, _> = serde_json::from_str("\"0123\"");
            assert!(result.unwrap_err().to_string().contains("invalid hex"));
        }

        #[test]
        fn rejects_non_hex() {
            let json = "\"ghijklmnopqrstuvwxyzghijklmnopqr\"";
            let result: Result<WorldSeed, _> = serde_json::from_str(json);
            assert!(result.unwrap_err().to_string().contains("invalid hex"));
        }
    }
}
