use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{
    IllegalMoveError, IllegalMoveReason,
    core::{Board, Direction, Position},
    engine::{WorldConfig, WorldConfigError},
};

/// Mutable simulation state for one episode.
///
/// Holds the static [`Board`] plus the dynamic entities: the agent, the
/// current goal, and the adversaries. All mutation goes through
/// [`GridWorld::apply_move`] (or [`GridWorld::move_agent_to`]) and
/// [`GridWorld::advance_adversaries`]; illegal moves are rejected with an
/// error and leave the state untouched.
#[derive(Debug, Clone)]
pub struct GridWorld {
    board: Board,
    agent: Position,
    goal: Position,
    adversaries: Vec<Position>,
    goals_reached: usize,
    rng: Pcg32,
}

impl GridWorld {
    /// Builds a world from a validated configuration.
    pub fn from_config(config: &WorldConfig) -> Result<Self, WorldConfigError> {
        config.validate()?;
        let seed = config
            .seed
            .unwrap_or_else(|| rand::rng().random())
            .0;
        Ok(Self {
            board: config.board(),
            agent: config.agent,
            goal: config.goal,
            adversaries: config.adversaries.clone(),
            goals_reached: 0,
            rng: Pcg32::from_seed(seed),
        })
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn agent(&self) -> Position {
        self.agent
    }

    #[must_use]
    pub fn goal(&self) -> Position {
        self.goal
    }

    #[must_use]
    pub fn adversaries(&self) -> &[Position] {
        &self.adversaries
    }

    /// Number of goals consumed so far.
    #[must_use]
    pub fn score(&self) -> usize {
        self.goals_reached
    }

    /// Moves the agent one cell in `direction`.
    pub fn apply_move(&mut self, direction: Direction) -> Result<(), IllegalMoveError> {
        let target = self.agent.step(direction).ok_or(IllegalMoveError {
            target: self.agent,
            reason: IllegalMoveReason::OutOfBounds,
        })?;
        self.move_agent_to(target)
    }

    /// Moves the agent to `target`, which must be the current cell or one of
    /// its cardinal neighbors. On error the agent does not move.
    pub fn move_agent_to(&mut self, target: Position) -> Result<(), IllegalMoveError> {
        if !self.agent.is_step_reachable(target) {
            return Err(IllegalMoveError {
                target,
                reason: IllegalMoveReason::NotAdjacent,
            });
        }
        if !self.board.contains(target) {
            return Err(IllegalMoveError {
                target,
                reason: IllegalMoveReason::OutOfBounds,
            });
        }
        if self.board.is_obstacle(target) {
            return Err(IllegalMoveError {
                target,
                reason: IllegalMoveReason::Obstacle,
            });
        }
        self.agent = target;
        Ok(())
    }

    /// Whether the agent occupies a survivable cell: in bounds, not on an
    /// obstacle, and not caught by an adversary.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.board.is_open(self.agent) && !self.adversaries.contains(&self.agent)
    }

    #[must_use]
    pub fn agent_on_goal(&self) -> bool {
        self.agent == self.goal
    }

    /// Consumes the current goal and respawns a new one on a free cell.
    ///
    /// If the board has no free cell left the goal stays where it is; the
    /// episode controller terminates such worlds through its goal limit.
    pub fn consume_goal(&mut self) {
        self.goals_reached += 1;
        let rows = self.board.rows();
        let is_free = |pos: Position| {
            pos != self.agent && self.board.is_open(pos) && !self.adversaries.contains(&pos)
        };
        let has_free = (0..rows)
            .flat_map(|y| (0..rows).map(move |x| Position::new(x, y)))
            .any(is_free);
        if !has_free {
            return;
        }
        loop {
            let candidate = Position::new(
                self.rng.random_range(0..rows),
                self.rng.random_range(0..rows),
            );
            if candidate != self.agent
                && !self.board.is_obstacle(candidate)
                && !self.adversaries.contains(&candidate)
            {
                self.goal = candidate;
                return;
            }
        }
    }

    /// Where the adversaries would stand after one chase step toward
    /// `target`. Pure: does not mutate the world, so reward shaping can
    /// score candidate cells against the post-move adversary positions.
    #[must_use]
    pub fn predicted_adversaries(&self, target: Position) -> Vec<Position> {
        self.adversaries
            .iter()
            .map(|&adv| self.chase_step(adv, target))
            .collect()
    }

    /// Advances every adversary one chase step toward the agent.
    pub fn advance_adversaries(&mut self) {
        self.adversaries = self.predicted_adversaries(self.agent);
    }

    /// One-step greedy chase: close the larger axis gap first, fall back to
    /// the smaller one, stay put when both steps are blocked.
    fn chase_step(&self, adversary: Position, target: Position) -> Position {
        let dx = i16::from(target.x) - i16::from(adversary.x);
        let dy = i16::from(target.y) - i16::from(adversary.y);
        let horizontal = match dx.signum() {
            1 => Some(Direction::Right),
            -1 => Some(Direction::Left),
            _ => None,
        };
        let vertical = match dy.signum() {
            1 => Some(Direction::Down),
            -1 => Some(Direction::Up),
            _ => None,
        };
        let preference = if dx.abs() >= dy.abs() {
            [horizontal, vertical]
        } else {
            [vertical, horizontal]
        };
        preference
            .into_iter()
            .flatten()
            .filter_map(|dir| adversary.step(dir))
            .find(|&next| self.board.is_open(next))
            .unwrap_or(adversary)
    }

    /// A serializable copy of the current state, for trace output.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            rows: self.board.rows(),
            agent: self.agent,
            goal: self.goal,
            adversaries: self.adversaries.clone(),
            obstacles: self.board.obstacles().collect(),
            score: self.goals_reached,
        }
    }
}

/// Point-in-time view of a [`GridWorld`], emitted to episode observers.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub rows: u8,
    pub agent: Position,
    pub goal: Position,
    pub adversaries: Vec<Position>,
    pub obstacles: Vec<Position>,
    pub score: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::WorldSeed;

    fn world(config: WorldConfig) -> GridWorld {
        GridWorld::from_config(&config).unwrap()
    }

    fn base_config() -> WorldConfig {
        WorldConfig {
            rows: 5,
            agent: Position::new(0, 0),
            goal: Position::new(4, 4),
            obstacles: vec![],
            adversaries: vec![],
            seed: Some(WorldSeed::from_bytes([7; 16])),
        }
    }

    mod movement {
        use super::*;

        #[test]
        fn legal_move_relocates_agent() {
            let mut world = world(base_config());
            world.apply_move(Direction::Right).unwrap();
            assert_eq!(world.agent(), Position::new(1, 0));
        }

        #[test]
        fn out_of_bounds_move_is_rejected_without_mutation() {
            let mut world = world(base_config());
            let err = world.apply_move(Direction::Up).unwrap_err();
            assert_eq!(err.reason, IllegalMoveReason::OutOfBounds);
            assert_eq!(world.agent(), Position::new(0, 0));
        }

        #[test]
        fn obstacle_move_is_rejected_without_mutation() {
            let mut world = world(WorldConfig {
                obstacles: vec![Position::new(1, 0)],
                ..base_config()
            });
            let err = world.apply_move(Direction::Right).unwrap_err();
            assert_eq!(err.reason, IllegalMoveReason::Obstacle);
            assert_eq!(world.agent(), Position::new(0, 0));
        }

        #[test]
        fn teleport_is_rejected() {
            let mut world = world(base_config());
            let err = world.move_agent_to(Position::new(3, 3)).unwrap_err();
            assert_eq!(err.reason, IllegalMoveReason::NotAdjacent);
        }

        #[test]
        fn stay_in_place_is_legal() {
            let mut world = world(base_config());
            world.move_agent_to(Position::new(0, 0)).unwrap();
            assert_eq!(world.agent(), Position::new(0, 0));
        }
    }

    mod goals {
        use super::*;

        #[test]
        fn consume_goal_increments_score_and_respawns() {
            let mut world = world(base_config());
            world.consume_goal();
            assert_eq!(world.score(), 1);
            let goal = world.goal();
            assert_ne!(goal, world.agent());
            assert!(world.board().is_open(goal));
        }

        #[test]
        fn respawn_is_deterministic_for_a_seed() {
            let mut a = world(base_config());
            let mut b = world(base_config());
            for _ in 0..5 {
                a.consume_goal();
                b.consume_goal();
                assert_eq!(a.goal(), b.goal());
            }
        }

        #[test]
        fn full_board_keeps_goal_in_place() {
            // Every cell except agent and goal is an obstacle, so the goal
            // has nowhere to respawn.
            let obstacles: Vec<_> = (0..3)
                .flat_map(|y| (0..3).map(move |x| Position::new(x, y)))
                .filter(|&p| p != Position::new(0, 0) && p != Position::new(2, 2))
                .collect();
            let mut world = world(WorldConfig {
                rows: 3,
                agent: Position::new(0, 0),
                goal: Position::new(2, 2),
                obstacles,
                adversaries: vec![],
                seed: Some(WorldSeed::from_bytes([1; 16])),
            });
            world.consume_goal();
            assert_eq!(world.score(), 1);
            assert_eq!(world.goal(), Position::new(2, 2));
        }
    }

    mod adversaries {
        use super::*;

        fn chasing_config() -> WorldConfig {
            WorldConfig {
                adversaries: vec![Position::new(4, 0)],
                ..base_config()
            }
        }

        #[test]
        fn adversary_closes_major_axis_first() {
            let world = world(WorldConfig {
                adversaries: vec![Position::new(4, 2)],
                ..base_config()
            });
            // Agent at (0, 0): dx = -4, dy = -2, so the chase moves left.
            let predicted = world.predicted_adversaries(world.agent());
            assert_eq!(predicted, vec![Position::new(3, 2)]);
        }

        #[test]
        fn blocked_adversary_takes_minor_axis() {
            let world = world(WorldConfig {
                obstacles: vec![Position::new(3, 2)],
                adversaries: vec![Position::new(4, 2)],
                ..base_config()
            });
            let predicted = world.predicted_adversaries(world.agent());
            assert_eq!(predicted, vec![Position::new(4, 1)]);
        }

        #[test]
        fn cornered_adversary_stays_put() {
            let world = world(WorldConfig {
                obstacles: vec![Position::new(3, 0), Position::new(4, 1)],
                adversaries: vec![Position::new(4, 0)],
                ..base_config()
            });
            let predicted = world.predicted_adversaries(world.agent());
            assert_eq!(predicted, vec![Position::new(4, 0)]);
        }

        #[test]
        fn advance_matches_prediction() {
            let mut world = world(chasing_config());
            let predicted = world.predicted_adversaries(world.agent());
            world.advance_adversaries();
            assert_eq!(world.adversaries(), predicted.as_slice());
        }

        #[test]
        fn capture_kills_agent() {
            let mut world = world(WorldConfig {
                adversaries: vec![Position::new(1, 0)],
                ..base_config()
            });
            assert!(world.is_alive());
            world.advance_adversaries();
            assert!(!world.is_alive());
        }
    }

    #[test]
    fn snapshot_reflects_state() {
        let world = world(WorldConfig {
            obstacles: vec![Position::new(2, 2)],
            adversaries: vec![Position::new(4, 0)],
            ..base_config()
        });
        let snapshot = world.snapshot();
        assert_eq!(snapshot.rows, 5);
        assert_eq!(snapshot.agent, Position::new(0, 0));
        assert_eq!(snapshot.goal, Position::new(4, 4));
        assert_eq!(snapshot.adversaries, vec![Position::new(4, 0)]);
        assert_eq!(snapshot.obstacles, vec![Position::new(2, 2)]);
        assert_eq!(snapshot.score, 0);
    }
}
