use std::sync::mpsc;

use gridmind_engine::{GridWorld, Position, WorldSnapshot};
use serde::{Deserialize, Serialize};

use crate::{
    action_enumerator::{ActionEnumerator, EnumeratorConfig},
    policy::Policy,
    reward::{RewardShaper, ShapingConfig},
    route_memory::RouteMemory,
};

/// Episode-level knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    /// Hard cap on ticks before the episode is cut off.
    pub step_limit: usize,
    /// Number of goals to reach before the episode counts as won. A limit
    /// of 1 is a maze run; higher limits play the respawning-goal game.
    pub goal_limit: usize,
    /// Capacity of the short-term route memory FIFO.
    pub short_memory_capacity: usize,
    pub enumerator: EnumeratorConfig,
    pub shaping: ShapingConfig,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            step_limit: 200,
            goal_limit: 1,
            short_memory_capacity: 8,
            enumerator: EnumeratorConfig::default(),
            shaping: ShapingConfig::default(),
        }
    }
}

/// How an episode ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant, Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum EpisodeOutcome {
    /// The goal limit was reached.
    #[display("goal reached")]
    GoalReached,
    /// The agent died: caught by an adversary, or deadlocked with no legal
    /// move left.
    #[display("collided")]
    Collided,
    /// The step limit ran out first.
    #[display("step limit exceeded")]
    StepLimitExceeded,
}

/// Event stream for observers subscribed via [`EpisodeController::subscribe`].
#[derive(Debug, Clone)]
pub enum EpisodeEvent {
    /// State after each completed tick.
    Tick(WorldSnapshot),
    /// Emitted exactly once, after the final tick.
    Finished(EpisodeOutcome),
}

/// One point of the episode trajectory: where the agent stood and the
/// policy's value estimate for moving there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    pub position: Position,
    pub value: f32,
}

/// Summary of a finished episode.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeReport {
    pub outcome: EpisodeOutcome,
    /// Goals consumed.
    pub score: usize,
    /// Ticks executed.
    pub steps: usize,
    /// Sum of the shaped rewards of every applied move.
    pub total_reward: f32,
    /// Ticks that reduced the Manhattan distance to the goal.
    pub closer_steps: usize,
    /// Ticks that increased it.
    pub farther_steps: usize,
    /// The visited cells, opening with the start cell at value `0.0`.
    pub trajectory: Vec<TrajectoryPoint>,
}

/// Drives one episode tick by tick.
///
/// Per tick: enumerate candidates, let the policy choose, score the chosen
/// move, apply it, advance the adversaries, consume the goal if reached, and
/// check termination. Observers receive a [`EpisodeEvent::Tick`] snapshot
/// after every tick and one final [`EpisodeEvent::Finished`].
#[derive(Debug)]
pub struct EpisodeController {
    world: GridWorld,
    memory: RouteMemory,
    enumerator: ActionEnumerator,
    shaper: RewardShaper,
    config: EpisodeConfig,
    observers: Vec<mpsc::Sender<EpisodeEvent>>,
}

impl EpisodeController {
    #[must_use]
    pub fn new(world: GridWorld, config: EpisodeConfig) -> Self {
        Self {
            memory: RouteMemory::new(config.short_memory_capacity),
            enumerator: ActionEnumerator::new(config.enumerator),
            shaper: RewardShaper::new(config.shaping),
            config,
            world,
            observers: Vec::new(),
        }
    }

    /// Registers an observer and returns its receiving end. Disconnected
    /// receivers are silently skipped on later sends.
    pub fn subscribe(&mut self) -> mpsc::Receiver<EpisodeEvent> {
        let (sender, receiver) = mpsc::channel();
        self.observers.push(sender);
        receiver
    }

    /// Runs the episode to termination under `policy`.
    pub fn run(&mut self, policy: &mut dyn Policy) -> EpisodeReport {
        let start = self.world.agent();
        self.memory.reset();
        self.memory.record(start);
        let mut report = EpisodeReport {
            outcome: EpisodeOutcome::StepLimitExceeded,
            score: 0,
            steps: 0,
            total_reward: 0.0,
            closer_steps: 0,
            farther_steps: 0,
            trajectory: vec![TrajectoryPoint {
                position: start,
                value: 0.0,
            }],
        };
        loop {
            let candidates = match self.enumerator.enumerate(&self.world, &mut self.memory) {
                Ok(candidates) => candidates,
                Err(err) => {
                    tracing::debug!(%err, "episode ends in deadlock");
                    report.outcome = EpisodeOutcome::Collided;
                    break;
                }
            };
            let (index, value) = policy.select_action(&self.world, &self.memory, &candidates);
            let chosen = &candidates[index];
            let terms = self.shaper.terms(&self.world, &self.memory, chosen);
            report.total_reward += self.shaper.score(&terms);

            let goal = self.world.goal();
            let before = self.world.agent().manhattan_distance(goal);
            let after = chosen.destination.manhattan_distance(goal);
            if after < before {
                report.closer_steps += 1;
            } else if after > before {
                report.farther_steps += 1;
            }

            let destination = chosen.destination;
            self.world
                .move_agent_to(destination)
                .expect("enumerated candidates are legal moves");
            self.memory.record(destination);
            report.steps += 1;
            report.trajectory.push(TrajectoryPoint {
                position: destination,
                value: value.to_scalar(),
            });

            self.world.advance_adversaries();
            if self.world.agent_on_goal() {
                self.world.consume_goal();
            }

            self.emit(EpisodeEvent::Tick(self.world.snapshot()));

            if self.world.score() >= self.config.goal_limit {
                report.outcome = EpisodeOutcome::GoalReached;
                break;
            }
            if !self.world.is_alive() {
                report.outcome = EpisodeOutcome::Collided;
                break;
            }
            if report.steps >= self.config.step_limit {
                report.outcome = EpisodeOutcome::StepLimitExceeded;
                break;
            }
        }
        report.score = self.world.score();
        tracing::debug!(
            outcome = %report.outcome,
            score = report.score,
            steps = report.steps,
            "episode finished"
        );
        self.emit(EpisodeEvent::Finished(report.outcome));
        report
    }

    fn emit(&self, event: EpisodeEvent) {
        for observer in &self.observers {
            let _ = observer.send(event.clone());
        }
    }
}
