use gridmind_engine::{DistanceMetric, GridWorld, Position};
use serde::{Deserialize, Serialize};

use crate::{action_enumerator::CandidateAction, route_memory::RouteMemory};

/// Shaped-reward parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapingConfig {
    /// Reward for a candidate that lands on the goal. Must dominate the
    /// non-terminal terms, whose combined range stays within `[-1.5, 2.0]`.
    pub terminal_bonus: f32,
    /// Penalty applied when the candidate revisits a cell seen earlier in
    /// the episode.
    pub repetition_penalty: f32,
    /// Metric for the closeness and clearance terms.
    pub metric: DistanceMetric,
}

impl Default for ShapingConfig {
    fn default() -> Self {
        Self {
            terminal_bonus: 10.0,
            repetition_penalty: 0.5,
            metric: DistanceMetric::default(),
        }
    }
}

/// Computes shaped rewards for candidate moves.
///
/// All distance terms are normalized by the board's maximum cell-to-cell
/// distance, so scores are comparable across board sizes. Adversary
/// clearance is measured against where the adversaries will stand after
/// their chase step, not where they stand now.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardShaper {
    config: ShapingConfig,
}

/// The individual shaping terms for one candidate, before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardTerms {
    /// The candidate lands on the goal cell.
    pub goal_reached: bool,
    /// `1 - distance to goal / span`, in `[0, 1]`.
    pub goal_closeness: f32,
    /// `1.0` for a never-visited cell, `0.0` for a revisit.
    pub novelty: f32,
    /// Mean normalized distance to the post-step adversaries, in `[0, 1]`.
    /// Zero when the world has no adversaries.
    pub adversary_clearance: f32,
}

impl RewardShaper {
    #[must_use]
    pub fn new(config: ShapingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ShapingConfig {
        &self.config
    }

    /// Extracts the shaping terms for `candidate`.
    #[must_use]
    pub fn terms(
        &self,
        world: &GridWorld,
        memory: &RouteMemory,
        candidate: &CandidateAction,
    ) -> RewardTerms {
        let dest = candidate.destination;
        let span = self.config.metric.span(world.board().rows());
        let goal_distance = self.config.metric.distance(dest, world.goal()) / span;
        RewardTerms {
            goal_reached: dest == world.goal(),
            goal_closeness: 1.0 - goal_distance,
            novelty: if memory.was_visited(dest) { 0.0 } else { 1.0 },
            adversary_clearance: self.clearance(world, dest, span),
        }
    }

    /// Collapses the terms into the shaped scalar reward. Reaching the goal
    /// short-circuits every other term.
    #[must_use]
    pub fn score(&self, terms: &RewardTerms) -> f32 {
        if terms.goal_reached {
            return self.config.terminal_bonus;
        }
        terms.goal_closeness - self.config.repetition_penalty * (1.0 - terms.novelty)
            + terms.adversary_clearance
    }

    #[expect(clippy::cast_precision_loss)]
    fn clearance(&self, world: &GridWorld, dest: Position, span: f32) -> f32 {
        let predicted = world.predicted_adversaries(dest);
        if predicted.is_empty() {
            return 0.0;
        }
        let total: f32 = predicted
            .iter()
            .map(|&adv| self.config.metric.distance(dest, adv) / span)
            .sum();
        total / predicted.len() as f32
    }
}
