use gridmind_engine::GridWorld;

use crate::{
    episode::{EpisodeConfig, EpisodeController, EpisodeReport},
    policy::Policy,
};

/// Scores a single finished episode.
pub trait EpisodeEvaluator {
    fn evaluate_episode(&self, report: &EpisodeReport) -> f32;
}

/// Progress-based fitness: rewards goals and distance-reducing steps,
/// punishes wandering and death.
///
/// `10 * goals + closer_steps - 2 * farther_steps`, minus `10` when the
/// episode ended in a collision. Farther steps cost double so that an agent
/// oscillating in place nets negative fitness.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressFitness;

impl EpisodeEvaluator for ProgressFitness {
    #[expect(clippy::cast_precision_loss)]
    fn evaluate_episode(&self, report: &EpisodeReport) -> f32 {
        let mut fitness = 10.0 * report.score as f32 + report.closer_steps as f32
            - 2.0 * report.farther_steps as f32;
        if report.outcome.is_collided() {
            fitness -= 10.0;
        }
        fitness
    }
}

/// Fitness as the episode's accumulated shaped reward.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapedReturnFitness;

impl EpisodeEvaluator for ShapedReturnFitness {
    fn evaluate_episode(&self, report: &EpisodeReport) -> f32 {
        report.total_reward
    }
}

/// Object-safe seam the trainer drives: run a policy over a set of worlds
/// and produce one fitness number. `Sync` so evaluation can fan out across
/// threads.
pub trait FitnessEvaluator: Sync {
    fn evaluate(&self, worlds: &[GridWorld], policy: &mut dyn Policy) -> f32;
}

/// Runs one episode per world and averages the per-episode fitness.
#[derive(Debug, Clone)]
pub struct EpisodeFitnessRunner<E> {
    episode_config: EpisodeConfig,
    evaluator: E,
}

impl<E> EpisodeFitnessRunner<E> {
    #[must_use]
    pub fn new(episode_config: EpisodeConfig, evaluator: E) -> Self {
        Self {
            episode_config,
            evaluator,
        }
    }
}

impl<E> FitnessEvaluator for EpisodeFitnessRunner<E>
where
    E: EpisodeEvaluator + Sync,
{
    #[expect(clippy::cast_precision_loss)]
    fn evaluate(&self, worlds: &[GridWorld], policy: &mut dyn Policy) -> f32 {
        if worlds.is_empty() {
            return 0.0;
        }
        let total: f32 = worlds
            .iter()
            .map(|world| {
                let mut controller =
                    EpisodeController::new(world.clone(), self.episode_config);
                let report = controller.run(policy);
                self.evaluator.evaluate_episode(&report)
            })
            .sum();
        total / worlds.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use gridmind_engine::{Position, WorldConfig, WorldSeed};

    use super::*;
    use crate::{
        episode::{EpisodeOutcome, TrajectoryPoint},
        policy::GreedyShapedPolicy,
    };

    fn report(outcome: EpisodeOutcome, score: usize, closer: usize, farther: usize) -> EpisodeReport {
        EpisodeReport {
            outcome,
            score,
            steps: closer + farther,
            total_reward: 3.5,
            closer_steps: closer,
            farther_steps: farther,
            trajectory: vec![TrajectoryPoint {
                position: Position::new(0, 0),
                value: 0.0,
            }],
        }
    }

    #[test]
    fn progress_fitness_rewards_goals_and_closing_in() {
        let fitness = ProgressFitness.evaluate_episode(&report(
            EpisodeOutcome::GoalReached,
            1,
            8,
            2,
        ));
        assert_eq!(fitness, 10.0 + 8.0 - 4.0);
    }

    #[test]
    fn progress_fitness_punishes_collisions() {
        let fitness =
            ProgressFitness.evaluate_episode(&report(EpisodeOutcome::Collided, 0, 3, 1));
        assert_eq!(fitness, 3.0 - 2.0 - 10.0);
    }

    #[test]
    fn oscillation_nets_negative_fitness() {
        let fitness = ProgressFitness.evaluate_episode(&report(
            EpisodeOutcome::StepLimitExceeded,
            0,
            5,
            5,
        ));
        assert!(fitness < 0.0);
    }

    #[test]
    fn shaped_return_fitness_is_the_total_reward() {
        let fitness = ShapedReturnFitness
            .evaluate_episode(&report(EpisodeOutcome::StepLimitExceeded, 0, 1, 1));
        assert_eq!(fitness, 3.5);
    }

    #[test]
    fn runner_averages_across_worlds() {
        let worlds: Vec<_> = [(0, 0), (4, 0)]
            .into_iter()
            .map(|(x, y)| {
                GridWorld::from_config(&WorldConfig {
                    rows: 5,
                    agent: Position::new(x, y),
                    goal: Position::new(2, 4),
                    obstacles: vec![],
                    adversaries: vec![],
                    seed: Some(WorldSeed::from_bytes([1; 16])),
                })
                .unwrap()
            })
            .collect();
        let runner = EpisodeFitnessRunner::new(EpisodeConfig::default(), ProgressFitness);
        let fitness = runner.evaluate(&worlds, &mut GreedyShapedPolicy::default());
        // Both starts reach the goal, so each episode contributes at least
        // the goal bonus minus wandering costs.
        assert!(fitness > 0.0);
    }

    #[test]
    fn runner_with_no_worlds_scores_zero() {
        let runner = EpisodeFitnessRunner::new(EpisodeConfig::default(), ProgressFitness);
        assert_eq!(runner.evaluate(&[], &mut GreedyShapedPolicy::default()), 0.0);
    }
}
