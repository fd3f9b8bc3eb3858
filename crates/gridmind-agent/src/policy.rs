use gridmind_engine::GridWorld;

use crate::{
    action_enumerator::CandidateAction,
    reward::{RewardShaper, ShapingConfig},
    route_memory::RouteMemory,
};

/// Decision seam between the episode loop and a concrete agent.
///
/// Given the candidate batch for the tick, a policy returns the index of the
/// chosen candidate along with its value estimate. Policies may keep internal
/// state between ticks; the trait is object-safe so training can swap
/// policies behind `&mut dyn Policy`.
pub trait Policy {
    fn select_action(
        &mut self,
        world: &GridWorld,
        memory: &RouteMemory,
        candidates: &[CandidateAction],
    ) -> (usize, ValueEstimate);
}

/// A policy's valuation of its chosen action.
///
/// Scalar-valued policies report a single number; policies backed by a
/// multi-output model report the raw output sequence. Downstream consumers
/// normalize through [`ValueEstimate::to_scalar`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueEstimate {
    Scalar(f32),
    Sequence(Vec<f32>),
}

impl ValueEstimate {
    /// The scalar view: a sequence collapses to its first element, and an
    /// empty sequence to `0.0`.
    #[must_use]
    pub fn to_scalar(&self) -> f32 {
        match self {
            Self::Scalar(value) => *value,
            Self::Sequence(values) => values.first().copied().unwrap_or(0.0),
        }
    }
}

/// Baseline policy: picks the candidate with the highest shaped reward.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyShapedPolicy {
    shaper: RewardShaper,
}

impl GreedyShapedPolicy {
    #[must_use]
    pub fn new(config: ShapingConfig) -> Self {
        Self {
            shaper: RewardShaper::new(config),
        }
    }
}

impl Policy for GreedyShapedPolicy {
    fn select_action(
        &mut self,
        world: &GridWorld,
        memory: &RouteMemory,
        candidates: &[CandidateAction],
    ) -> (usize, ValueEstimate) {
        let (index, score) = best_by_score(candidates, |candidate| {
            self.shaper.score(&self.shaper.terms(world, memory, candidate))
        });
        (index, ValueEstimate::Scalar(score))
    }
}

/// Policy driven by a trained weight vector over the shaping terms.
///
/// Scores each candidate as the dot product of its term vector (closeness,
/// novelty, clearance) with the weights; a goal-reaching candidate scores a
/// fixed `2.0`, above any weighted combination of unit-range terms under
/// L1-normalized weights.
#[derive(Debug, Clone)]
pub struct WeightedTermPolicy {
    shaper: RewardShaper,
    weights: [f32; TERM_COUNT],
}

pub const TERM_COUNT: usize = 3;

const GOAL_SCORE: f32 = 2.0;

impl WeightedTermPolicy {
    #[must_use]
    pub fn new(config: ShapingConfig, weights: [f32; TERM_COUNT]) -> Self {
        Self {
            shaper: RewardShaper::new(config),
            weights,
        }
    }

    #[must_use]
    pub fn weights(&self) -> &[f32; TERM_COUNT] {
        &self.weights
    }
}

impl Policy for WeightedTermPolicy {
    fn select_action(
        &mut self,
        world: &GridWorld,
        memory: &RouteMemory,
        candidates: &[CandidateAction],
    ) -> (usize, ValueEstimate) {
        let (index, score) = best_by_score(candidates, |candidate| {
            let terms = self.shaper.terms(world, memory, candidate);
            if terms.goal_reached {
                return GOAL_SCORE;
            }
            let values = [terms.goal_closeness, terms.novelty, terms.adversary_clearance];
            self.weights
                .iter()
                .zip(values)
                .map(|(w, v)| w * v)
                .sum()
        });
        (index, ValueEstimate::Scalar(score))
    }
}

fn best_by_score(
    candidates: &[CandidateAction],
    mut score: impl FnMut(&CandidateAction) -> f32,
) -> (usize, f32) {
    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| (index, score(candidate)))
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .expect("candidate batch is never empty")
}

#[cfg(test)]
mod tests {
    use gridmind_engine::{Position, WorldConfig, WorldSeed};

    use super::*;
    use crate::action_enumerator::{ActionEnumerator, EnumeratorConfig};

    fn world() -> GridWorld {
        GridWorld::from_config(&WorldConfig {
            rows: 5,
            agent: Position::new(2, 2),
            goal: Position::new(4, 2),
            obstacles: vec![],
            adversaries: vec![],
            seed: Some(WorldSeed::from_bytes([4; 16])),
        })
        .unwrap()
    }

    fn candidates(world: &GridWorld, memory: &mut RouteMemory) -> Vec<CandidateAction> {
        ActionEnumerator::with_seed(EnumeratorConfig::default(), [8; 16])
            .enumerate(world, memory)
            .unwrap()
    }

    #[test]
    fn greedy_policy_moves_toward_the_goal() {
        let world = world();
        let mut memory = RouteMemory::new(8);
        let batch = candidates(&world, &mut memory);
        let (index, value) =
            GreedyShapedPolicy::default().select_action(&world, &memory, &batch);
        assert_eq!(batch[index].destination, Position::new(3, 2));
        assert!(value.to_scalar() > 0.0);
    }

    #[test]
    fn weighted_policy_with_pure_closeness_weight_matches_greedy() {
        let world = world();
        let mut memory = RouteMemory::new(8);
        let batch = candidates(&world, &mut memory);
        let mut policy =
            WeightedTermPolicy::new(ShapingConfig::default(), [1.0, 0.0, 0.0]);
        let (index, _) = policy.select_action(&world, &memory, &batch);
        assert_eq!(batch[index].destination, Position::new(3, 2));
    }

    #[test]
    fn goal_candidate_outranks_any_weighted_mix() {
        let world = GridWorld::from_config(&WorldConfig {
            rows: 5,
            agent: Position::new(3, 2),
            goal: Position::new(4, 2),
            obstacles: vec![],
            adversaries: vec![],
            seed: Some(WorldSeed::from_bytes([4; 16])),
        })
        .unwrap();
        let mut memory = RouteMemory::new(8);
        let batch = candidates(&world, &mut memory);
        // Weight vector pointing away from the goal terms entirely.
        let mut policy =
            WeightedTermPolicy::new(ShapingConfig::default(), [0.0, 1.0, 0.0]);
        let (index, value) = policy.select_action(&world, &memory, &batch);
        assert_eq!(batch[index].destination, Position::new(4, 2));
        assert_eq!(value.to_scalar(), 2.0);
    }

    mod value_estimate {
        use super::*;

        #[test]
        fn scalar_passes_through() {
            assert_eq!(ValueEstimate::Scalar(1.5).to_scalar(), 1.5);
        }

        #[test]
        fn sequence_collapses_to_first_element() {
            let value = ValueEstimate::Sequence(vec![0.25, 0.75]);
            assert_eq!(value.to_scalar(), 0.25);
        }

        #[test]
        fn empty_sequence_collapses_to_zero() {
            assert_eq!(ValueEstimate::Sequence(vec![]).to_scalar(), 0.0);
        }
    }
}
