//! Genetic-algorithm training for weighted-term policies.
//!
//! Training searches the space of reward-term weight vectors (goal closeness,
//! route novelty, adversary clearance) for the combination that maximizes
//! fitness over a set of training worlds:
//!
//! 1. **Evaluate** - each [`genetic::Individual`] runs episodes on every
//!    training world through a [`gridmind_agent::fitness::FitnessEvaluator`]
//!    and receives a scalar fitness
//! 2. **Select** - elites carry over unchanged, parents are picked by
//!    tournament
//! 3. **Recombine** - BLX-α crossover blends parent weights, Gaussian
//!    mutation perturbs them, and the child is L1-normalized
//!
//! The [`weights`] module holds the vector operators; [`genetic`] holds the
//! population machinery. Evolution parameters live in
//! [`genetic::PopulationEvolver`] and are supplied per generation, so callers
//! can anneal mutation strength across training phases.

pub mod genetic;
pub mod weights;
