//! Population machinery: individuals, parallel fitness evaluation, and the
//! generation-to-generation evolution step.

use std::thread;

use gridmind_agent::{
    fitness::FitnessEvaluator,
    policy::{TERM_COUNT, WeightedTermPolicy},
    reward::ShapingConfig,
};
use gridmind_engine::GridWorld;
use rand::{Rng, seq::IndexedRandom};

use crate::weights;

/// One candidate solution: a normalized reward-term weight vector plus the
/// fitness it earned on the training worlds.
#[derive(Debug, Clone)]
pub struct Individual {
    weights: [f32; TERM_COUNT],
    fitness: f32,
}

impl Individual {
    /// Random individual with L1-normalized weights. Fitness starts at
    /// `f32::MIN` so unevaluated individuals sort last.
    pub fn random<R>(rng: &mut R, max_weight: f32) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut weights = weights::random(rng, max_weight);
        weights::normalize_l1(&mut weights);
        Self {
            weights,
            fitness: f32::MIN,
        }
    }

    #[must_use]
    pub fn weights(&self) -> &[f32; TERM_COUNT] {
        &self.weights
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

/// A generation of individuals, evaluated together on the same worlds.
#[derive(Debug, Clone)]
pub struct Population {
    shaping: ShapingConfig,
    individuals: Vec<Individual>,
}

impl Population {
    /// Random initial population. `shaping` is the reward configuration every
    /// individual's policy will run under.
    #[must_use]
    pub fn random<R>(shaping: ShapingConfig, count: usize, rng: &mut R, max_weight: f32) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count).map(|_| Individual::random(rng, max_weight)).collect();
        Self {
            shaping,
            individuals,
        }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Best individual of the last evaluated generation.
    #[must_use]
    pub fn best(&self) -> &Individual {
        &self.individuals[0]
    }

    /// Evaluates every individual in parallel, one thread each, then sorts
    /// the population by fitness descending.
    pub fn evaluate_fitness(&mut self, worlds: &[GridWorld], evaluator: &dyn FitnessEvaluator) {
        let shaping = self.shaping;
        thread::scope(|s| {
            for ind in &mut self.individuals {
                let mut policy = WeightedTermPolicy::new(shaping, ind.weights);
                s.spawn(move || {
                    ind.fitness = evaluator.evaluate(worlds, &mut policy);
                });
            }
        });

        self.individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    }
}

/// Evolution parameters for one generation step.
///
/// Callers anneal training by supplying different evolvers per phase, for
/// example shrinking `mutation_sigma` as the population converges.
#[derive(Debug, Clone, Copy)]
pub struct PopulationEvolver {
    /// Top individuals carried over unchanged.
    pub elite_count: usize,
    /// Clamp bound for every weight.
    pub max_weight: f32,
    /// Tournament size; larger means stronger selection pressure.
    pub tournament_size: usize,
    /// Standard deviation of the Gaussian mutation noise.
    pub mutation_sigma: f32,
    /// BLX-α range-expansion factor.
    pub blx_alpha: f32,
    /// Per-weight mutation probability.
    pub mutation_rate: f32,
}

impl PopulationEvolver {
    /// Produces the next generation from a fitness-sorted population.
    #[must_use]
    pub fn evolve(&self, population: &Population) -> Population {
        let mut rng = rand::rng();
        assert!(
            population
                .individuals
                .is_sorted_by(|a, b| a.fitness >= b.fitness)
        );

        let mut next: Vec<_> = population.individuals[..self.elite_count].to_vec();
        while next.len() < population.individuals.len() {
            let p1 = tournament_select(&population.individuals, self.tournament_size, &mut rng);
            let p2 = tournament_select(&population.individuals, self.tournament_size, &mut rng);

            let mut child =
                weights::blx_alpha(&p1.weights, &p2.weights, self.blx_alpha, self.max_weight, &mut rng);
            weights::mutate(
                &mut child,
                self.mutation_sigma,
                self.max_weight,
                self.mutation_rate,
                &mut rng,
            );
            weights::normalize_l1(&mut child);

            next.push(Individual {
                weights: child,
                fitness: f32::MIN,
            });
        }

        Population {
            shaping: population.shaping,
            individuals: next,
        }
    }
}

/// Picks the fittest of `tournament_size` randomly drawn individuals.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    population
        .choose_multiple(rng, tournament_size)
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        .expect("tournament draws from a non-empty population")
}
