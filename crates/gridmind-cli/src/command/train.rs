use std::path::PathBuf;

use gridmind_agent::{
    episode::EpisodeConfig,
    fitness::{EpisodeFitnessRunner, FitnessEvaluator, ProgressFitness, ShapedReturnFitness},
    reward::ShapingConfig,
};
use gridmind_engine::{GridWorld, Position, WorldConfig};
use gridmind_training::genetic::{Individual, Population, PopulationEvolver};
use rand::{Rng, seq::IndexedRandom as _};

use crate::{model::AgentModel, util, util::Output};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum FitnessKind {
    /// Goals plus distance progress, collision-punishing
    #[default]
    Progress,
    /// Accumulated shaped reward
    Return,
}

const WORLDS_PER_INDIVIDUAL: usize = 3;
const STEP_LIMIT: usize = 200;
const GOAL_LIMIT: usize = 3;

const POPULATION_COUNT: usize = 30;
const MAX_GENERATIONS: usize = 120;

const ELITE_COUNT: usize = 2;
const TOURNAMENT_SIZE: usize = 2;
const MUTATION_RATE: f32 = 0.3;
const BLX_ALPHA: f32 = 0.2;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
enum EvolutionPhase {
    #[default]
    Exploration,
    Transition,
    Convergence,
}

impl EvolutionPhase {
    fn from_generation(generation: usize) -> Self {
        match generation {
            0..25 => Self::Exploration,
            25..70 => Self::Transition,
            _ => Self::Convergence,
        }
    }

    const fn max_weight(self) -> f32 {
        match self {
            Self::Exploration => 0.5,
            Self::Transition => 0.8,
            Self::Convergence => 1.0,
        }
    }

    const fn mutation_sigma(self) -> f32 {
        match self {
            Self::Exploration => 0.05,
            Self::Transition => 0.02,
            Self::Convergence => 0.01,
        }
    }

    const fn evolver(self) -> PopulationEvolver {
        PopulationEvolver {
            elite_count: ELITE_COUNT,
            tournament_size: TOURNAMENT_SIZE,
            max_weight: self.max_weight(),
            mutation_sigma: self.mutation_sigma(),
            blx_alpha: BLX_ALPHA,
            mutation_rate: MUTATION_RATE,
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[arg(long, default_value = "progress")]
    fitness: FitnessKind,
    /// Board configuration JSON file used for training worlds
    #[arg(long)]
    board: Option<PathBuf>,
    /// Model output path (stdout by default)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = match &arg.board {
        Some(path) => util::read_board_file(path)?,
        None => default_training_board(),
    };
    let episode_config = EpisodeConfig {
        step_limit: STEP_LIMIT,
        goal_limit: GOAL_LIMIT,
        ..EpisodeConfig::default()
    };

    let progress;
    let shaped;
    let evaluator: &dyn FitnessEvaluator = match arg.fitness {
        FitnessKind::Progress => {
            progress = EpisodeFitnessRunner::new(episode_config, ProgressFitness);
            &progress
        }
        FitnessKind::Return => {
            shaped = EpisodeFitnessRunner::new(episode_config, ShapedReturnFitness);
            &shaped
        }
    };

    let mut rng = rand::rng();
    let mut population = Population::random(
        ShapingConfig::default(),
        POPULATION_COUNT,
        &mut rng,
        EvolutionPhase::default().max_weight(),
    );
    for generation in 0..MAX_GENERATIONS {
        let phase = EvolutionPhase::from_generation(generation);
        eprintln!("Generation #{generation} ({phase:?}):");

        let worlds = training_worlds(&config, WORLDS_PER_INDIVIDUAL, &mut rng)?;
        population.evaluate_fitness(&worlds, evaluator);

        for (i, ind) in population.individuals().iter().enumerate() {
            eprintln!("  {i:2}: {:.3?} => {:.3}", ind.weights(), ind.fitness());
        }
        let fitnesses: Vec<f32> = population
            .individuals()
            .iter()
            .map(Individual::fitness)
            .collect();
        #[expect(clippy::cast_precision_loss)]
        let mean = fitnesses.iter().sum::<f32>() / fitnesses.len() as f32;
        eprintln!(
            "  Fitness: min {:.3} / mean {mean:.3} / max {:.3}",
            fitnesses.iter().copied().fold(f32::INFINITY, f32::min),
            fitnesses.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        );

        if generation + 1 < MAX_GENERATIONS {
            population = phase.evolver().evolve(&population);
        }
    }

    let best = population.best();
    eprintln!("Training finished; best weights {:.3?}", best.weights());

    let name = match arg.fitness {
        FitnessKind::Progress => "progress",
        FitnessKind::Return => "return",
    };
    let model = AgentModel::from_weights(name.to_owned(), best.fitness(), best.weights());
    Output::save_json(&model, arg.output.clone())?;

    eprintln!();
    eprintln!("Model saved");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final fitness: {:.3}", model.final_fitness);

    Ok(())
}

/// Builds the generation's training worlds: same board, random agent start
/// and random goal-respawn seed per world.
fn training_worlds<R>(
    config: &WorldConfig,
    count: usize,
    rng: &mut R,
) -> anyhow::Result<Vec<GridWorld>>
where
    R: Rng + ?Sized,
{
    let board = config.board();
    let starts: Vec<Position> = (0..config.rows)
        .flat_map(|y| (0..config.rows).map(move |x| Position::new(x, y)))
        .filter(|&pos| {
            board.is_open(pos) && pos != config.goal && !config.adversaries.contains(&pos)
        })
        .collect();
    (0..count)
        .map(|_| {
            let mut variant = config.clone();
            variant.agent = *starts
                .choose(rng)
                .expect("a valid board has at least one open start cell");
            variant.seed = Some(rng.random());
            Ok(GridWorld::from_config(&variant)?)
        })
        .collect()
}

fn default_training_board() -> WorldConfig {
    WorldConfig {
        rows: 10,
        agent: Position::new(0, 0),
        goal: Position::new(9, 9),
        obstacles: (2..8)
            .map(|y| Position::new(4, y))
            .chain((3..9).map(|x| Position::new(x, 8)))
            .collect(),
        adversaries: vec![Position::new(9, 0)],
        seed: None,
    }
}
