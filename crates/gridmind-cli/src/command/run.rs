use std::{path::PathBuf, thread};

use anyhow::Context as _;
use gridmind_agent::{
    episode::{EpisodeConfig, EpisodeController, EpisodeEvent},
    policy::{GreedyShapedPolicy, Policy, WeightedTermPolicy},
    reward::ShapingConfig,
};
use gridmind_engine::{GridWorld, Position, WorldConfig};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    /// Board configuration JSON file (a built-in 10x10 board by default)
    #[arg(long)]
    board: Option<PathBuf>,
    /// Trained agent model; without one, the greedy shaped-reward policy runs
    #[arg(long)]
    model: Option<PathBuf>,
    #[arg(long, default_value_t = 200)]
    step_limit: usize,
    #[arg(long, default_value_t = 1)]
    goal_limit: usize,
    /// Number of episodes to run
    #[arg(long, default_value_t = 1)]
    episodes: usize,
    /// Print per-tick state to stderr
    #[arg(long)]
    trace: bool,
    /// Episode report output path (stdout by default)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let config = match &arg.board {
        Some(path) => util::read_board_file(path)?,
        None => default_board(),
    };
    let episode_config = EpisodeConfig {
        step_limit: arg.step_limit,
        goal_limit: arg.goal_limit,
        ..EpisodeConfig::default()
    };

    let mut greedy;
    let mut weighted;
    let policy: &mut dyn Policy = match &arg.model {
        Some(path) => {
            let model = util::read_model_file(path)?;
            eprintln!("Loaded model {:?} (fitness {:.3})", model.name, model.final_fitness);
            weighted = WeightedTermPolicy::new(episode_config.shaping, model.to_weights()?);
            &mut weighted
        }
        None => {
            greedy = GreedyShapedPolicy::new(ShapingConfig::default());
            &mut greedy
        }
    };

    let mut reports = Vec::with_capacity(arg.episodes);
    for episode in 0..arg.episodes {
        let world = GridWorld::from_config(&config).context("failed to build world")?;
        let mut controller = EpisodeController::new(world, episode_config);
        let tracer = arg.trace.then(|| {
            let receiver = controller.subscribe();
            thread::spawn(move || {
                for event in receiver {
                    match event {
                        EpisodeEvent::Tick(s) => eprintln!(
                            "  tick: agent=({}, {}) goal=({}, {}) score={}",
                            s.agent.x, s.agent.y, s.goal.x, s.goal.y, s.score
                        ),
                        EpisodeEvent::Finished(outcome) => eprintln!("  done: {outcome}"),
                    }
                }
            })
        });
        let report = controller.run(policy);
        drop(controller);
        if let Some(handle) = tracer {
            handle.join().expect("trace printer does not panic");
        }
        eprintln!(
            "Episode {episode}: {} (score {}, {} steps, reward {:.3})",
            report.outcome, report.score, report.steps, report.total_reward
        );
        reports.push(report);
    }

    let wins = reports
        .iter()
        .filter(|r| r.outcome.is_goal_reached())
        .count();
    eprintln!("{wins}/{} episodes reached the goal limit", arg.episodes);

    Output::save_json(&reports, arg.output.clone())?;
    Ok(())
}

fn default_board() -> WorldConfig {
    WorldConfig {
        rows: 10,
        agent: Position::new(0, 0),
        goal: Position::new(9, 9),
        obstacles: (2..8).map(|y| Position::new(4, y)).collect(),
        adversaries: vec![Position::new(9, 0)],
        seed: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_board_is_valid() {
        default_board().validate().unwrap();
    }
}
