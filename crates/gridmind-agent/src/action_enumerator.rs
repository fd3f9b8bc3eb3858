use arrayvec::ArrayVec;
use gridmind_engine::{Direction, GridWorld, Position};
use rand::{SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{observation::Observation, route_memory::RouteMemory};

/// Per-tick candidate generator.
///
/// Enumerates the one-step moves that are legal on the board and not in the
/// agent's recent route. When every legal move is recently visited, it evicts
/// the oldest short-term memory entry and retries, so a live agent always
/// gets at least one candidate; only an agent with no legal move at all (and
/// nothing left to evict) is deadlocked.
#[derive(Debug, Clone)]
pub struct ActionEnumerator {
    config: EnumeratorConfig,
    rng: Pcg32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumeratorConfig {
    /// Fixed number of candidates returned per tick. Short batches are
    /// padded by resampling, so policies see a constant-width choice.
    pub batch_size: usize,
    /// Whether "remain on the current cell" is offered as a move.
    pub allow_stay: bool,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            batch_size: 4,
            allow_stay: false,
        }
    }
}

/// One enumerated move, paired with the observation the policy scores.
#[derive(Debug, Clone)]
pub struct CandidateAction {
    pub destination: Position,
    pub observation: Observation,
    pub admission: Admission,
}

/// How a candidate earned its slot in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Admission {
    /// Legal and not recently visited on the first pass.
    Open,
    /// Became legal only after short-term memory eviction.
    AfterEviction,
    /// Duplicate of another candidate, added to pad the batch.
    Resampled,
}

/// The agent has no legal move and no memory left to evict.
#[derive(Debug, Clone, Copy, derive_more::Display, derive_more::Error)]
#[display("agent at ({}, {}) has no legal move", agent.x, agent.y)]
pub struct DeadlockError {
    pub agent: Position,
}

impl ActionEnumerator {
    #[must_use]
    pub fn new(config: EnumeratorConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    #[must_use]
    pub fn with_seed(config: EnumeratorConfig, seed: [u8; 16]) -> Self {
        Self {
            config,
            rng: Pcg32::from_seed(seed),
        }
    }

    /// Enumerates candidates for the current tick, evicting route memory as
    /// needed. Errs only when the agent is walled in on all sides.
    pub fn enumerate(
        &mut self,
        world: &GridWorld,
        memory: &mut RouteMemory,
    ) -> Result<Vec<CandidateAction>, DeadlockError> {
        let mut evictions = 0;
        loop {
            let open = self.open_destinations(world, memory);
            if !open.is_empty() {
                let admission = if evictions == 0 {
                    Admission::Open
                } else {
                    Admission::AfterEviction
                };
                return Ok(self.build_batch(world, &open, admission));
            }
            let Some(evicted) = memory.evict_oldest() else {
                return Err(DeadlockError {
                    agent: world.agent(),
                });
            };
            evictions += 1;
            tracing::debug!(
                x = evicted.x,
                y = evicted.y,
                evictions,
                "no open move, evicted oldest route memory entry"
            );
        }
    }

    fn open_destinations(
        &self,
        world: &GridWorld,
        memory: &RouteMemory,
    ) -> ArrayVec<Position, 5> {
        let agent = world.agent();
        let mut directions: ArrayVec<Direction, 5> =
            Direction::CARDINAL.into_iter().collect();
        if self.config.allow_stay {
            directions.push(Direction::Stay);
        }
        directions
            .into_iter()
            .filter_map(|dir| agent.step(dir))
            .filter(|&dest| world.board().is_open(dest) && !memory.contains_recent(dest))
            .collect()
    }

    fn build_batch(
        &mut self,
        world: &GridWorld,
        open: &[Position],
        admission: Admission,
    ) -> Vec<CandidateAction> {
        let mut batch: Vec<_> = open
            .iter()
            .map(|&destination| CandidateAction {
                destination,
                observation: Observation::encode_with_agent(world, destination),
                admission,
            })
            .collect();
        while batch.len() < self.config.batch_size {
            let template = open
                .choose(&mut self.rng)
                .expect("batch padding requires at least one open destination");
            batch.push(CandidateAction {
                destination: *template,
                observation: Observation::encode_with_agent(world, *template),
                admission: Admission::Resampled,
            });
        }
        batch
    }
}
