use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gridmind_agent::policy::TERM_COUNT;
use serde::{Deserialize, Serialize};

/// Reward-term names, in the order the policy's weight vector expects.
pub const TERM_NAMES: [&str; TERM_COUNT] = ["goal-closeness", "novelty", "adversary-clearance"];

/// A trained agent: weight-per-term plus training metadata. Stored as JSON.
///
/// Weights are keyed by term name rather than position, so a model file stays
/// readable and survives reordering of the term vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub final_fitness: f32,
    pub term_weights: BTreeMap<String, f32>,
}

impl AgentModel {
    pub fn from_weights(name: String, final_fitness: f32, weights: &[f32; TERM_COUNT]) -> Self {
        Self {
            name,
            trained_at: Utc::now(),
            final_fitness,
            term_weights: TERM_NAMES
                .iter()
                .zip(weights)
                .map(|(&name, &w)| (name.to_owned(), w))
                .collect(),
        }
    }

    /// Resolves the stored weights back into vector order.
    pub fn to_weights(&self) -> anyhow::Result<[f32; TERM_COUNT]> {
        let mut weights = [0.0; TERM_COUNT];
        for (i, name) in TERM_NAMES.iter().enumerate() {
            weights[i] = *self
                .term_weights
                .get(*name)
                .ok_or_else(|| anyhow::anyhow!("model is missing the {name:?} term weight"))?;
        }
        Ok(weights)
    }
}
