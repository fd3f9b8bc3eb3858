//! Decision core for the grid navigation agent.
//!
//! This crate implements the per-tick decision pipeline on top of a
//! [`gridmind_engine::GridWorld`]:
//!
//! 1. **Candidate enumeration** ([`action_enumerator`]) - Lists the legal,
//!    non-repeating one-step moves from the agent's cell, evicting route
//!    memory when the agent is boxed in and padding short batches by
//!    resampling.
//!
//! 2. **Reward shaping** ([`reward`]) - Scores each candidate from goal
//!    closeness, route novelty, and adversary clearance, with a dominating
//!    bonus for reaching the goal.
//!
//! 3. **Policy selection** ([`policy`]) - Picks one candidate and reports a
//!    value estimate; policies range from pure shaped-reward greedy to
//!    weighted term mixes produced by training.
//!
//! 4. **Episode control** ([`episode`]) - Drives the loop (enumerate, select,
//!    apply, advance adversaries, check termination), maintains the agent's
//!    [`route_memory`], and emits events to observers.
//!
//! [`fitness`] turns finished episode reports into scalar fitness for
//! training, and [`observation`] encodes world state as the dense channel
//! grid that policies see.

pub mod action_enumerator;
pub mod episode;
pub mod fitness;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod route_memory;
