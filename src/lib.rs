//! # rust-2048
//!
//! Optimal play for small boards of the sliding-tile merge game "2048",
//! computed by treating the game as a Markov decision process.
//!
//! ## Design Principles
//!
//! 1. **Sampled, not enumerated**: the transition graph is discovered by
//!    random exploration up to a state bound, so the policy is only as good
//!    as the states it has seen.
//!
//! 2. **Explicit randomness**: every random draw comes from a `GameRng`
//!    passed in by the caller. Same seed, same table, same policy.
//!
//! 3. **No silent defaults**: unknown or unsolved states are errors at
//!    decision time.
//!
//! ## Pipeline
//!
//! - **Explore**: drive a `Game2048` through random episodes, recording each
//!   state and the weighted outcomes of every action tried.
//! - **Solve**: assign each state `V(s) = R(s) + gamma * sum P * V(next)`
//!   with a cycle-safe solver.
//! - **Decide**: pick the action whose successors have the highest expected
//!   value.
//! - **Persist**: save and restore the whole table as a policy file.
//!
//! ## Modules
//!
//! - `core`: actions, configuration, RNG
//! - `board`: grid mechanics, state ids, the `Environment` trait
//! - `explore`: state table and random-walk explorer
//! - `solve`: value solver and greedy policy
//! - `store`: policy file persistence
//! - `agent`: the façade tying it all together

pub mod agent;
pub mod board;
pub mod core;
pub mod error;
pub mod explore;
pub mod solve;
pub mod store;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{Action, ConfigError, GameConfig, GameRng};

pub use crate::board::{Board, BoardError, Environment, Game2048, StateId};

pub use crate::explore::{
    ExplorationPolicy, ExploreConfig, ExploreStats, Explorer, StateRecord, StateTable,
    TransitionEdge, UniformExploration,
};

pub use crate::solve::{
    GreedyPolicy, PolicyError, SolveError, SolveMethod, SolveStats, SolverConfig, ValueSolver,
};

pub use crate::store::{Format, PolicyStore, StoreError};

pub use crate::agent::{Agent, PlayEnd, PlayOutcome, PlayStep};
pub use crate::error::{Error, Result};
