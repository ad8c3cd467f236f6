//! State discovery by random exploration.
//!
//! ## Overview
//!
//! The explorer drives an `Environment` through random episodes and records
//! every state it sees in a `StateTable`, together with one
//! `TransitionEdge` per distinct `(probability, next state)` outcome of each
//! action.
//!
//! ## Usage
//!
//! ```rust
//! use rust_2048::board::Game2048;
//! use rust_2048::core::{GameConfig, GameRng};
//! use rust_2048::explore::{ExploreConfig, Explorer, StateTable};
//!
//! let mut env = Game2048::new(GameConfig::default()).unwrap();
//! let mut rng = GameRng::new(42);
//! let mut table = StateTable::new();
//!
//! let explorer = Explorer::new(ExploreConfig::default().with_bound(20));
//! let stats = explorer.explore(&mut table, &mut env, &mut rng).unwrap();
//! assert!(table.len() >= 20);
//! assert!(stats.episodes > 0);
//! ```

pub mod explorer;
pub mod table;

pub use explorer::{
    transition_probability, ExplorationPolicy, ExploreConfig, ExploreError, ExploreStats, Explorer,
    UniformExploration,
};
pub use table::{ActionEdges, StateRecord, StateTable, TransitionEdge};
