//! Value solving and greedy action selection.
//!
//! ## Overview
//!
//! `ValueSolver` assigns every discovered state a value from the Bellman
//! mixture over its recorded edges. `GreedyPolicy` then answers "best action"
//! queries from those values without further search.
//!
//! ## Usage
//!
//! ```rust
//! use rust_2048::board::StateId;
//! use rust_2048::core::{Action, GameConfig};
//! use rust_2048::explore::{StateRecord, StateTable, TransitionEdge};
//! use rust_2048::solve::{GreedyPolicy, SolverConfig, ValueSolver};
//!
//! let config = GameConfig::default();
//! let mut table = StateTable::new();
//! let start = StateId::new("2999");
//! let win = StateId::new("3299");
//! table.insert_new(start.clone());
//! table.insert(win.clone(), StateRecord { reward: config.win_reward, ..StateRecord::new() });
//! table.record_transition(&start, Action::Down, TransitionEdge::new(1.0, win));
//!
//! let solver = ValueSolver::new(&config, SolverConfig::default());
//! solver.solve(&mut table, &start).unwrap();
//!
//! assert_eq!(GreedyPolicy.best_action(&table, &start).unwrap(), Action::Down);
//! ```

pub mod policy;
pub mod solver;

pub use policy::{GreedyPolicy, PolicyError};
pub use solver::{SolveError, SolveMethod, SolveStats, SolverConfig, ValueSolver};
