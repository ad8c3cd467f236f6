//! Core types: actions, RNG, configuration.
//!
//! These are shared by the board engine, the explorer and the solver.

pub mod action;
pub mod config;
pub mod rng;

pub use action::Action;
pub use config::{ConfigError, GameConfig, MAX_ENCODABLE_TILE, MAX_SIDE};
pub use rng::GameRng;
