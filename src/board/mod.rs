//! Board engine: the grid, move resolution, state encoding and the
//! environment the explorer drives.
//!
//! - `grid`: `Board`, slide/merge/spawn, terminal checks
//! - `state_id`: `StateId` encode/decode with the `9` sentinel
//! - `engine`: `Environment` trait and `Game2048`

pub mod engine;
pub mod error;
pub mod grid;
pub mod state_id;

pub use engine::{Environment, Game2048};
pub use error::BoardError;
pub use grid::{compact_line, is_valid_tile, Board, MAX_TILE};
pub use state_id::{StateId, SENTINEL};
