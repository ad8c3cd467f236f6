//! Environment trait and the 2048 environment.
//!
//! The explorer and the agent only talk to a board through `Environment`:
//! - `reset` starts an episode, fresh or from a known state
//! - `apply` performs a move followed by a random spawn
//! - the remaining accessors read the live board
//!
//! Randomness is always supplied by the caller as `&mut GameRng`.

use crate::core::{Action, ConfigError, GameConfig, GameRng};

use super::error::BoardError;
use super::grid::Board;
use super::state_id::StateId;

/// Stochastic environment contract consumed by the explorer and the agent.
pub trait Environment {
    /// Get the game configuration.
    fn config(&self) -> &GameConfig;

    /// The live board.
    fn board(&self) -> &Board;

    /// Start a new episode.
    ///
    /// `None` clears the board, spawns one random tile and records the result
    /// as the canonical start state. `Some(id)` decodes `id` into the board
    /// without touching the canonical start.
    fn reset(&mut self, start: Option<&StateId>, rng: &mut GameRng) -> Result<(), BoardError>;

    /// Slide/merge in `action`'s direction, then spawn if a cell is free.
    ///
    /// The spawn happens even when no tile moved.
    fn apply(&mut self, action: Action, rng: &mut GameRng);

    /// The start state recorded by the last fresh `reset`.
    fn canonical_start_state(&self) -> Option<&StateId>;

    /// Encoded identity of the live board.
    fn encoded_state(&self) -> Result<StateId, BoardError> {
        self.board().encode()
    }

    /// Sum of all tiles.
    fn board_value(&self) -> u64 {
        self.board().sum()
    }

    /// Number of empty cells.
    fn free_tile_count(&self) -> usize {
        self.board().free_cells()
    }

    /// Largest tile on the board.
    fn max_tile_value(&self) -> u32 {
        self.board().max_tile()
    }

    /// Full board with no merge left.
    fn is_terminal(&self) -> bool {
        self.board().is_terminal()
    }

    /// Max tile equals the configured target.
    fn is_win(&self) -> bool {
        self.max_tile_value() == self.config().target
    }
}

/// The sliding-tile merge game.
#[derive(Clone, Debug)]
pub struct Game2048 {
    config: GameConfig,
    board: Board,
    start_state: Option<StateId>,
}

impl Game2048 {
    /// Create a game with an empty board.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::empty(config.rows, config.cols).map_err(|_| ConfigError::Dimensions {
            rows: config.rows,
            cols: config.cols,
            max: crate::core::MAX_SIDE,
        })?;
        Ok(Self {
            config,
            board,
            start_state: None,
        })
    }

    /// Replace the live board, e.g. to evaluate a hand-built position.
    pub fn set_board(&mut self, board: Board) -> Result<(), BoardError> {
        if board.rows() != self.config.rows || board.cols() != self.config.cols {
            return Err(BoardError::Shape {
                expected: self.config.cell_count(),
                actual: board.cells().len(),
            });
        }
        self.board = board;
        Ok(())
    }
}

impl Environment for Game2048 {
    fn config(&self) -> &GameConfig {
        &self.config
    }

    fn board(&self) -> &Board {
        &self.board
    }

    fn reset(&mut self, start: Option<&StateId>, rng: &mut GameRng) -> Result<(), BoardError> {
        match start {
            Some(id) => {
                self.board = id.decode(self.config.rows, self.config.cols)?;
            }
            None => {
                self.board = Board::empty(self.config.rows, self.config.cols)?;
                self.board.spawn_random(self.config.prob_of_4, rng);
                self.start_state = Some(self.board.encode()?);
            }
        }
        Ok(())
    }

    fn apply(&mut self, action: Action, rng: &mut GameRng) {
        self.board.shift(action);
        self.board.spawn_random(self.config.prob_of_4, rng);
    }

    fn canonical_start_state(&self) -> Option<&StateId> {
        self.start_state.as_ref()
    }
}
