//! Game configuration.
//!
//! `GameConfig` describes the board and the reward model shared by the
//! environment, the explorer and the solver. Built with `with_*` methods and
//! checked once with [`GameConfig::validate`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest tile the state encoding can represent (4096 contains the sentinel digit).
pub const MAX_ENCODABLE_TILE: u32 = 2048;

/// Largest supported board side.
pub const MAX_SIDE: usize = 4;

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("board dimensions {rows}x{cols} out of range (1..={max} per side, at least 2 cells)")]
    Dimensions { rows: usize, cols: usize, max: usize },
    #[error("win target {0} must be a power of two in 4..=2048")]
    Target(u32),
    #[error("discount factor {0} must lie in [0, 1]")]
    Gamma(f64),
    #[error("spawn probabilities {p2} and {p4} must be non-negative and sum to 1")]
    SpawnProbabilities { p2: f64, p4: f64 },
    #[error("win reward {0} must be finite")]
    WinReward(f64),
}

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of board rows.
    pub rows: usize,

    /// Number of board columns.
    pub cols: usize,

    /// Tile value that wins an episode.
    pub target: u32,

    /// Reward assigned to a state whose max tile equals `target`.
    pub win_reward: f64,

    /// Discount factor applied to successor values.
    pub gamma: f64,

    /// Probability that a spawned tile is a 2.
    pub prob_of_2: f64,

    /// Probability that a spawned tile is a 4.
    pub prob_of_4: f64,

    /// Seed for the run's random generator.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 2,
            cols: 2,
            target: 32,
            win_reward: 100.0,
            gamma: 0.9,
            prob_of_2: 0.9,
            prob_of_4: 0.1,
            seed: 42,
        }
    }
}

impl GameConfig {
    /// Create a square board configuration with default rewards.
    pub fn new(side: usize) -> Self {
        Self::default().with_dims(side, side)
    }

    /// Set board dimensions.
    #[must_use]
    pub fn with_dims(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    /// Set the winning tile value.
    #[must_use]
    pub fn with_target(mut self, target: u32) -> Self {
        self.target = target;
        self
    }

    /// Set the reward for reaching the target.
    #[must_use]
    pub fn with_win_reward(mut self, reward: f64) -> Self {
        self.win_reward = reward;
        self
    }

    /// Set the discount factor.
    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set spawn probabilities for 2 and 4 tiles.
    #[must_use]
    pub fn with_spawn_probabilities(mut self, p2: f64, p4: f64) -> Self {
        self.prob_of_2 = p2;
        self.prob_of_4 = p4;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Check every field is within the supported range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_SIDE).contains(&self.rows)
            || !(1..=MAX_SIDE).contains(&self.cols)
            || self.cell_count() < 2
        {
            return Err(ConfigError::Dimensions {
                rows: self.rows,
                cols: self.cols,
                max: MAX_SIDE,
            });
        }
        if !self.target.is_power_of_two() || self.target < 4 || self.target > MAX_ENCODABLE_TILE {
            return Err(ConfigError::Target(self.target));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::Gamma(self.gamma));
        }
        let (p2, p4) = (self.prob_of_2, self.prob_of_4);
        if p2 < 0.0 || p4 < 0.0 || (p2 + p4 - 1.0).abs() > 1e-9 {
            return Err(ConfigError::SpawnProbabilities { p2, p4 });
        }
        if !self.win_reward.is_finite() {
            return Err(ConfigError::WinReward(self.win_reward));
        }
        Ok(())
    }
}
