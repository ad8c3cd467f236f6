//! Crate-level error type for the `Agent` API.

use thiserror::Error;

use crate::board::BoardError;
use crate::core::ConfigError;
use crate::explore::ExploreError;
use crate::solve::{PolicyError, SolveError};
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Explore(#[from] ExploreError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;
