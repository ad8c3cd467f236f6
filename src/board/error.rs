//! Board construction and encoding errors.

use thiserror::Error;

/// Errors raised while building, encoding or decoding a board.
///
/// Decoding failures are fatal input errors: they mean a policy file was
/// produced for a different board shape or is corrupt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board dimensions {rows}x{cols} are not supported")]
    Dimensions { rows: usize, cols: usize },
    #[error("expected {expected} cells, got {actual}")]
    Shape { expected: usize, actual: usize },
    #[error("cell value {0} is not zero or a power of two >= 2")]
    InvalidTile(u32),
    #[error("tile {0} cannot be represented in a state id")]
    Unencodable(u32),
    #[error("state id '{id}' does not decode into {cells} cells")]
    Undecodable { id: String, cells: usize },
}
