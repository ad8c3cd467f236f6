//! Canonical state identifiers.
//!
//! A `StateId` is the row-major concatenation of every cell's decimal value,
//! with empty cells written as the sentinel digit `9`:
//!
//! ```text
//! [ 0,  0]
//! [16,  4]   ->  "99164"
//! ```
//!
//! The scheme is unambiguous for tiles `2..=2048`: none of them contains a
//! `9`, and where one tile is a prefix of another (`2` / `256` / `2048`) the
//! remainder (`56`, `048`) never starts a tile. 4096 and above are rejected.

use serde::{Deserialize, Serialize};

use crate::core::MAX_ENCODABLE_TILE;

use super::error::BoardError;
use super::grid::{Board, Cells};

/// Digit written for an empty cell.
pub const SENTINEL: char = '9';

/// Encodable tiles, as decimal text and value.
const TILE_TOKENS: [(&str, u32); 11] = [
    ("2", 2),
    ("4", 4),
    ("8", 8),
    ("16", 16),
    ("32", 32),
    ("64", 64),
    ("128", 128),
    ("256", 256),
    ("512", 512),
    ("1024", 1024),
    ("2048", 2048),
];

/// Canonical identity of a board.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    /// Wrap an already-encoded id without checking it.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The encoded text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encode a board.
    ///
    /// ```
    /// use rust_2048::board::{Board, StateId};
    ///
    /// let board = Board::from_rows(&[vec![0, 0], vec![16, 4]]).unwrap();
    /// assert_eq!(StateId::encode(&board).unwrap().as_str(), "99164");
    /// ```
    pub fn encode(board: &Board) -> Result<Self, BoardError> {
        let mut out = String::with_capacity(board.cells().len() * 2);
        for &v in board.cells() {
            if v == 0 {
                out.push(SENTINEL);
            } else if v > MAX_ENCODABLE_TILE {
                return Err(BoardError::Unencodable(v));
            } else {
                out.push_str(&v.to_string());
            }
        }
        Ok(Self(out))
    }

    /// Decode back into a `rows` x `cols` board.
    pub fn decode(&self, rows: usize, cols: usize) -> Result<Board, BoardError> {
        let cells_needed = rows * cols;
        let undecodable = || BoardError::Undecodable {
            id: self.0.clone(),
            cells: cells_needed,
        };

        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return Err(undecodable());
        }

        let mut cells = Cells::new();
        if !parse_cells(self.0.as_bytes(), cells_needed, &mut cells) {
            return Err(undecodable());
        }
        Board::from_cells(rows, cols, &cells)
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Split `text` into exactly `remaining` cells, backtracking on dead ends.
fn parse_cells(text: &[u8], remaining: usize, out: &mut Cells) -> bool {
    if text.is_empty() {
        return remaining == 0;
    }
    if remaining == 0 {
        return false;
    }

    if text[0] == SENTINEL as u8 {
        out.push(0);
        if parse_cells(&text[1..], remaining - 1, out) {
            return true;
        }
        out.pop();
        return false;
    }

    for (token, value) in TILE_TOKENS {
        if text.starts_with(token.as_bytes()) {
            out.push(value);
            if parse_cells(&text[token.len()..], remaining - 1, out) {
                return true;
            }
            out.pop();
        }
    }
    false
}

impl Board {
    /// Encode this board as a `StateId`.
    pub fn encode(&self) -> Result<StateId, BoardError> {
        StateId::encode(self)
    }
}
