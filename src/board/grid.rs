//! The tile grid and its move/merge/spawn rules.
//!
//! Cells are stored row-major in a `SmallVec`, which keeps boards up to 4x4
//! inline. A cell is 0 (empty) or a power of two in `2..=MAX_TILE`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Action, GameRng, MAX_SIDE};

use super::error::BoardError;

/// Largest tile a board holds. Two of them never merge, so no sum overflows.
pub const MAX_TILE: u32 = 1 << 30;

/// Row-major cell storage.
pub type Cells = SmallVec<[u32; 16]>;

/// An R x C grid of tile values.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Cells,
}

impl Board {
    /// Create an all-empty board.
    pub fn empty(rows: usize, cols: usize) -> Result<Self, BoardError> {
        check_dims(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: SmallVec::from_elem(0, rows * cols),
        })
    }

    /// Build a board from row-major cells.
    pub fn from_cells(rows: usize, cols: usize, cells: &[u32]) -> Result<Self, BoardError> {
        check_dims(rows, cols)?;
        if cells.len() != rows * cols {
            return Err(BoardError::Shape {
                expected: rows * cols,
                actual: cells.len(),
            });
        }
        if let Some(&bad) = cells.iter().find(|&&v| !is_valid_tile(v)) {
            return Err(BoardError::InvalidTile(bad));
        }
        Ok(Self {
            rows,
            cols,
            cells: SmallVec::from_slice(cells),
        })
    }

    /// Build a board from a slice of rows.
    ///
    /// ```
    /// use rust_2048::board::Board;
    ///
    /// let board = Board::from_rows(&[vec![0, 0], vec![2, 2]]).unwrap();
    /// assert_eq!(board.sum(), 4);
    /// ```
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self, BoardError> {
        let cols = rows.first().map_or(0, Vec::len);
        let cells: Cells = rows.iter().flatten().copied().collect();
        if rows.iter().any(|r| r.len() != cols) {
            return Err(BoardError::Shape {
                expected: rows.len() * cols,
                actual: cells.len(),
            });
        }
        Self::from_cells(rows.len(), cols, &cells)
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major view of all cells.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Value at `(row, col)`.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row * self.cols + col]
    }

    /// Copy the grid out as nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.cells.chunks(self.cols).map(<[u32]>::to_vec).collect()
    }

    /// Number of empty cells.
    #[must_use]
    pub fn free_cells(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// True when no empty cell remains.
    #[must_use]
    pub fn is_full(&self) -> bool {
        !self.cells.contains(&0)
    }

    /// True when some horizontally or vertically adjacent pair is equal and
    /// mergeable.
    #[must_use]
    pub fn has_merge(&self) -> bool {
        for r in 0..self.rows {
            for c in 0..self.cols {
                let v = self.get(r, c);
                if v == 0 || v >= MAX_TILE {
                    continue;
                }
                if c + 1 < self.cols && self.get(r, c + 1) == v {
                    return true;
                }
                if r + 1 < self.rows && self.get(r + 1, c) == v {
                    return true;
                }
            }
        }
        false
    }

    /// Full board with no possible merge in any direction.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_full() && !self.has_merge()
    }

    /// Largest tile on the board (0 when empty).
    #[must_use]
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all tiles, the board's value.
    #[must_use]
    pub fn sum(&self) -> u64 {
        self.cells.iter().map(|&v| u64::from(v)).sum()
    }

    /// Slide and merge every line toward the action's leading edge.
    ///
    /// Returns whether any cell changed. Does not spawn.
    pub fn shift(&mut self, action: Action) -> bool {
        let (lines, len) = if action.is_horizontal() {
            (self.rows, self.cols)
        } else {
            (self.cols, self.rows)
        };

        let mut changed = false;
        for line in 0..lines {
            let indices: SmallVec<[usize; MAX_SIDE]> = (0..len)
                .map(|k| {
                    let pos = if action.toward_start() { k } else { len - 1 - k };
                    if action.is_horizontal() {
                        line * self.cols + pos
                    } else {
                        pos * self.cols + line
                    }
                })
                .collect();

            let mut values: SmallVec<[u32; MAX_SIDE]> =
                indices.iter().map(|&i| self.cells[i]).collect();
            let before = values.clone();
            compact_line(&mut values);

            if values != before {
                changed = true;
                for (&i, &v) in indices.iter().zip(values.iter()) {
                    self.cells[i] = v;
                }
            }
        }
        changed
    }

    /// Place a 2 or 4 at a uniformly random empty cell.
    ///
    /// The tile is a 4 with probability `prob_of_4`. Returns the cell index
    /// and value, or `None` when the board is full.
    pub fn spawn_random(&mut self, prob_of_4: f64, rng: &mut GameRng) -> Option<(usize, u32)> {
        let empties: SmallVec<[usize; 16]> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(i, _)| i)
            .collect();

        let &index = rng.choose(&empties)?;
        let value = if rng.gen_bool(prob_of_4) { 4 } else { 2 };
        self.cells[index] = value;
        Some((index, value))
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.cols) {
            for (i, v) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                if *v == 0 {
                    write!(f, "{:>5}", ".")?;
                } else {
                    write!(f, "{:>5}", v)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Compact one line toward index 0.
///
/// Equal neighbours merge into their sum; a merged cell is locked for the
/// rest of the pass, so `[2, 2, 4]` becomes `[4, 4, 0]`, not `[8, 0, 0]`.
/// Tiles of `MAX_TILE` or more only slide.
pub fn compact_line(line: &mut [u32]) {
    let mut write = 0;
    let mut can_merge = false;

    for read in 0..line.len() {
        let v = line[read];
        if v == 0 {
            continue;
        }
        line[read] = 0;
        if can_merge && v < MAX_TILE && line[write - 1] == v {
            line[write - 1] += v;
            can_merge = false;
        } else {
            line[write] = v;
            write += 1;
            can_merge = true;
        }
    }
}

/// Zero or a power of two in `2..=MAX_TILE`.
#[inline]
#[must_use]
pub fn is_valid_tile(value: u32) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

fn check_dims(rows: usize, cols: usize) -> Result<(), BoardError> {
    if (1..=MAX_SIDE).contains(&rows) && (1..=MAX_SIDE).contains(&cols) {
        Ok(())
    } else {
        Err(BoardError::Dimensions { rows, cols })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&[u32]]) -> Board {
        let rows: Vec<Vec<u32>> = rows.iter().map(|r| r.to_vec()).collect();
        Board::from_rows(&rows).unwrap()
    }

    fn compacted(line: &[u32]) -> Vec<u32> {
        let mut v = line.to_vec();
        compact_line(&mut v);
        v
    }

    #[test]
    fn test_compact_line() {
        assert_eq!(compacted(&[0, 0, 0, 0]), vec![0, 0, 0, 0]);
        assert_eq!(compacted(&[2, 4, 2, 4]), vec![2, 4, 2, 4]);
        assert_eq!(compacted(&[2, 2, 4, 4]), vec![4, 8, 0, 0]);
        assert_eq!(compacted(&[2, 0, 0, 2]), vec![4, 0, 0, 0]);
        assert_eq!(compacted(&[2, 2, 2]), vec![4, 2, 0]);
        assert_eq!(compacted(&[2, 2, 2, 2]), vec![4, 4, 0, 0]);
    }

    #[test]
    fn test_merged_cell_does_not_merge_again() {
        assert_eq!(compacted(&[2, 2, 4]), vec![4, 4, 0]);
        assert_eq!(compacted(&[4, 4, 8, 16]), vec![8, 8, 16, 0]);
    }

    #[test]
    fn test_shift_directions() {
        let start = board(&[&[2, 0, 2], &[0, 4, 4], &[2, 2, 8]]);

        let mut left = start.clone();
        assert!(left.shift(Action::Left));
        assert_eq!(left, board(&[&[4, 0, 0], &[8, 0, 0], &[4, 8, 0]]));

        let mut right = start.clone();
        assert!(right.shift(Action::Right));
        assert_eq!(right, board(&[&[0, 0, 4], &[0, 0, 8], &[0, 4, 8]]));

        let mut up = start.clone();
        assert!(up.shift(Action::Up));
        assert_eq!(up, board(&[&[4, 4, 2], &[0, 2, 4], &[0, 0, 8]]));

        let mut down = start;
        assert!(down.shift(Action::Down));
        assert_eq!(down, board(&[&[0, 0, 2], &[0, 4, 4], &[4, 2, 8]]));
    }

    #[test]
    fn test_shift_no_change() {
        let mut b = board(&[&[2, 4], &[0, 0]]);
        assert!(!b.shift(Action::Left));
        assert!(!b.shift(Action::Up));
        assert_eq!(b, board(&[&[2, 4], &[0, 0]]));
    }

    #[test]
    fn test_non_square_shift() {
        let mut b = board(&[&[2, 2, 0, 4]]);
        assert!(b.shift(Action::Right));
        assert_eq!(b.cells(), &[0, 0, 4, 4]);
        assert!(!b.shift(Action::Up));
    }

    #[test]
    fn test_terminal() {
        assert!(board(&[&[2, 4], &[4, 2]]).is_terminal());
        assert!(!board(&[&[2, 2], &[4, 8]]).is_terminal());
        assert!(!board(&[&[2, 4], &[2, 8]]).is_terminal());
        assert!(!board(&[&[2, 4], &[0, 8]]).is_terminal());
        assert!(board(&[&[2, 4], &[0, 8]]).free_cells() == 1);
    }

    #[test]
    fn test_max_and_sum() {
        let b = board(&[&[0, 16], &[4, 2]]);
        assert_eq!(b.max_tile(), 16);
        assert_eq!(b.sum(), 22);
        assert_eq!(Board::empty(2, 2).unwrap().max_tile(), 0);
    }

    #[test]
    fn test_spawn_fills_empty_cell() {
        let mut rng = GameRng::new(1);
        let mut b = board(&[&[2, 0], &[4, 8]]);
        let (index, value) = b.spawn_random(0.1, &mut rng).unwrap();
        assert_eq!(index, 1);
        assert!(value == 2 || value == 4);
        assert!(b.is_full());
        assert_eq!(b.spawn_random(0.1, &mut rng), None);
    }

    #[test]
    fn test_spawn_probability_extremes() {
        let mut rng = GameRng::new(5);
        let mut b = Board::empty(2, 2).unwrap();
        assert_eq!(b.spawn_random(1.0, &mut rng).map(|(_, v)| v), Some(4));
        assert_eq!(b.spawn_random(0.0, &mut rng).map(|(_, v)| v), Some(2));
    }

    #[test]
    fn test_rejects_invalid_boards() {
        assert_eq!(
            Board::from_cells(2, 2, &[2, 3, 0, 0]),
            Err(BoardError::InvalidTile(3))
        );
        assert_eq!(
            Board::from_cells(2, 2, &[1, 0, 0, 0]),
            Err(BoardError::InvalidTile(1))
        );
        assert_eq!(
            Board::from_cells(2, 2, &[2, 0, 0]),
            Err(BoardError::Shape { expected: 4, actual: 3 })
        );
        assert!(matches!(
            Board::empty(5, 5),
            Err(BoardError::Dimensions { .. })
        ));
        assert!(Board::from_rows(&[vec![2, 0], vec![0]]).is_err());
        assert_eq!(
            Board::from_cells(1, 2, &[1 << 31, 1 << 31]),
            Err(BoardError::InvalidTile(1 << 31))
        );
    }

    #[test]
    fn test_largest_tiles_slide_without_merging() {
        let mut b = Board::from_cells(1, 4, &[MAX_TILE, 0, MAX_TILE, 2]).unwrap();
        let before = b.sum();
        assert!(b.shift(Action::Left));
        assert_eq!(b.cells(), &[MAX_TILE, MAX_TILE, 2, 0]);
        assert_eq!(b.sum(), before);
        assert!(!b.has_merge());

        let mut half = Board::from_cells(1, 2, &[MAX_TILE / 2, MAX_TILE / 2]).unwrap();
        assert!(half.shift(Action::Right));
        assert_eq!(half.cells(), &[0, MAX_TILE]);
    }

    #[test]
    fn test_display() {
        let b = board(&[&[0, 2], &[16, 4]]);
        assert_eq!(format!("{}", b), "    .     2\n   16     4\n");
    }
}
