//! Player actions.
//!
//! The numeric encoding is fixed: 0=Left, 1=Up, 2=Right, 3=Down. The order
//! matters for the policy's argmax tie-break and for any display mapping.

use serde::{Deserialize, Serialize};

/// A direction to slide and merge tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Left = 0,
    Up = 1,
    Right = 2,
    Down = 3,
}

impl Action {
    /// Number of actions.
    pub const COUNT: usize = 4;

    /// All actions in index order.
    pub const ALL: [Action; 4] = [Action::Left, Action::Up, Action::Right, Action::Down];

    /// Get the action's index (0..4).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up an action by index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Arrow glyph for display.
    #[must_use]
    pub const fn arrow(self) -> char {
        match self {
            Action::Left => '←',
            Action::Up => '↑',
            Action::Right => '→',
            Action::Down => '↓',
        }
    }

    /// True for moves that act on rows (Left/Right), false for columns.
    #[inline]
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Action::Left | Action::Right)
    }

    /// True when tiles travel toward index 0 of the line (Left/Up).
    #[inline]
    #[must_use]
    pub const fn toward_start(self) -> bool {
        matches!(self, Action::Left | Action::Up)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Left => "Left",
            Action::Up => "Up",
            Action::Right => "Right",
            Action::Down => "Down",
        };
        write!(f, "{}", name)
    }
}
