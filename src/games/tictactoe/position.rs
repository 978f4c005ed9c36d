//! Named cells of the tic-tac-toe board.

use super::types::Board;
use tracing::instrument;

/// A cell on the tic-tac-toe board, numbered 0-8 row by row.
///
/// Cells print and parse as kebab-case names such as `top-left`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumIter,
    strum::Display,
    strum::EnumString,
    strum::FromRepr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[repr(usize)]
pub enum Position {
    /// Cell 0
    TopLeft,
    /// Cell 1
    TopCenter,
    /// Cell 2
    TopRight,
    /// Cell 3
    MiddleLeft,
    /// Cell 4
    Center,
    /// Cell 5
    MiddleRight,
    /// Cell 6
    BottomLeft,
    /// Cell 7
    BottomCenter,
    /// Cell 8
    BottomRight,
}

impl Position {
    /// Board index (0-8).
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Cell at a board index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::from_repr(index)
    }

    /// Parses a cell number (0-8) or a cell name, ignoring case.
    #[instrument]
    pub fn from_label_or_number(s: &str) -> Option<Position> {
        let s = s.trim();
        match s.parse::<usize>() {
            Ok(index) => Self::from_index(index),
            Err(_) => s.parse().ok(),
        }
    }

    /// Empty cells of `board`, in index order.
    #[instrument(skip(board))]
    pub fn valid_moves(board: &Board) -> Vec<Position> {
        <Position as strum::IntoEnumIterator>::iter()
            .filter(|pos| board.is_empty(*pos))
            .collect()
    }
}
