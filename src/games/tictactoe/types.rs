//! Board and position types for tic-tac-toe.

use super::position::Position;
use crate::games::Seat;
use serde::{Deserialize, Serialize};

/// 3x3 tic-tac-toe board.
///
/// Cells are stored row-major (0-8); each holds the seat that marked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Seat>; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self { cells: [None; 9] }
    }

    /// Creates a board from row-major cells.
    pub fn from_cells(cells: [Option<Seat>; 9]) -> Self {
        Self { cells }
    }

    /// Gets the cell at the given position.
    pub fn get(&self, pos: Position) -> Option<Seat> {
        self.cells[pos.to_index()]
    }

    /// Marks the cell at the given position for `seat`.
    pub fn set(&mut self, pos: Position, seat: Seat) {
        self.cells[pos.to_index()] = Some(seat);
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Option<Seat>; 9] {
        &self.cells
    }

    /// Number of marked cells.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Board {
    /// Empty cells show their index, marked cells show X (seat 0) or O.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.cells[pos] {
                    None => pos.to_string(),
                    Some(0) => "X".to_string(),
                    Some(_) => "O".to_string(),
                };
                f.write_str(&symbol)?;
                if col < 2 {
                    f.write_str("|")?;
                }
            }
            if row < 2 {
                f.write_str("\n-+-+-\n")?;
            }
        }
        Ok(())
    }
}
