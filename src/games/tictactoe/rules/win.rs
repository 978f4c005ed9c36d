//! Win detection logic for tic-tac-toe.

use super::super::{Board, Position};
use crate::games::Seat;
use tracing::instrument;

/// The eight winning triples.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ],
    [
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ],
    // Columns
    [
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ],
    [
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ],
    [
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Checks if there is a winner on the board.
///
/// Returns `Some(seat)` if that seat holds all three cells of a line.
#[instrument]
pub fn check_winner(board: &Board) -> Option<Seat> {
    LINES.iter().find_map(|[a, b, c]| {
        let seat = board.get(*a)?;
        (board.get(*b) == Some(seat) && board.get(*c) == Some(seat)).then_some(seat)
    })
}
