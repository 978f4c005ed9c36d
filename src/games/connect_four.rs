//! Connect-four rule engine.
//!
//! Players take turns dropping pieces into one of seven columns; a piece
//! falls to the lowest empty row. Four in a row in any direction wins and a
//! full grid with no line is a draw.
//!
//! Only the lines through the last dropped piece are examined, so the win
//! check is constant-time instead of a full-board scan.

use super::{Outcome, RuleEngine, Seat};
use crate::rejection::Rejection;
use crate::session::UserId;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Number of columns.
pub const COLUMNS: usize = 7;
/// Number of rows.
pub const ROWS: usize = 6;
/// Pieces in a row needed to win.
pub const LINE: usize = 4;

/// Direction steps (row, col) for the four line orientations.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

type Grid = [[Option<Seat>; COLUMNS]; ROWS];

/// Connect-four position. Row 0 is the top of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectFourState {
    grid: Grid,
    current_player_index: Seat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_move: Option<(usize, usize)>,
}

impl ConnectFourState {
    /// An empty grid with seat 0 on turn.
    pub fn new() -> Self {
        Self {
            grid: [[None; COLUMNS]; ROWS],
            current_player_index: 0,
            last_move: None,
        }
    }

    /// Cell at (row, col), `None` when empty or out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<Seat> {
        self.grid.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Seat on turn.
    pub fn current_player_index(&self) -> Seat {
        self.current_player_index
    }

    /// (row, col) of the most recent drop.
    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    /// Whether a piece can still be dropped into `col`.
    pub fn is_open(&self, col: usize) -> bool {
        col < COLUMNS && self.grid[0][col].is_none()
    }

    /// Columns that still accept a piece.
    pub fn open_columns(&self) -> Vec<usize> {
        (0..COLUMNS).filter(|&c| self.is_open(c)).collect()
    }

    fn is_full(&self) -> bool {
        self.open_columns().is_empty()
    }

    /// Lowest empty row in `col`.
    fn landing_row(&self, col: usize) -> Option<usize> {
        (0..ROWS).rev().find(|&r| self.grid[r][col].is_none())
    }

    /// Counts same-seat pieces from (row, col) stepping by (dr, dc), excluding the origin.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, seat: Seat) -> usize {
        let mut count = 0;
        let (mut r, mut c) = (row as isize + dr, col as isize + dc);
        while r >= 0
            && c >= 0
            && (r as usize) < ROWS
            && (c as usize) < COLUMNS
            && self.grid[r as usize][c as usize] == Some(seat)
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    /// Whether the grid could have come from legal play with `seats` players:
    /// known seats only, no floating pieces, and `last_move` on top of an
    /// occupied column whenever the grid is not empty.
    pub fn is_consistent(&self, seats: usize) -> bool {
        let known_seats = self.grid.iter().flatten().flatten().all(|&s| s < seats);
        let settled = (1..ROWS).all(|r| {
            (0..COLUMNS).all(|c| self.grid[r - 1][c].is_none() || self.grid[r][c].is_some())
        });
        let empty = self.grid.iter().flatten().all(Option::is_none);
        let last_on_top = match self.last_move {
            None => empty,
            Some((row, col)) => {
                self.cell(row, col).is_some() && (row == 0 || self.cell(row - 1, col).is_none())
            }
        };
        known_seats && settled && last_on_top
    }

    /// Whether the piece at the last move completes a line.
    fn last_move_wins(&self) -> Option<Seat> {
        let (row, col) = self.last_move?;
        let seat = self.cell(row, col)?;
        DIRECTIONS
            .iter()
            .any(|&(dr, dc)| {
                1 + self.run_length(row, col, dr, dc, seat) + self.run_length(row, col, -dr, -dc, seat)
                    >= LINE
            })
            .then_some(seat)
    }
}

impl Default for ConnectFourState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectFourState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.grid {
            for (c, cell) in row.iter().enumerate() {
                let symbol = match cell {
                    None => '.',
                    Some(0) => 'X',
                    Some(_) => 'O',
                };
                if c > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        let labels: Vec<String> = (0..COLUMNS).map(|c| c.to_string()).collect();
        write!(f, "{}", labels.join(" "))
    }
}

/// Connect-four engine. Seat 0 plays X and moves first.
#[derive(Debug, Clone, Copy)]
pub struct ConnectFour;

impl RuleEngine for ConnectFour {
    type State = ConnectFourState;
    type Move = usize;

    const MIN_PLAYERS: usize = 2;
    const MAX_PLAYERS: usize = 2;

    fn initial_state(_players: &[UserId]) -> ConnectFourState {
        ConnectFourState::new()
    }

    fn current_seat(state: &ConnectFourState) -> Seat {
        state.current_player_index
    }

    #[instrument]
    fn check_terminal(state: &ConnectFourState) -> Option<Outcome> {
        if let Some(seat) = state.last_move_wins() {
            return Some(Outcome::Winner(seat));
        }
        state.is_full().then_some(Outcome::Draw)
    }

    #[instrument(skip(state))]
    fn place(state: &ConnectFourState, seat: Seat, col: &usize) -> Result<ConnectFourState, Rejection> {
        if *col >= COLUMNS {
            return Err(Rejection::illegal(format!(
                "column {} is off the board (0-{})",
                col,
                COLUMNS - 1
            )));
        }
        let row = state
            .landing_row(*col)
            .ok_or_else(|| Rejection::illegal(format!("column {} is full", col)))?;

        let mut next = *state;
        next.grid[row][*col] = Some(seat);
        next.last_move = Some((row, *col));
        if Self::check_terminal(&next).is_none() {
            next.current_player_index = (seat + 1) % Self::MAX_PLAYERS;
        }
        debug!(row, col, seat, "Piece dropped");
        Ok(next)
    }
}
