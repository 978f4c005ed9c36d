//! Tic-tac-toe rule engine.

mod position;
pub mod rules;
mod types;

pub use position::Position;
pub use types::Board;

use super::{Outcome, RuleEngine, Seat};
use crate::rejection::Rejection;
use crate::session::UserId;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Tic-tac-toe position: the board plus whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicTacToeState {
    cells: Board,
    current_player_index: Seat,
}

impl TicTacToeState {
    /// Builds a position from a board and the seat on turn.
    pub fn from_board(cells: Board, current_player_index: Seat) -> Self {
        Self {
            cells,
            current_player_index,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.cells
    }

    /// Seat on turn.
    pub fn current_player_index(&self) -> Seat {
        self.current_player_index
    }

    /// Every marked cell belongs to one of `seats` seats.
    pub fn is_consistent(&self, seats: usize) -> bool {
        self.cells.cells().iter().flatten().all(|&s| s < seats)
    }
}

impl std::fmt::Display for TicTacToeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cells)
    }
}

/// Tic-tac-toe engine. Seat 0 plays X and moves first.
#[derive(Debug, Clone, Copy)]
pub struct TicTacToe;

impl RuleEngine for TicTacToe {
    type State = TicTacToeState;
    type Move = Position;

    const MIN_PLAYERS: usize = 2;
    const MAX_PLAYERS: usize = 2;

    fn initial_state(_players: &[UserId]) -> TicTacToeState {
        TicTacToeState::from_board(Board::new(), 0)
    }

    fn current_seat(state: &TicTacToeState) -> Seat {
        state.current_player_index
    }

    #[instrument]
    fn check_terminal(state: &TicTacToeState) -> Option<Outcome> {
        if let Some(seat) = rules::check_winner(&state.cells) {
            return Some(Outcome::Winner(seat));
        }
        rules::is_full(&state.cells).then_some(Outcome::Draw)
    }

    #[instrument]
    fn place(state: &TicTacToeState, seat: Seat, pos: &Position) -> Result<TicTacToeState, Rejection> {
        if !state.cells.is_empty(*pos) {
            return Err(Rejection::illegal(format!("{} is already occupied", pos)));
        }

        let mut next = *state;
        next.cells.set(*pos, seat);
        if Self::check_terminal(&next).is_none() {
            next.current_player_index = (seat + 1) % Self::MAX_PLAYERS;
        }
        debug!(cell = pos.to_index(), seat, "Cell marked");
        Ok(next)
    }
}
