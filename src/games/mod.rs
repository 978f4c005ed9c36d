//! Rule engines for the mini-games a session can host.
//!
//! Each implemented game provides a [`RuleEngine`]. Dispatch over game kind
//! happens once, here, by matching the closed [`GameState`] and [`GameMove`]
//! enums; nothing downstream compares game-type strings.

pub mod connect_four;
pub mod ludo;
pub mod tictactoe;

use crate::rejection::Rejection;
use crate::session::{SessionStatus, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use connect_four::{ConnectFour, ConnectFourState};
pub use ludo::{Ludo, LudoMove, LudoPhase, LudoPiece, LudoState};
pub use tictactoe::{Board, Position, TicTacToe, TicTacToeState};

/// Index of a player in a session's turn order.
pub type Seat = usize;

/// Result of a finished game, in terms of seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The player in this seat won.
    Winner(Seat),
    /// Nobody won.
    Draw,
}

impl Outcome {
    /// Returns the winning seat if there is one.
    pub fn winner(&self) -> Option<Seat> {
        match self {
            Outcome::Winner(seat) => Some(*seat),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

/// Inclusive bounds on how many players a game takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLimits {
    /// Players needed to start.
    pub min: usize,
    /// Player cap.
    pub max: usize,
}

/// Shared contract for a single game's rules.
///
/// Engines are stateless; all position data lives in `State` so that every
/// call is a pure function from the old state to a new one.
pub trait RuleEngine {
    /// Board/position representation.
    type State: Clone;
    /// A player action.
    type Move: std::fmt::Debug;

    /// Players needed to start.
    const MIN_PLAYERS: usize;
    /// Player cap.
    const MAX_PLAYERS: usize;

    /// Position at the start of a game for the given turn order.
    fn initial_state(players: &[UserId]) -> Self::State;

    /// Seat whose turn it is.
    fn current_seat(state: &Self::State) -> Seat;

    /// Win or draw, if the position is terminal.
    fn check_terminal(state: &Self::State) -> Option<Outcome>;

    /// Applies a move for `seat`, which is already known to be on turn.
    fn place(state: &Self::State, seat: Seat, mv: &Self::Move) -> Result<Self::State, Rejection>;

    /// Validates turn order, then terminal status, then applies the move.
    ///
    /// Anyone but the player on turn gets `NOT_YOUR_TURN`, even on a
    /// finished position.
    fn apply_move(
        state: &Self::State,
        players: &[UserId],
        actor: &str,
        mv: &Self::Move,
    ) -> Result<Self::State, Rejection> {
        let seat = Self::current_seat(state);
        let expected = players
            .get(seat)
            .ok_or_else(|| Rejection::illegal("turn order does not match players"))?;
        if expected != actor {
            return Err(Rejection::NotYourTurn {
                expected: expected.clone(),
            });
        }
        if Self::check_terminal(state).is_some() {
            return Err(Rejection::WrongStatus(SessionStatus::Finished));
        }
        debug!(seat, ?mv, "Applying move");
        Self::place(state, seat, mv)
    }

    /// Player limits as a value.
    fn limits() -> PlayerLimits {
        PlayerLimits {
            min: Self::MIN_PLAYERS,
            max: Self::MAX_PLAYERS,
        }
    }
}

/// Every game kind a session can be created for.
///
/// Only some kinds have a rule engine; the rest are listed so that stored
/// records naming them still parse, and so creation can reject them cleanly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GameKind {
    /// Three in a row on a 3x3 board.
    TicTacToe,
    /// Four in a row on a 7x6 gravity grid.
    ConnectFour,
    /// Dice race around a shared track.
    Ludo,
    /// Not implemented.
    Chess,
    /// Not implemented.
    Checkers,
    /// Not implemented.
    SnakesAndLadders,
}

impl GameKind {
    /// Player limits, or `None` when the kind has no rule engine.
    #[instrument]
    pub fn limits(self) -> Option<PlayerLimits> {
        match self {
            GameKind::TicTacToe => Some(TicTacToe::limits()),
            GameKind::ConnectFour => Some(ConnectFour::limits()),
            GameKind::Ludo => Some(Ludo::limits()),
            GameKind::Chess | GameKind::Checkers | GameKind::SnakesAndLadders => None,
        }
    }

    /// Whether sessions of this kind can be created.
    pub fn is_playable(self) -> bool {
        self.limits().is_some()
    }

    /// Opening position for the given players.
    #[instrument(skip(players), fields(players = players.len()))]
    pub fn initial_state(self, players: &[UserId]) -> Result<GameState, Rejection> {
        match self {
            GameKind::TicTacToe => Ok(GameState::TicTacToe(TicTacToe::initial_state(players))),
            GameKind::ConnectFour => {
                Ok(GameState::ConnectFour(ConnectFour::initial_state(players)))
            }
            GameKind::Ludo => Ok(GameState::Ludo(Ludo::initial_state(players))),
            GameKind::Chess | GameKind::Checkers | GameKind::SnakesAndLadders => {
                Err(Rejection::UnknownGameType(self))
            }
        }
    }
}

/// Game position, tagged by game kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GameState {
    /// Tic-tac-toe position.
    TicTacToe(TicTacToeState),
    /// Connect-four position.
    ConnectFour(ConnectFourState),
    /// Ludo position.
    Ludo(LudoState),
}

/// A player action, tagged by game kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMove {
    /// Mark a tic-tac-toe cell.
    TicTacToe(Position),
    /// Drop a piece into a connect-four column (0-based).
    ConnectFour(usize),
    /// Roll or advance in ludo.
    Ludo(LudoMove),
}

impl GameState {
    /// Game kind of this position.
    pub fn kind(&self) -> GameKind {
        match self {
            GameState::TicTacToe(_) => GameKind::TicTacToe,
            GameState::ConnectFour(_) => GameKind::ConnectFour,
            GameState::Ludo(_) => GameKind::Ludo,
        }
    }

    /// Seat whose turn it is.
    pub fn current_seat(&self) -> Seat {
        match self {
            GameState::TicTacToe(s) => TicTacToe::current_seat(s),
            GameState::ConnectFour(s) => ConnectFour::current_seat(s),
            GameState::Ludo(s) => Ludo::current_seat(s),
        }
    }

    /// Win or draw, if the position is terminal.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            GameState::TicTacToe(s) => TicTacToe::check_terminal(s),
            GameState::ConnectFour(s) => ConnectFour::check_terminal(s),
            GameState::Ludo(s) => Ludo::check_terminal(s),
        }
    }

    /// Number of seats the position was built for.
    pub fn seat_count(&self) -> usize {
        match self {
            GameState::TicTacToe(_) => TicTacToe::MAX_PLAYERS,
            GameState::ConnectFour(_) => ConnectFour::MAX_PLAYERS,
            GameState::Ludo(s) => s.pieces().len(),
        }
    }

    /// Whether the position is one legal play could reach with `players` seats.
    pub fn is_consistent(&self, players: usize) -> bool {
        match self {
            GameState::TicTacToe(s) => s.is_consistent(players),
            GameState::ConnectFour(s) => s.is_consistent(players),
            GameState::Ludo(s) => s.is_consistent(),
        }
    }

    /// Routes a move to the engine for this position's kind.
    #[instrument(skip(self, players), fields(kind = %self.kind()))]
    pub fn apply(
        &self,
        players: &[UserId],
        actor: &str,
        mv: &GameMove,
    ) -> Result<GameState, Rejection> {
        match (self, mv) {
            (GameState::TicTacToe(s), GameMove::TicTacToe(m)) => {
                TicTacToe::apply_move(s, players, actor, m).map(GameState::TicTacToe)
            }
            (GameState::ConnectFour(s), GameMove::ConnectFour(m)) => {
                ConnectFour::apply_move(s, players, actor, m).map(GameState::ConnectFour)
            }
            (GameState::Ludo(s), GameMove::Ludo(m)) => {
                Ludo::apply_move(s, players, actor, m).map(GameState::Ludo)
            }
            _ => Err(Rejection::illegal(format!(
                "move {:?} does not belong to a {} game",
                mv,
                self.kind()
            ))),
        }
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameState::TicTacToe(s) => write!(f, "{}", s),
            GameState::ConnectFour(s) => write!(f, "{}", s),
            GameState::Ludo(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_placeholders_have_no_engine() {
        let playable: Vec<_> = GameKind::iter().filter(|k| k.is_playable()).collect();
        assert_eq!(
            playable,
            vec![GameKind::TicTacToe, GameKind::ConnectFour, GameKind::Ludo]
        );
    }

    #[test]
    fn test_kind_parses_from_kebab_case() {
        assert_eq!("connect-four".parse::<GameKind>().ok(), Some(GameKind::ConnectFour));
        assert_eq!(GameKind::SnakesAndLadders.to_string(), "snakes-and-ladders");
    }

    #[test]
    fn test_mismatched_move_is_illegal() {
        let players = vec!["a".to_string(), "b".to_string()];
        let state = GameKind::TicTacToe
            .initial_state(&players)
            .expect("tic-tac-toe is playable");
        let result = state.apply(&players, "a", &GameMove::ConnectFour(0));
        assert!(matches!(result, Err(Rejection::IllegalMove(_))));
    }

    #[test]
    fn test_state_kind_tag_in_json() {
        let players = vec!["a".to_string(), "b".to_string()];
        let state = GameKind::ConnectFour
            .initial_state(&players)
            .expect("connect-four is playable");
        let json = serde_json::to_value(&state).expect("serializes");
        assert_eq!(json["kind"], "connect-four");
    }
}
