//! Ludo rule engine.
//!
//! Two to four players race four pieces each around a 52-square loop and up
//! a private six-square home column.
//!
//! - Seat `s` enters the loop at absolute square `13 * s`.
//! - A turn is a [`LudoMove::Roll`] followed by a [`LudoMove::Advance`]. If
//!   no piece can use the roll, the turn passes without an advance.
//! - Only a 6 brings a piece out of base, onto progress 0.
//! - Progress 0..=50 is the shared loop, 51..=56 the home column, and home is
//!   reached with an exact roll at progress 57.
//! - Landing on an opponent on a non-safe loop square sends it back to base.
//! - A 6 earns another roll. Ludo never ends in a draw.

use super::{Outcome, RuleEngine, Seat};
use crate::rejection::Rejection;
use crate::session::UserId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Pieces per player.
pub const PIECES: usize = 4;
/// Squares in the shared loop.
pub const TRACK_LEN: usize = 52;
/// Last progress value on the shared loop.
pub const LAST_TRACK_STEP: u8 = 50;
/// Progress value of the home square.
pub const HOME_STEP: u8 = 57;
/// Absolute loop squares where pieces cannot be captured.
pub const SAFE_SQUARES: [usize; 8] = [0, 8, 13, 21, 26, 34, 39, 47];

/// Die face that releases pieces and grants another roll.
const BONUS_FACE: u8 = 6;

/// Where a single piece is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LudoPiece {
    /// Waiting in base.
    Base,
    /// On the loop or home column, with progress from the seat's entry square.
    Track(u8),
    /// Finished.
    Home,
}

impl LudoPiece {
    /// Where this piece ends up after moving `face` steps, if it can move.
    pub fn destination(self, face: u8) -> Option<LudoPiece> {
        match self {
            LudoPiece::Base => (face == BONUS_FACE).then_some(LudoPiece::Track(0)),
            LudoPiece::Track(step) => {
                let next = step.saturating_add(face);
                match next.cmp(&HOME_STEP) {
                    std::cmp::Ordering::Less => Some(LudoPiece::Track(next)),
                    std::cmp::Ordering::Equal => Some(LudoPiece::Home),
                    std::cmp::Ordering::Greater => None,
                }
            }
            LudoPiece::Home => None,
        }
    }
}

/// What the player on turn must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LudoPhase {
    /// Waiting for a die roll.
    AwaitingRoll,
    /// Waiting for a piece to be advanced by `lastRoll`.
    AwaitingMove,
}

/// A ludo action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LudoMove {
    /// Report a die roll (1-6).
    Roll {
        /// Rolled face.
        face: u8,
    },
    /// Advance one of the player's pieces (0-3) by the last roll.
    Advance {
        /// Piece index.
        piece: usize,
    },
}

/// Rolls a six-sided die.
pub fn roll_die<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(1..=6)
}

/// Absolute loop square of a seat's piece at `step`, if it is on the loop.
pub fn track_square(seat: Seat, step: u8) -> Option<usize> {
    (step <= LAST_TRACK_STEP).then(|| (step as usize + 13 * seat) % TRACK_LEN)
}

/// Ludo position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LudoState {
    pieces: Vec<[LudoPiece; PIECES]>,
    current_player_index: Seat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_roll: Option<u8>,
    phase: LudoPhase,
}

impl LudoState {
    /// All pieces in base with seat 0 to roll.
    pub fn new(seats: usize) -> Self {
        Self {
            pieces: vec![[LudoPiece::Base; PIECES]; seats],
            current_player_index: 0,
            last_roll: None,
            phase: LudoPhase::AwaitingRoll,
        }
    }

    /// Builds a position directly; used to set up scenarios.
    pub fn from_parts(
        pieces: Vec<[LudoPiece; PIECES]>,
        current_player_index: Seat,
        last_roll: Option<u8>,
        phase: LudoPhase,
    ) -> Self {
        Self {
            pieces,
            current_player_index,
            last_roll,
            phase,
        }
    }

    /// Pieces per seat.
    pub fn pieces(&self) -> &[[LudoPiece; PIECES]] {
        &self.pieces
    }

    /// Seat on turn.
    pub fn current_player_index(&self) -> Seat {
        self.current_player_index
    }

    /// Most recent roll.
    pub fn last_roll(&self) -> Option<u8> {
        self.last_roll
    }

    /// Current turn phase.
    pub fn phase(&self) -> LudoPhase {
        self.phase
    }

    /// Pieces short of home, rolls on a die face, and a roll on record
    /// whenever a piece is waiting to move.
    pub fn is_consistent(&self) -> bool {
        let on_board = self
            .pieces
            .iter()
            .flatten()
            .all(|p| !matches!(p, LudoPiece::Track(step) if *step >= HOME_STEP));
        let roll_valid = self.last_roll.is_none_or(|face| (1..=6).contains(&face));
        let roll_present = self.phase == LudoPhase::AwaitingRoll || self.last_roll.is_some();
        on_board && roll_valid && roll_present
    }

    /// Pieces of `seat` that can move `face` steps.
    pub fn movable_pieces(&self, seat: Seat, face: u8) -> Vec<usize> {
        self.pieces
            .get(seat)
            .map(|pieces| {
                pieces
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.destination(face).is_some())
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn pass_turn(&mut self) {
        self.current_player_index = (self.current_player_index + 1) % self.pieces.len().max(1);
        self.phase = LudoPhase::AwaitingRoll;
    }

    /// Sends opponents on the landing square back to base; returns the count.
    fn capture_at(&mut self, seat: Seat, step: u8) -> usize {
        let Some(square) = track_square(seat, step) else {
            return 0;
        };
        if SAFE_SQUARES.contains(&square) {
            return 0;
        }
        let mut captured = 0;
        for (other, pieces) in self.pieces.iter_mut().enumerate() {
            if other == seat {
                continue;
            }
            for piece in pieces.iter_mut() {
                if let LudoPiece::Track(s) = *piece
                    && track_square(other, s) == Some(square)
                {
                    *piece = LudoPiece::Base;
                    captured += 1;
                }
            }
        }
        captured
    }
}

impl std::fmt::Display for LudoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (seat, pieces) in self.pieces.iter().enumerate() {
            let marker = if seat == self.current_player_index { '>' } else { ' ' };
            write!(f, "{} seat {}:", marker, seat)?;
            for piece in pieces {
                match piece {
                    LudoPiece::Base => f.write_str(" base")?,
                    LudoPiece::Track(step) => write!(f, " {}", step)?,
                    LudoPiece::Home => f.write_str(" home")?,
                }
            }
            writeln!(f)?;
        }
        match (self.phase, self.last_roll) {
            (LudoPhase::AwaitingMove, Some(face)) => write!(f, "rolled {}, move a piece", face),
            (_, Some(face)) => write!(f, "last roll {}, waiting for roll", face),
            (_, None) => f.write_str("waiting for roll"),
        }
    }
}

/// Ludo engine.
#[derive(Debug, Clone, Copy)]
pub struct Ludo;

impl RuleEngine for Ludo {
    type State = LudoState;
    type Move = LudoMove;

    const MIN_PLAYERS: usize = 2;
    const MAX_PLAYERS: usize = 4;

    fn initial_state(players: &[UserId]) -> LudoState {
        LudoState::new(players.len())
    }

    fn current_seat(state: &LudoState) -> Seat {
        state.current_player_index
    }

    #[instrument]
    fn check_terminal(state: &LudoState) -> Option<Outcome> {
        state
            .pieces
            .iter()
            .position(|pieces| pieces.iter().all(|p| *p == LudoPiece::Home))
            .map(Outcome::Winner)
    }

    #[instrument(skip(state))]
    fn place(state: &LudoState, seat: Seat, mv: &LudoMove) -> Result<LudoState, Rejection> {
        let mut next = state.clone();
        match *mv {
            LudoMove::Roll { face } => {
                if state.phase != LudoPhase::AwaitingRoll {
                    return Err(Rejection::illegal("already rolled, advance a piece"));
                }
                if !(1..=6).contains(&face) {
                    return Err(Rejection::illegal(format!("{} is not a die face", face)));
                }
                next.last_roll = Some(face);
                if next.movable_pieces(seat, face).is_empty() {
                    debug!(seat, face, "No piece can move, turn passes");
                    next.pass_turn();
                } else {
                    next.phase = LudoPhase::AwaitingMove;
                }
            }
            LudoMove::Advance { piece } => {
                let face = match (state.phase, state.last_roll) {
                    (LudoPhase::AwaitingMove, Some(face)) => face,
                    _ => return Err(Rejection::illegal("roll the die first")),
                };
                let current = next
                    .pieces
                    .get(seat)
                    .and_then(|p| p.get(piece))
                    .copied()
                    .ok_or_else(|| Rejection::illegal(format!("no piece {}", piece)))?;
                let target = current.destination(face).ok_or_else(|| {
                    Rejection::illegal(format!("piece {} cannot move {} steps", piece, face))
                })?;

                next.pieces[seat][piece] = target;
                if let LudoPiece::Track(step) = target {
                    let captured = next.capture_at(seat, step);
                    if captured > 0 {
                        debug!(seat, step, captured, "Captured opponent pieces");
                    }
                }

                if Self::check_terminal(&next).is_some() {
                    next.phase = LudoPhase::AwaitingRoll;
                } else if face == BONUS_FACE {
                    next.phase = LudoPhase::AwaitingRoll;
                } else {
                    next.pass_turn();
                }
                debug!(seat, piece, ?target, "Piece advanced");
            }
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_needs_six() {
        assert_eq!(LudoPiece::Base.destination(5), None);
        assert_eq!(LudoPiece::Base.destination(6), Some(LudoPiece::Track(0)));
    }

    #[test]
    fn test_home_needs_exact_roll() {
        assert_eq!(LudoPiece::Track(54).destination(3), Some(LudoPiece::Home));
        assert_eq!(LudoPiece::Track(54).destination(4), None);
        assert_eq!(LudoPiece::Track(50).destination(2), Some(LudoPiece::Track(52)));
    }

    #[test]
    fn test_track_square_offsets_by_seat() {
        assert_eq!(track_square(0, 0), Some(0));
        assert_eq!(track_square(1, 0), Some(13));
        assert_eq!(track_square(3, 20), Some(7));
        assert_eq!(track_square(0, 51), None);
    }

    #[test]
    fn test_consistency_checks() {
        assert!(LudoState::new(2).is_consistent());
        let past_home = LudoState::from_parts(
            vec![[LudoPiece::Track(HOME_STEP), LudoPiece::Base, LudoPiece::Base, LudoPiece::Base]],
            0,
            None,
            LudoPhase::AwaitingRoll,
        );
        assert!(!past_home.is_consistent());
        let bases = vec![[LudoPiece::Base; PIECES]; 2];
        let no_roll = LudoState::from_parts(bases.clone(), 0, None, LudoPhase::AwaitingMove);
        assert!(!no_roll.is_consistent());
        let bad_face = LudoState::from_parts(bases, 0, Some(9), LudoPhase::AwaitingRoll);
        assert!(!bad_face.is_consistent());
    }

    #[test]
    fn test_roll_die_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let face = roll_die(&mut rng);
            assert!((1..=6).contains(&face));
        }
    }
}
