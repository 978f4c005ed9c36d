//! First-class invariants for game sessions.
//!
//! Invariants are logical properties every stored or computed
//! [`GameSession`] must satisfy. Transitions check them in debug builds and
//! the store checks them on every load.

use crate::games::Outcome;
use crate::session::{GameSession, SessionStatus, Winner};
use tracing::warn;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}", description)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples of [`Invariant`]s.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! impl_invariant_set {
    ($($inv:ident),+) => {
        impl<S, $($inv: Invariant<S>),+> InvariantSet<S> for ($($inv,)+) {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let mut violations = Vec::new();
                $(
                    if !$inv::holds(state) {
                        warn!(invariant = $inv::description(), "Invariant violated");
                        violations.push(InvariantViolation::new($inv::description()));
                    }
                )+
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                }
            }
        }
    };
}

impl_invariant_set!(I1, I2);
impl_invariant_set!(I1, I2, I3);
impl_invariant_set!(I1, I2, I3, I4);
impl_invariant_set!(I1, I2, I3, I4, I5);
impl_invariant_set!(I1, I2, I3, I4, I5, I6);
impl_invariant_set!(I1, I2, I3, I4, I5, I6, I7);
impl_invariant_set!(I1, I2, I3, I4, I5, I6, I7, I8);
impl_invariant_set!(I1, I2, I3, I4, I5, I6, I7, I8, I9);

/// Player count stays within the kind's cap, and the kind is playable.
pub struct PlayerCapInvariant;

impl Invariant<GameSession> for PlayerCapInvariant {
    fn holds(session: &GameSession) -> bool {
        session
            .kind()
            .limits()
            .is_some_and(|l| session.players().len() <= l.max)
    }

    fn description() -> &'static str {
        "player count must not exceed the game's maximum"
    }
}

/// Players are unique, requests are unique, and the two never overlap.
pub struct DisjointMembershipInvariant;

impl Invariant<GameSession> for DisjointMembershipInvariant {
    fn holds(session: &GameSession) -> bool {
        let mut seen = std::collections::HashSet::new();
        session
            .players()
            .iter()
            .chain(session.join_requests().iter())
            .all(|user| seen.insert(user))
    }

    fn description() -> &'static str {
        "a user is at most once in players or join requests, never both"
    }
}

/// Game state exists exactly when the session is active or finished, and
/// matches the session's kind.
pub struct StateMatchesStatusInvariant;

impl Invariant<GameSession> for StateMatchesStatusInvariant {
    fn holds(session: &GameSession) -> bool {
        match (session.status(), session.game_state()) {
            (SessionStatus::Pending, None) => true,
            (SessionStatus::Active | SessionStatus::Finished, Some(state)) => {
                state.kind() == *session.kind()
            }
            _ => false,
        }
    }

    fn description() -> &'static str {
        "game state is present iff the session is active or finished"
    }
}

/// The seat on turn indexes a real player.
pub struct TurnIndexInvariant;

impl Invariant<GameSession> for TurnIndexInvariant {
    fn holds(session: &GameSession) -> bool {
        session.game_state().as_ref().is_none_or(|state| {
            state.current_seat() < session.players().len()
                && state.seat_count() == session.players().len()
        })
    }

    fn description() -> &'static str {
        "current player index must index into players"
    }
}

/// A winner is recorded exactly when the session is finished, and names a player.
pub struct WinnerMatchesStatusInvariant;

impl Invariant<GameSession> for WinnerMatchesStatusInvariant {
    fn holds(session: &GameSession) -> bool {
        match (session.status(), session.winner_id()) {
            (SessionStatus::Finished, Some(Winner::Draw)) => true,
            (SessionStatus::Finished, Some(Winner::Player(id))) => session.is_player(id),
            (SessionStatus::Pending | SessionStatus::Active, None) => true,
            _ => false,
        }
    }

    fn description() -> &'static str {
        "winner is set iff the session is finished"
    }
}

/// The creator holds the first seat.
pub struct CreatorSeatedFirstInvariant;

impl Invariant<GameSession> for CreatorSeatedFirstInvariant {
    fn holds(session: &GameSession) -> bool {
        session.players().first() == Some(session.created_by())
    }

    fn description() -> &'static str {
        "the creator is the first player"
    }
}

/// Only pending sessions collect join requests.
pub struct RequestsOnlyWhilePendingInvariant;

impl Invariant<GameSession> for RequestsOnlyWhilePendingInvariant {
    fn holds(session: &GameSession) -> bool {
        *session.status() == SessionStatus::Pending || session.join_requests().is_empty()
    }

    fn description() -> &'static str {
        "join requests exist only while pending"
    }
}

/// The stored position is reachable by play with the seated players.
pub struct PositionConsistencyInvariant;

impl Invariant<GameSession> for PositionConsistencyInvariant {
    fn holds(session: &GameSession) -> bool {
        session
            .game_state()
            .as_ref()
            .is_none_or(|state| state.is_consistent(session.players().len()))
    }

    fn description() -> &'static str {
        "game state must be a consistent position for the seated players"
    }
}

/// A session is finished exactly when its position is terminal, and the
/// recorded winner is the one the position implies.
pub struct OutcomeMatchesStatusInvariant;

impl Invariant<GameSession> for OutcomeMatchesStatusInvariant {
    fn holds(session: &GameSession) -> bool {
        let Some(state) = session.game_state() else {
            return true;
        };
        match (session.status(), state.outcome()) {
            (SessionStatus::Active, None) => true,
            (SessionStatus::Finished, Some(Outcome::Draw)) => {
                session.winner_id() == &Some(Winner::Draw)
            }
            (SessionStatus::Finished, Some(Outcome::Winner(seat))) => {
                match (session.players().get(seat), session.winner_id()) {
                    (Some(player), Some(Winner::Player(id))) => player == id,
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn description() -> &'static str {
        "status is finished iff the position is terminal, with the matching winner"
    }
}

/// All session invariants as a composable set.
pub type SessionInvariants = (
    PlayerCapInvariant,
    DisjointMembershipInvariant,
    StateMatchesStatusInvariant,
    TurnIndexInvariant,
    WinnerMatchesStatusInvariant,
    CreatorSeatedFirstInvariant,
    RequestsOnlyWhilePendingInvariant,
    PositionConsistencyInvariant,
    OutcomeMatchesStatusInvariant,
);
