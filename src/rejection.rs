//! Typed rejections for lifecycle and rule-engine operations.
//!
//! A rejection is an expected business outcome, not a failure of the
//! program. Every lifecycle transition and every move returns one of these
//! instead of panicking, and the caller turns it into user-facing feedback.

use crate::games::GameKind;
use crate::session::{SessionId, SessionStatus, UserId};

/// Reason a requested transition or move was refused.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Rejection {
    /// The session is not in a lifecycle state that allows the operation.
    #[display("Session is {}, operation not allowed", _0)]
    WrongStatus(SessionStatus),

    /// The actor lacks the role the operation requires (usually creator).
    #[display("Only the session creator can do that")]
    NotAuthorized,

    /// The session already has its maximum number of players.
    #[display("Game is full ({} players max)", max)]
    GameFull {
        /// Player cap for the game kind.
        max: usize,
    },

    /// The user already has a pending join request.
    #[display("A join request is already pending")]
    AlreadyRequested,

    /// The user is already seated in the session (or already a group member).
    #[display("Already joined")]
    AlreadyJoined,

    /// There is no pending join request for the user.
    #[display("No join request from {}", _0)]
    NoSuchRequest(UserId),

    /// The session does not have enough players to start.
    #[display("Need at least {} players, have {}", min, found)]
    NotEnoughPlayers {
        /// Minimum player count for the game kind.
        min: usize,
        /// Current player count.
        found: usize,
    },

    /// The actor is neither a player nor a requester in the session.
    #[display("Not a participant in this session")]
    NotAPlayer,

    /// It is another player's turn.
    #[display("Not your turn, waiting for {}", expected)]
    NotYourTurn {
        /// Player whose turn it is.
        expected: UserId,
    },

    /// The move is not legal in the current position.
    #[display("Illegal move: {}", _0)]
    IllegalMove(String),

    /// The game kind has no rule engine.
    #[display("Game type {} is not available", _0)]
    UnknownGameType(GameKind),

    /// No session with the given id exists in the group.
    #[display("No game with id {}", _0)]
    NoSuchGame(SessionId),

    /// The actor is not a member of the group.
    #[display("{} is not a member of this group", _0)]
    NotAMember(UserId),
}

impl std::error::Error for Rejection {}

impl Rejection {
    /// Creates an [`Rejection::IllegalMove`] with the given reason.
    pub fn illegal(reason: impl Into<String>) -> Self {
        Self::IllegalMove(reason.into())
    }

    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::WrongStatus(_) => "WRONG_STATUS",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::GameFull { .. } => "GAME_FULL",
            Self::AlreadyRequested => "ALREADY_REQUESTED",
            Self::AlreadyJoined => "ALREADY_JOINED",
            Self::NoSuchRequest(_) => "NO_SUCH_REQUEST",
            Self::NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
            Self::NotAPlayer => "NOT_A_PLAYER",
            Self::NotYourTurn { .. } => "NOT_YOUR_TURN",
            Self::IllegalMove(_) => "ILLEGAL_MOVE",
            Self::UnknownGameType(_) => "UNKNOWN_GAME_TYPE",
            Self::NoSuchGame(_) => "NO_SUCH_GAME",
            Self::NotAMember(_) => "NOT_A_MEMBER",
        }
    }
}

/// A rejection that may still have produced state the caller must persist.
///
/// Approving a join request on a session that has since filled up drops the
/// stale request. The cleaned snapshot travels in `amended` alongside the
/// reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Refusal<T> {
    reason: Rejection,
    amended: Option<T>,
}

impl<T> Refusal<T> {
    /// A refusal with nothing to persist.
    pub fn new(reason: Rejection) -> Self {
        Self {
            reason,
            amended: None,
        }
    }

    /// A refusal carrying an amended snapshot.
    pub fn with_amended(reason: Rejection, amended: T) -> Self {
        Self {
            reason,
            amended: Some(amended),
        }
    }

    /// Why the operation was refused.
    pub fn reason(&self) -> &Rejection {
        &self.reason
    }

    /// Snapshot to persist despite the refusal, if any.
    pub fn amended(&self) -> Option<&T> {
        self.amended.as_ref()
    }

    /// Splits into reason and amended snapshot.
    pub fn into_parts(self) -> (Rejection, Option<T>) {
        (self.reason, self.amended)
    }

    /// Maps the amended snapshot, keeping the reason.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Refusal<U> {
        Refusal {
            reason: self.reason,
            amended: self.amended.map(f),
        }
    }
}

impl<T> From<Rejection> for Refusal<T> {
    fn from(reason: Rejection) -> Self {
        Self::new(reason)
    }
}

impl<T> std::fmt::Display for Refusal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl<T: std::fmt::Debug> std::error::Error for Refusal<T> {}
