//! Group Games library - turn-based mini-games hosted inside a chat group
//!
//! A group holds members, a message feed and any number of game sessions.
//! Sessions move through `pending → active → finished`; every transition is a
//! pure function returning a new snapshot or a typed [`Rejection`].
//!
//! # Architecture
//!
//! - **Games**: stateless rule engines (tic-tac-toe, connect-four, ludo)
//!   behind the [`RuleEngine`] trait, dispatched through [`GameState`]
//! - **Session**: the lifecycle state machine for one game
//! - **Group**: the aggregate that is loaded and saved as a whole
//! - **Store**: JSON persistence of a group under a single key
//!
//! # Example
//!
//! ```
//! use group_games::{GameKind, GameMove, Group, Position};
//!
//! # fn example() -> Result<(), group_games::Rejection> {
//! let group = Group::new("g1", "Friday night")
//!     .add_member("alice", "Alice")?
//!     .add_member("bob", "Bob")?;
//! let (group, game) = group.open_game("alice", GameKind::TicTacToe)?;
//! let group = group.request_join(&game, "bob")?;
//! let group = group.approve_join(&game, "alice", "bob").map_err(|r| r.reason().clone())?;
//! let group = group.start_game(&game, "alice")?;
//! let group = group.play_move(&game, "alice", &GameMove::TicTacToe(Position::Center))?;
//! assert_eq!(group.game(&game)?.current_player().map(String::as_str), Some("bob"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod games;
mod group;
mod invariants;
mod rejection;
mod session;
mod store;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, DATA_DIR_ENV};

// Crate-level exports - Rule engines
pub use games::{
    Board, ConnectFour, ConnectFourState, GameKind, GameMove, GameState, Ludo, LudoMove, LudoPhase,
    LudoPiece, LudoState, Outcome, PlayerLimits, Position, RuleEngine, Seat, TicTacToe,
    TicTacToeState,
};
pub use games::{connect_four, ludo, tictactoe};

// Crate-level exports - Lifecycle
pub use rejection::{Refusal, Rejection};
pub use session::{DRAW_SENTINEL, GameSession, SessionId, SessionStatus, UserId, Winner};

// Crate-level exports - Invariants
pub use invariants::{
    CreatorSeatedFirstInvariant, DisjointMembershipInvariant, Invariant, InvariantSet,
    InvariantViolation, OutcomeMatchesStatusInvariant, PlayerCapInvariant,
    PositionConsistencyInvariant, RequestsOnlyWhilePendingInvariant, SessionInvariants,
    StateMatchesStatusInvariant, TurnIndexInvariant, WinnerMatchesStatusInvariant,
};

// Crate-level exports - Group aggregate
pub use group::{DEFAULT_MAX_MESSAGES, Group, GroupSettings, Member, Message, MessageBody};

// Crate-level exports - Persistence
pub use store::{FileStore, GroupStore, KeyValueStore, MemoryStore, StoreError};
