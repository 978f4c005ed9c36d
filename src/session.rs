//! Game session lifecycle.
//!
//! A [`GameSession`] moves forward through `pending → active → finished`.
//! Every transition is a pure function: it borrows the current snapshot and
//! returns either a new snapshot or a [`Rejection`]. Nothing is mutated in
//! place, so callers can persist the returned value wholesale.

use crate::games::{GameKind, GameMove, GameState, Outcome, PlayerLimits};
use crate::invariants::{InvariantSet, InvariantViolation, SessionInvariants};
use crate::rejection::{Refusal, Rejection};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Unique identifier for a user.
pub type UserId = String;

/// Sentinel stored in `winnerId` when a game ends level.
pub const DRAW_SENTINEL: &str = "draw";

/// Lifecycle state of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    /// Accepting players, not started.
    Pending,
    /// In progress.
    Active,
    /// Terminal.
    Finished,
}

/// How a finished session ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Winner {
    /// This user won.
    Player(UserId),
    /// Nobody won.
    Draw,
}

impl From<String> for Winner {
    fn from(value: String) -> Self {
        if value == DRAW_SENTINEL {
            Winner::Draw
        } else {
            Winner::Player(value)
        }
    }
}

impl From<Winner> for String {
    fn from(value: Winner) -> Self {
        match value {
            Winner::Player(id) => id,
            Winner::Draw => DRAW_SENTINEL.to_string(),
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::Player(id) => write!(f, "{} wins", id),
            Winner::Draw => write!(f, "Draw"),
        }
    }
}

/// One instance of a mini-game being set up, played or concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    /// Session id.
    id: SessionId,
    /// Game kind.
    #[serde(rename = "type")]
    kind: GameKind,
    /// User who opened the session.
    created_by: UserId,
    /// When the session was opened.
    created_at: DateTime<Utc>,
    /// Seated players in turn order.
    players: Vec<UserId>,
    /// Lifecycle state.
    status: SessionStatus,
    /// Users waiting for approval.
    #[serde(default)]
    join_requests: Vec<UserId>,
    /// Set once finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    winner_id: Option<Winner>,
    /// Set once active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    game_state: Option<GameState>,
}

impl GameSession {
    /// Opens a new pending session with the creator in the first seat.
    ///
    /// # Errors
    ///
    /// [`Rejection::UnknownGameType`] if `kind` has no rule engine.
    #[instrument(skip(creator), fields(creator = %creator.as_ref()))]
    pub fn create(kind: GameKind, creator: impl AsRef<str>) -> Result<Self, Rejection> {
        if !kind.is_playable() {
            warn!(%kind, "Refusing to create unimplemented game");
            return Err(Rejection::UnknownGameType(kind));
        }
        let creator = creator.as_ref().to_string();
        let session = Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            created_by: creator.clone(),
            created_at: Utc::now(),
            players: vec![creator],
            status: SessionStatus::Pending,
            join_requests: Vec::new(),
            winner_id: None,
            game_state: None,
        };
        info!(session_id = %session.id, %kind, "Created game session");
        Ok(session)
    }

    /// Player limits for this session's game kind.
    pub fn limits(&self) -> Result<PlayerLimits, Rejection> {
        self.kind
            .limits()
            .ok_or(Rejection::UnknownGameType(self.kind))
    }

    /// Whether the player cap has been reached.
    pub fn is_full(&self) -> bool {
        self.limits()
            .map(|l| self.players.len() >= l.max)
            .unwrap_or(true)
    }

    /// Whether `user` holds a seat.
    pub fn is_player(&self, user: &str) -> bool {
        self.players.iter().any(|p| p == user)
    }

    /// Whether `user` has a pending request.
    pub fn has_requested(&self, user: &str) -> bool {
        self.join_requests.iter().any(|p| p == user)
    }

    /// User whose turn it is, while active.
    pub fn current_player(&self) -> Option<&UserId> {
        match (&self.status, &self.game_state) {
            (SessionStatus::Active, Some(state)) => self.players.get(state.current_seat()),
            _ => None,
        }
    }

    /// Runs every data-model invariant against this snapshot.
    pub fn check_invariants(&self) -> Result<(), Vec<InvariantViolation>> {
        SessionInvariants::check_all(self)
    }

    fn require_status(&self, status: SessionStatus) -> Result<(), Rejection> {
        if self.status != status {
            warn!(session_id = %self.id, expected = %status, actual = %self.status, "Wrong status");
            return Err(Rejection::WrongStatus(self.status));
        }
        Ok(())
    }

    fn require_creator(&self, actor: &str) -> Result<(), Rejection> {
        if self.created_by != actor {
            warn!(session_id = %self.id, actor, "Actor is not the creator");
            return Err(Rejection::NotAuthorized);
        }
        Ok(())
    }

    fn without_request(&self, user: &str) -> Self {
        let mut next = self.clone();
        next.join_requests.retain(|u| u != user);
        next
    }

    /// Hands the successor snapshot back after checking invariants in debug builds.
    fn settle(next: Self) -> Self {
        debug_assert!(
            next.check_invariants().is_ok(),
            "session invariants violated: {:?}",
            next.check_invariants()
        );
        next
    }

    /// Asks to join a pending session.
    ///
    /// # Errors
    ///
    /// `WRONG_STATUS`, `ALREADY_JOINED`, `ALREADY_REQUESTED` or `GAME_FULL`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn request_join(&self, user: &str) -> Result<Self, Rejection> {
        self.require_status(SessionStatus::Pending)?;
        if self.is_player(user) {
            return Err(Rejection::AlreadyJoined);
        }
        if self.has_requested(user) {
            return Err(Rejection::AlreadyRequested);
        }
        let limits = self.limits()?;
        if self.players.len() >= limits.max {
            warn!(user, max = limits.max, "Join request on full session");
            return Err(Rejection::GameFull { max: limits.max });
        }

        let mut next = self.clone();
        next.join_requests.push(user.to_string());
        info!(user, pending = next.join_requests.len(), "Join requested");
        Ok(Self::settle(next))
    }

    /// Creator approves a pending request, seating the user.
    ///
    /// If the session filled up after the request was made, the request is
    /// dropped and the refusal carries the cleaned snapshot.
    ///
    /// # Errors
    ///
    /// `WRONG_STATUS`, `NOT_AUTHORIZED`, `NO_SUCH_REQUEST` or `GAME_FULL`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn approve_join(&self, actor: &str, user: &str) -> Result<Self, Refusal<Self>> {
        self.require_status(SessionStatus::Pending)?;
        self.require_creator(actor)?;
        if !self.has_requested(user) {
            return Err(Rejection::NoSuchRequest(user.to_string()).into());
        }
        let limits = self.limits()?;
        if self.players.len() >= limits.max {
            warn!(user, max = limits.max, "Session filled before approval, dropping request");
            return Err(Refusal::with_amended(
                Rejection::GameFull { max: limits.max },
                Self::settle(self.without_request(user)),
            ));
        }

        let mut next = self.without_request(user);
        next.players.push(user.to_string());
        info!(user, players = next.players.len(), "Join approved");
        Ok(Self::settle(next))
    }

    /// Removes a pending request. The creator may dismiss anyone; a
    /// requester may withdraw their own.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn dismiss_request(&self, actor: &str, user: &str) -> Result<Self, Rejection> {
        self.require_status(SessionStatus::Pending)?;
        if actor != user {
            self.require_creator(actor)?;
        }
        if !self.has_requested(user) {
            return Err(Rejection::NoSuchRequest(user.to_string()));
        }
        debug!(user, "Join request dismissed");
        Ok(Self::settle(self.without_request(user)))
    }

    /// Leaves a pending session, or withdraws a pending request.
    ///
    /// The creator cannot leave their own session.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn leave(&self, actor: &str) -> Result<Self, Rejection> {
        self.require_status(SessionStatus::Pending)?;
        if self.has_requested(actor) {
            debug!(actor, "Request withdrawn by leaving");
            return Ok(Self::settle(self.without_request(actor)));
        }
        if !self.is_player(actor) {
            return Err(Rejection::NotAPlayer);
        }
        if self.created_by == actor {
            warn!(actor, "Creator tried to leave");
            return Err(Rejection::NotAuthorized);
        }

        let mut next = self.clone();
        next.players.retain(|p| p != actor);
        info!(actor, players = next.players.len(), "Player left");
        Ok(Self::settle(next))
    }

    /// Creator starts the game once enough players are seated.
    ///
    /// Outstanding join requests are discarded.
    ///
    /// # Errors
    ///
    /// `WRONG_STATUS`, `NOT_AUTHORIZED` or `NOT_ENOUGH_PLAYERS`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn start(&self, actor: &str) -> Result<Self, Rejection> {
        self.require_status(SessionStatus::Pending)?;
        self.require_creator(actor)?;
        let limits = self.limits()?;
        if self.players.len() < limits.min {
            return Err(Rejection::NotEnoughPlayers {
                min: limits.min,
                found: self.players.len(),
            });
        }

        let mut next = self.clone();
        next.game_state = Some(self.kind.initial_state(&self.players)?);
        next.status = SessionStatus::Active;
        next.join_requests.clear();
        info!(players = ?next.players, "Game started");
        Ok(Self::settle(next))
    }

    /// Plays a move; a terminal position finishes the session.
    ///
    /// # Errors
    ///
    /// `WRONG_STATUS`, `NOT_YOUR_TURN` or `ILLEGAL_MOVE`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn play(&self, actor: &str, mv: &GameMove) -> Result<Self, Rejection> {
        self.require_status(SessionStatus::Active)?;
        let state = self
            .game_state
            .as_ref()
            .ok_or_else(|| Rejection::illegal("active session has no game state"))?;
        let new_state = state.apply(&self.players, actor, mv).inspect_err(|e| {
            warn!(actor, code = e.code(), error = %e, "Move rejected");
        })?;

        let mut next = self.clone();
        if let Some(outcome) = new_state.outcome() {
            let winner = match outcome {
                Outcome::Winner(seat) => Winner::Player(
                    self.players
                        .get(seat)
                        .cloned()
                        .ok_or_else(|| Rejection::illegal("winning seat has no player"))?,
                ),
                Outcome::Draw => Winner::Draw,
            };
            info!(%winner, "Game finished");
            next.winner_id = Some(winner);
            next.status = SessionStatus::Finished;
        }
        next.game_state = Some(new_state);
        Ok(Self::settle(next))
    }
}

impl std::fmt::Display for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} [{}] {}", self.kind, self.status, self.id)?;
        writeln!(f, "players: {}", self.players.join(", "))?;
        if !self.join_requests.is_empty() {
            writeln!(f, "requests: {}", self.join_requests.join(", "))?;
        }
        if let Some(state) = &self.game_state {
            writeln!(f, "{}", state)?;
        }
        if let Some(player) = self.current_player() {
            writeln!(f, "to move: {}", player)?;
        }
        if let Some(winner) = &self.winner_id {
            writeln!(f, "{}", winner)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_sentinel_round_trip() {
        let json = serde_json::to_string(&Winner::Draw).expect("serializes");
        assert_eq!(json, "\"draw\"");
        let back: Winner = serde_json::from_str("\"alice\"").expect("parses");
        assert_eq!(back, Winner::Player("alice".to_string()));
    }

    #[test]
    fn test_status_orders_forward() {
        assert!(SessionStatus::Pending < SessionStatus::Active);
        assert!(SessionStatus::Active < SessionStatus::Finished);
    }

    #[test]
    fn test_pending_session_has_no_state() {
        let session = GameSession::create(GameKind::TicTacToe, "alice").expect("playable");
        assert!(session.game_state().is_none());
        assert!(session.current_player().is_none());
        assert!(session.check_invariants().is_ok());
    }

    #[test]
    fn test_requester_withdraws_own_request() {
        let session = GameSession::create(GameKind::Ludo, "alice")
            .and_then(|s| s.request_join("bob"))
            .expect("request accepted");
        let session = session.dismiss_request("bob", "bob").expect("withdraw allowed");
        assert!(session.join_requests().is_empty());
    }

    #[test]
    fn test_other_user_cannot_dismiss() {
        let session = GameSession::create(GameKind::Ludo, "alice")
            .and_then(|s| s.request_join("bob"))
            .expect("request accepted");
        assert_eq!(
            session.dismiss_request("carol", "bob"),
            Err(Rejection::NotAuthorized)
        );
    }
}
