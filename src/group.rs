//! The group aggregate: members, a message feed, and the group's games.
//!
//! A [`Group`] is the unit of persistence. Every operation takes the current
//! snapshot by reference and returns the next one, so the caller decides when
//! to write it back through a [`GroupStore`](crate::GroupStore).

use crate::games::{GameKind, GameMove};
use crate::invariants::InvariantViolation;
use crate::rejection::{Refusal, Rejection};
use crate::session::{GameSession, SessionId, SessionStatus, UserId};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Default feed length before the oldest messages are dropped.
pub const DEFAULT_MAX_MESSAGES: usize = 500;

/// A user belonging to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    id: UserId,
    display_name: String,
    #[new(value = "Utc::now()")]
    joined_at: DateTime<Utc>,
}

/// Content of a feed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MessageBody {
    /// Plain chat text.
    Text(String),
    /// Invitation to a freshly opened game.
    GameInvite {
        /// Session being advertised.
        game_id: SessionId,
        /// Kind of game.
        game_type: GameKind,
    },
}

impl std::fmt::Display for MessageBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageBody::Text(text) => f.write_str(text),
            MessageBody::GameInvite { game_id, game_type } => {
                write!(f, "opened a {} game ({})", game_type, game_id)
            }
        }
    }
}

/// One entry in the group feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: String,
    sender_id: UserId,
    sent_at: DateTime<Utc>,
    body: MessageBody,
}

impl Message {
    fn new(sender_id: &str, body: MessageBody) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id: sender_id.to_string(),
            sent_at: Utc::now(),
            body,
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.sent_at.format("%Y-%m-%d %H:%M"),
            self.sender_id,
            self.body
        )
    }
}

/// Per-group policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, Setters)]
#[serde(rename_all = "camelCase", default)]
#[setters(prefix = "with_")]
pub struct GroupSettings {
    /// When false, only members may open or join games.
    allow_guest_joins: bool,
    /// Feed cap; the oldest messages go first.
    max_messages: usize,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            allow_guest_joins: false,
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

/// A chat group and every game session it hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    id: String,
    name: String,
    #[serde(default)]
    members: Vec<Member>,
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    games: Vec<GameSession>,
    #[serde(default)]
    settings: GroupSettings,
}

impl Group {
    /// An empty group with default settings.
    #[instrument(skip(id, name), fields(group_id = %id.as_ref()))]
    pub fn new(id: impl AsRef<str>, name: impl Into<String>) -> Self {
        Self {
            id: id.as_ref().to_string(),
            name: name.into(),
            members: Vec::new(),
            messages: Vec::new(),
            games: Vec::new(),
            settings: GroupSettings::default(),
        }
    }

    /// Replaces the group's settings, trimming the feed if the cap shrank.
    pub fn with_settings(&self, settings: GroupSettings) -> Self {
        let mut next = self.clone();
        next.settings = settings;
        next.trim_feed();
        next
    }

    /// Whether `user` is a member.
    pub fn is_member(&self, user: &str) -> bool {
        self.members.iter().any(|m| m.id == user)
    }

    /// Looks up a session by id.
    ///
    /// # Errors
    ///
    /// [`Rejection::NoSuchGame`] if the group has no such session.
    pub fn game(&self, game_id: &str) -> Result<&GameSession, Rejection> {
        self.games
            .iter()
            .find(|g| g.id() == game_id)
            .ok_or_else(|| Rejection::NoSuchGame(game_id.to_string()))
    }

    /// Sessions where `user` is seated or waiting for approval.
    pub fn games_for(&self, user: &str) -> Vec<&GameSession> {
        self.games
            .iter()
            .filter(|g| g.is_player(user) || g.has_requested(user))
            .collect()
    }

    /// Sessions in the given lifecycle state.
    pub fn games_with_status(&self, status: SessionStatus) -> Vec<&GameSession> {
        self.games.iter().filter(|g| *g.status() == status).collect()
    }

    /// Checks every hosted session, prefixing violations with the game id.
    pub fn check_invariants(&self) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<InvariantViolation> = self
            .games
            .iter()
            .filter_map(|g| g.check_invariants().err().map(|v| (g.id(), v)))
            .flat_map(|(id, v)| {
                v.into_iter()
                    .map(move |violation| {
                        InvariantViolation::new(format!("game {}: {}", id, violation))
                    })
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Adds a member.
    ///
    /// # Errors
    ///
    /// [`Rejection::AlreadyJoined`] if the id is taken.
    #[instrument(skip(self, display_name), fields(group_id = %self.id))]
    pub fn add_member(&self, user: &str, display_name: impl Into<String>) -> Result<Self, Rejection> {
        if self.is_member(user) {
            return Err(Rejection::AlreadyJoined);
        }
        let mut next = self.clone();
        next.members
            .push(Member::new(user.to_string(), display_name.into()));
        info!(user, members = next.members.len(), "Member added");
        Ok(next)
    }

    /// Posts a text message to the feed.
    ///
    /// # Errors
    ///
    /// [`Rejection::NotAMember`] if the sender is not a member.
    #[instrument(skip(self, text), fields(group_id = %self.id))]
    pub fn post_message(&self, sender: &str, text: impl Into<String>) -> Result<Self, Rejection> {
        if !self.is_member(sender) {
            return Err(Rejection::NotAMember(sender.to_string()));
        }
        let mut next = self.clone();
        next.push_message(Message::new(sender, MessageBody::Text(text.into())));
        Ok(next)
    }

    /// Opens a new game and advertises it in the feed.
    ///
    /// # Errors
    ///
    /// `NOT_A_MEMBER` when guests are not allowed, or `UNKNOWN_GAME_TYPE`.
    #[instrument(skip(self), fields(group_id = %self.id))]
    pub fn open_game(&self, actor: &str, kind: GameKind) -> Result<(Self, SessionId), Rejection> {
        self.require_participant(actor)?;
        let session = GameSession::create(kind, actor)?;
        let game_id = session.id().clone();

        let mut next = self.clone();
        next.games.push(session);
        next.push_message(Message::new(
            actor,
            MessageBody::GameInvite {
                game_id: game_id.clone(),
                game_type: kind,
            },
        ));
        info!(%game_id, %kind, "Game opened");
        Ok((next, game_id))
    }

    /// Asks to join a game.
    #[instrument(skip(self), fields(group_id = %self.id))]
    pub fn request_join(&self, game_id: &str, user: &str) -> Result<Self, Rejection> {
        self.require_participant(user)?;
        self.update_game(game_id, |g| g.request_join(user))
    }

    /// Creator approves a join request.
    ///
    /// A request dropped because the game filled up still yields an amended
    /// group in the refusal.
    #[instrument(skip(self), fields(group_id = %self.id))]
    pub fn approve_join(&self, game_id: &str, actor: &str, user: &str) -> Result<Self, Refusal<Self>> {
        let session = self.game(game_id)?;
        match session.approve_join(actor, user) {
            Ok(next) => Ok(self.replace_game(next)),
            Err(refusal) => Err(refusal.map(|amended| self.replace_game(amended))),
        }
    }

    /// Dismisses or withdraws a join request.
    #[instrument(skip(self), fields(group_id = %self.id))]
    pub fn dismiss_request(&self, game_id: &str, actor: &str, user: &str) -> Result<Self, Rejection> {
        self.update_game(game_id, |g| g.dismiss_request(actor, user))
    }

    /// Leaves a pending game.
    #[instrument(skip(self), fields(group_id = %self.id))]
    pub fn leave_game(&self, game_id: &str, actor: &str) -> Result<Self, Rejection> {
        self.update_game(game_id, |g| g.leave(actor))
    }

    /// Creator starts a game.
    #[instrument(skip(self), fields(group_id = %self.id))]
    pub fn start_game(&self, game_id: &str, actor: &str) -> Result<Self, Rejection> {
        self.update_game(game_id, |g| g.start(actor))
    }

    /// Plays a move in an active game.
    #[instrument(skip(self), fields(group_id = %self.id))]
    pub fn play_move(&self, game_id: &str, actor: &str, mv: &GameMove) -> Result<Self, Rejection> {
        self.update_game(game_id, |g| g.play(actor, mv))
    }

    fn require_participant(&self, user: &str) -> Result<(), Rejection> {
        if !self.settings.allow_guest_joins && !self.is_member(user) {
            warn!(user, "Guest refused, guest joins disabled");
            return Err(Rejection::NotAMember(user.to_string()));
        }
        Ok(())
    }

    fn update_game(
        &self,
        game_id: &str,
        f: impl FnOnce(&GameSession) -> Result<GameSession, Rejection>,
    ) -> Result<Self, Rejection> {
        let session = self.game(game_id)?;
        Ok(self.replace_game(f(session)?))
    }

    fn replace_game(&self, session: GameSession) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.games.iter_mut().find(|g| g.id() == session.id()) {
            *slot = session;
        }
        next
    }

    fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.trim_feed();
    }

    fn trim_feed(&mut self) {
        let excess = self.messages.len().saturating_sub(self.settings.max_messages);
        if excess > 0 {
            debug!(excess, "Dropping oldest messages");
            self.messages.drain(..excess);
        }
    }
}
