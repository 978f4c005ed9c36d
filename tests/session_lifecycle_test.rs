//! Tests for the session lifecycle state machine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use group_games::{
    GameKind, GameMove, GameSession, LudoMove, Position, Rejection, SessionStatus, Winner,
};

/// Opens a session for `players[0]`, seats the rest, and starts it.
fn active(kind: GameKind, players: &[&str]) -> GameSession {
    let creator = players[0];
    let mut session = GameSession::create(kind, creator).expect("playable kind");
    for user in &players[1..] {
        session = session.request_join(user).expect("request accepted");
        session = session.approve_join(creator, user).expect("approval accepted");
    }
    session.start(creator).expect("enough players")
}

#[test]
fn test_create_seats_creator() {
    let session = GameSession::create(GameKind::ConnectFour, "alice").expect("playable");
    assert_eq!(*session.status(), SessionStatus::Pending);
    assert_eq!(session.players(), &vec!["alice".to_string()]);
    assert_eq!(session.created_by(), "alice");
    assert!(session.join_requests().is_empty());
}

#[test]
fn test_create_placeholder_kind_rejected() {
    for kind in [GameKind::Chess, GameKind::Checkers, GameKind::SnakesAndLadders] {
        assert_eq!(
            GameSession::create(kind, "alice"),
            Err(Rejection::UnknownGameType(kind))
        );
    }
}

#[test]
fn test_request_join_rejections() {
    let session = GameSession::create(GameKind::TicTacToe, "alice").expect("playable");
    assert_eq!(session.request_join("alice"), Err(Rejection::AlreadyJoined));

    let session = session.request_join("bob").expect("first request");
    assert_eq!(session.request_join("bob"), Err(Rejection::AlreadyRequested));

    let full = session.approve_join("alice", "bob").expect("approved");
    assert_eq!(full.request_join("carol"), Err(Rejection::GameFull { max: 2 }));
}

#[test]
fn test_approve_requires_creator() {
    let session = GameSession::create(GameKind::Ludo, "alice")
        .and_then(|s| s.request_join("bob"))
        .expect("request accepted");
    let refusal = session.approve_join("bob", "bob").unwrap_err();
    assert_eq!(refusal.reason(), &Rejection::NotAuthorized);
    assert!(refusal.amended().is_none());
}

#[test]
fn test_approve_unknown_request() {
    let session = GameSession::create(GameKind::Ludo, "alice").expect("playable");
    let refusal = session.approve_join("alice", "zed").unwrap_err();
    assert_eq!(refusal.reason().code(), "NO_SUCH_REQUEST");
}

#[test]
fn test_approve_on_full_session_drops_request() {
    let session = GameSession::create(GameKind::TicTacToe, "alice")
        .and_then(|s| s.request_join("bob"))
        .and_then(|s| s.request_join("carol"))
        .expect("both requests accepted");
    let session = session.approve_join("alice", "bob").expect("bob seated");

    let (reason, amended) = session.approve_join("alice", "carol").unwrap_err().into_parts();
    assert_eq!(reason, Rejection::GameFull { max: 2 });
    let amended = amended.expect("request dropped");
    assert!(!amended.has_requested("carol"));
    assert_eq!(amended.players().len(), 2);
    assert!(amended.check_invariants().is_ok());
}

#[test]
fn test_random_join_sequences_respect_cap() {
    let users = ["bob", "carol", "dave", "erin", "frank", "grace"];
    let mut rng = StdRng::seed_from_u64(7);

    for kind in [GameKind::TicTacToe, GameKind::ConnectFour, GameKind::Ludo] {
        let max = kind.limits().expect("playable").max;
        let mut session = GameSession::create(kind, "alice").expect("playable");

        for _ in 0..200 {
            let user = users[rng.gen_range(0..users.len())];
            let next = match rng.gen_range(0..4) {
                0 | 1 => session.request_join(user).ok(),
                2 => match session.approve_join("alice", user) {
                    Ok(next) => Some(next),
                    Err(refusal) => refusal.into_parts().1,
                },
                _ => session.leave(user).ok(),
            };
            if let Some(next) = next {
                session = next;
            }

            assert!(session.players().len() <= max);
            assert!(
                session
                    .players()
                    .iter()
                    .all(|p| !session.join_requests().contains(p))
            );
            assert!(session.check_invariants().is_ok());
        }
    }
}

#[test]
fn test_start_below_minimum_rejected() {
    let session = GameSession::create(GameKind::Ludo, "alice").expect("playable");
    assert_eq!(
        session.start("alice"),
        Err(Rejection::NotEnoughPlayers { min: 2, found: 1 })
    );

    let session = session
        .request_join("bob")
        .expect("request")
        .approve_join("alice", "bob")
        .expect("approved");
    let started = session.start("alice").expect("minimum reached");
    assert_eq!(*started.status(), SessionStatus::Active);
    assert!(started.game_state().is_some());
    assert_eq!(started.current_player().map(String::as_str), Some("alice"));
}

#[test]
fn test_start_above_minimum_accepted() {
    let session = active(GameKind::Ludo, &["alice", "bob", "carol", "dave"]);
    assert_eq!(*session.status(), SessionStatus::Active);
    assert_eq!(session.players().len(), 4);
}

#[test]
fn test_start_only_by_creator_and_once() {
    let session = GameSession::create(GameKind::TicTacToe, "alice")
        .and_then(|s| s.request_join("bob"))
        .expect("request");
    let session = session.approve_join("alice", "bob").expect("approved");
    assert_eq!(session.start("bob"), Err(Rejection::NotAuthorized));

    let started = session.start("alice").expect("started");
    assert_eq!(
        started.start("alice"),
        Err(Rejection::WrongStatus(SessionStatus::Active))
    );
    assert_eq!(
        started.request_join("carol"),
        Err(Rejection::WrongStatus(SessionStatus::Active))
    );
}

#[test]
fn test_start_discards_outstanding_requests() {
    let session = GameSession::create(GameKind::Ludo, "alice")
        .and_then(|s| s.request_join("bob"))
        .and_then(|s| s.request_join("carol"))
        .expect("requests");
    let session = session.approve_join("alice", "bob").expect("approved");
    assert!(session.has_requested("carol"));

    let started = session.start("alice").expect("started");
    assert!(started.join_requests().is_empty());
}

#[test]
fn test_leave_rules() {
    let session = GameSession::create(GameKind::Ludo, "alice")
        .and_then(|s| s.request_join("bob"))
        .and_then(|s| s.request_join("carol"))
        .expect("requests");
    let session = session.approve_join("alice", "bob").expect("approved");

    assert_eq!(session.leave("alice"), Err(Rejection::NotAuthorized));
    assert_eq!(session.leave("zed"), Err(Rejection::NotAPlayer));

    let session = session.leave("carol").expect("request withdrawn");
    assert!(!session.has_requested("carol"));

    let session = session.leave("bob").expect("player left");
    assert_eq!(session.players(), &vec!["alice".to_string()]);
}

#[test]
fn test_out_of_turn_move_rejected_for_every_game() {
    let cases = [
        (GameKind::TicTacToe, GameMove::TicTacToe(Position::Center)),
        (GameKind::ConnectFour, GameMove::ConnectFour(3)),
        // Off-board column is still reported as a turn violation first.
        (GameKind::ConnectFour, GameMove::ConnectFour(99)),
        (GameKind::Ludo, GameMove::Ludo(LudoMove::Roll { face: 4 })),
        (GameKind::Ludo, GameMove::Ludo(LudoMove::Advance { piece: 2 })),
    ];

    for (kind, mv) in cases {
        let session = active(kind, &["alice", "bob"]);
        for actor in ["bob", "mallory"] {
            assert_eq!(
                session.play(actor, &mv),
                Err(Rejection::NotYourTurn {
                    expected: "alice".to_string()
                }),
                "{} by {}",
                kind,
                actor
            );
        }
    }
}

#[test]
fn test_move_before_start_rejected() {
    let session = GameSession::create(GameKind::TicTacToe, "alice").expect("playable");
    assert_eq!(
        session.play("alice", &GameMove::TicTacToe(Position::Center)),
        Err(Rejection::WrongStatus(SessionStatus::Pending))
    );
}

#[test]
fn test_win_finishes_session() {
    let mut session = active(GameKind::TicTacToe, &["alice", "bob"]);
    let moves = [
        ("alice", Position::TopLeft),
        ("bob", Position::MiddleLeft),
        ("alice", Position::TopCenter),
        ("bob", Position::Center),
        ("alice", Position::TopRight),
    ];
    for (actor, pos) in moves {
        session = session
            .play(actor, &GameMove::TicTacToe(pos))
            .expect("legal move");
    }

    assert_eq!(*session.status(), SessionStatus::Finished);
    assert_eq!(session.winner_id(), &Some(Winner::Player("alice".to_string())));
    assert!(session.current_player().is_none());
    assert_eq!(
        session.play("bob", &GameMove::TicTacToe(Position::BottomLeft)),
        Err(Rejection::WrongStatus(SessionStatus::Finished))
    );
    assert!(session.check_invariants().is_ok());
}
