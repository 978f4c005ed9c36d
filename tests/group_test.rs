//! Tests for the group aggregate.

use group_games::{
    GameKind, GameMove, Group, GroupSettings, MessageBody, Position, Rejection, SessionStatus,
    Winner,
};

fn group() -> Group {
    Group::new("g1", "Friday night")
        .add_member("alice", "Alice")
        .and_then(|g| g.add_member("bob", "Bob"))
        .and_then(|g| g.add_member("carol", "Carol"))
        .expect("fresh members")
}

#[test]
fn test_full_tictactoe_game_in_group() {
    let (group, game) = group().open_game("alice", GameKind::TicTacToe).expect("opens");
    let group = group.request_join(&game, "bob").expect("request");
    let group = group.approve_join(&game, "alice", "bob").expect("approved");
    let mut group = group.start_game(&game, "alice").expect("started");

    let moves = [
        ("alice", Position::Center),
        ("bob", Position::TopLeft),
        ("alice", Position::TopRight),
        ("bob", Position::BottomRight),
        ("alice", Position::BottomLeft),
    ];
    for (actor, pos) in moves {
        group = group
            .play_move(&game, actor, &GameMove::TicTacToe(pos))
            .expect("legal move");
    }

    let session = group.game(&game).expect("exists");
    assert_eq!(*session.status(), SessionStatus::Finished);
    assert_eq!(session.winner_id(), &Some(Winner::Player("alice".to_string())));
}

#[test]
fn test_approve_after_full_carries_amended_group() {
    let (group, game) = group().open_game("alice", GameKind::ConnectFour).expect("opens");
    let group = group
        .request_join(&game, "bob")
        .and_then(|g| g.request_join(&game, "carol"))
        .expect("requests");
    let group = group.approve_join(&game, "alice", "bob").expect("approved");

    let refusal = group.approve_join(&game, "alice", "carol").unwrap_err();
    assert_eq!(refusal.reason(), &Rejection::GameFull { max: 2 });

    let amended = refusal.amended().expect("request dropped");
    let session = amended.game(&game).expect("exists");
    assert!(!session.has_requested("carol"));
    assert_eq!(session.players().len(), 2);
    // Everything else about the group is untouched.
    assert_eq!(amended.members(), group.members());
    assert_eq!(amended.messages(), group.messages());
}

#[test]
fn test_operations_on_unknown_game() {
    let group = group();
    let missing = Rejection::NoSuchGame("missing".to_string());
    assert_eq!(group.request_join("missing", "bob"), Err(missing.clone()));
    assert_eq!(group.leave_game("missing", "bob"), Err(missing.clone()));
    assert_eq!(
        group.approve_join("missing", "alice", "bob").unwrap_err().reason(),
        &missing
    );
}

#[test]
fn test_guests_excluded_by_default() {
    let (group, game) = group().open_game("alice", GameKind::Ludo).expect("opens");
    assert_eq!(
        group.request_join(&game, "mallory"),
        Err(Rejection::NotAMember("mallory".to_string()))
    );
    assert_eq!(
        group.post_message("mallory", "hi"),
        Err(Rejection::NotAMember("mallory".to_string()))
    );

    let open = group.with_settings(GroupSettings::default().with_allow_guest_joins(true));
    let open = open.request_join(&game, "mallory").expect("guest allowed");
    assert!(open.game(&game).expect("exists").has_requested("mallory"));
}

#[test]
fn test_games_for_user() {
    let (group, first) = group().open_game("alice", GameKind::TicTacToe).expect("opens");
    let (group, second) = group.open_game("bob", GameKind::Ludo).expect("opens");
    let group = group.request_join(&second, "carol").expect("request");

    let ids = |user: &str| -> Vec<String> {
        group.games_for(user).iter().map(|g| g.id().clone()).collect()
    };
    assert_eq!(ids("alice"), vec![first.clone()]);
    assert_eq!(ids("carol"), vec![second.clone()]);
    assert!(ids("dave").is_empty());
    assert_eq!(group.games_with_status(SessionStatus::Pending).len(), 2);
}

#[test]
fn test_feed_records_invites() {
    let group = group().post_message("bob", "anyone?").expect("posted");
    let (group, game) = group.open_game("carol", GameKind::ConnectFour).expect("opens");

    let bodies: Vec<&MessageBody> = group.messages().iter().map(|m| m.body()).collect();
    assert_eq!(
        bodies,
        vec![
            &MessageBody::Text("anyone?".to_string()),
            &MessageBody::GameInvite {
                game_id: game,
                game_type: GameKind::ConnectFour,
            },
        ]
    );
    assert_eq!(group.messages()[1].sender_id(), "carol");
}

#[test]
fn test_group_json_shape() {
    let json = serde_json::to_value(group()).expect("serializes");
    assert_eq!(json["id"], "g1");
    assert_eq!(json["members"][0]["displayName"], "Alice");
    assert!(json["members"][0]["joinedAt"].is_string());
    assert_eq!(json["settings"]["allowGuestJoins"], false);
    assert_eq!(json["settings"]["maxMessages"], 500);
}

#[test]
fn test_settings_default_when_missing() {
    let group: Group =
        serde_json::from_str(r#"{"id":"g2","name":"Old group"}"#).expect("parses");
    assert_eq!(group.settings(), &GroupSettings::default());
    assert!(group.games().is_empty());
}
