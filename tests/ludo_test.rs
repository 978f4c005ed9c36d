//! Tests for the ludo rule engine.

use group_games::ludo::{HOME_STEP, track_square};
use group_games::{
    GameKind, GameMove, GameSession, GameState, Ludo, LudoMove, LudoPhase, LudoPiece, LudoState,
    Outcome, Rejection, RuleEngine,
};

use LudoPiece::{Base, Home, Track};

fn players() -> Vec<String> {
    vec!["ann".to_string(), "ben".to_string()]
}

fn roll(face: u8) -> LudoMove {
    LudoMove::Roll { face }
}

fn advance(piece: usize) -> LudoMove {
    LudoMove::Advance { piece }
}

#[test]
fn test_roll_without_movable_piece_passes_turn() {
    let state = Ludo::initial_state(&players());
    let next = Ludo::apply_move(&state, &players(), "ann", &roll(3)).expect("legal roll");
    assert_eq!(next.current_player_index(), 1);
    assert_eq!(next.phase(), LudoPhase::AwaitingRoll);
    assert_eq!(next.last_roll(), Some(3));
}

#[test]
fn test_six_releases_piece_and_rolls_again() {
    let state = Ludo::initial_state(&players());
    let state = Ludo::apply_move(&state, &players(), "ann", &roll(6)).expect("legal roll");
    assert_eq!(state.phase(), LudoPhase::AwaitingMove);

    let state = Ludo::apply_move(&state, &players(), "ann", &advance(0)).expect("piece leaves base");
    assert_eq!(state.pieces()[0][0], Track(0));
    assert_eq!(state.current_player_index(), 0);
    assert_eq!(state.phase(), LudoPhase::AwaitingRoll);
}

#[test]
fn test_phase_order_enforced() {
    let state = Ludo::initial_state(&players());
    assert!(matches!(
        Ludo::apply_move(&state, &players(), "ann", &advance(0)),
        Err(Rejection::IllegalMove(_))
    ));

    let state = Ludo::apply_move(&state, &players(), "ann", &roll(6)).expect("legal roll");
    assert!(matches!(
        Ludo::apply_move(&state, &players(), "ann", &roll(6)),
        Err(Rejection::IllegalMove(_))
    ));
}

#[test]
fn test_invalid_face_and_piece_rejected() {
    let state = Ludo::initial_state(&players());
    assert!(matches!(
        Ludo::apply_move(&state, &players(), "ann", &roll(7)),
        Err(Rejection::IllegalMove(_))
    ));

    let state = LudoState::from_parts(
        vec![[Track(10), Base, Base, Base], [Base; 4]],
        0,
        Some(2),
        LudoPhase::AwaitingMove,
    );
    // Piece 1 is in base and cannot move on a 2; piece 4 does not exist.
    for piece in [1, 4] {
        assert!(matches!(
            Ludo::apply_move(&state, &players(), "ann", &advance(piece)),
            Err(Rejection::IllegalMove(_))
        ));
    }
}

#[test]
fn test_landing_on_opponent_captures() {
    // Ben's piece at progress 44 sits on absolute square 5.
    assert_eq!(track_square(1, 44), Some(5));
    let state = LudoState::from_parts(
        vec![[Track(3), Base, Base, Base], [Track(44), Base, Base, Base]],
        0,
        Some(2),
        LudoPhase::AwaitingMove,
    );

    let next = Ludo::apply_move(&state, &players(), "ann", &advance(0)).expect("legal advance");
    assert_eq!(next.pieces()[0][0], Track(5));
    assert_eq!(next.pieces()[1][0], Base);
    assert_eq!(next.current_player_index(), 1);
}

#[test]
fn test_safe_square_protects() {
    // Both pieces meet on absolute square 8.
    assert_eq!(track_square(1, 47), Some(8));
    let state = LudoState::from_parts(
        vec![[Track(6), Base, Base, Base], [Track(47), Base, Base, Base]],
        0,
        Some(2),
        LudoPhase::AwaitingMove,
    );

    let next = Ludo::apply_move(&state, &players(), "ann", &advance(0)).expect("legal advance");
    assert_eq!(next.pieces()[0][0], Track(8));
    assert_eq!(next.pieces()[1][0], Track(47));
}

#[test]
fn test_home_column_is_private() {
    // Progress 51+ is off the shared loop and cannot capture.
    assert_eq!(track_square(0, 51), None);
    let state = LudoState::from_parts(
        vec![[Track(49), Base, Base, Base], [Track(40), Base, Base, Base]],
        0,
        Some(4),
        LudoPhase::AwaitingMove,
    );
    let next = Ludo::apply_move(&state, &players(), "ann", &advance(0)).expect("legal advance");
    assert_eq!(next.pieces()[0][0], Track(53));
    assert_eq!(next.pieces()[1][0], Track(40));
}

#[test]
fn test_overshooting_home_passes_turn() {
    let state = LudoState::from_parts(
        vec![[Home, Home, Home, Track(HOME_STEP - 3)], [Base; 4]],
        0,
        None,
        LudoPhase::AwaitingRoll,
    );
    let next = Ludo::apply_move(&state, &players(), "ann", &roll(4)).expect("legal roll");
    assert_eq!(next.current_player_index(), 1);
    assert_eq!(next.pieces()[0][3], Track(HOME_STEP - 3));
}

#[test]
fn test_last_piece_home_wins() {
    let state = LudoState::from_parts(
        vec![[Home, Home, Home, Track(HOME_STEP - 3)], [Base; 4]],
        0,
        Some(3),
        LudoPhase::AwaitingMove,
    );
    assert_eq!(Ludo::check_terminal(&state), None);

    let next = Ludo::apply_move(&state, &players(), "ann", &advance(3)).expect("exact roll");
    assert_eq!(Ludo::check_terminal(&next), Some(Outcome::Winner(0)));
    assert!(matches!(
        Ludo::apply_move(&next, &players(), "ann", &roll(6)),
        Err(Rejection::WrongStatus(_))
    ));
}

#[test]
fn test_three_player_session_turns() {
    let mut session = GameSession::create(GameKind::Ludo, "ann").expect("playable");
    for user in ["ben", "cat"] {
        session = session.request_join(user).expect("request");
        session = session.approve_join("ann", user).expect("approved");
    }
    let session = session.start("ann").expect("started");

    let session = session
        .play("ann", &GameMove::Ludo(roll(3)))
        .expect("legal roll");
    assert_eq!(session.current_player().map(String::as_str), Some("ben"));
    assert_eq!(
        session.play("cat", &GameMove::Ludo(roll(6))),
        Err(Rejection::NotYourTurn {
            expected: "ben".to_string()
        })
    );

    match session.game_state() {
        Some(GameState::Ludo(state)) => assert_eq!(state.pieces().len(), 3),
        other => panic!("expected a ludo state, got {:?}", other),
    }
}
