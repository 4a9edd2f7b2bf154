//! Boundary tests: inbound payloads are a closed, tagged set that either
//! parses into a known variant or never reaches the engine.

use bracket_royale_server::game::types::Move;
use bracket_royale_server::protocol::{ClientMsg, ServerMsg};
use uuid::Uuid;

#[test]
fn submit_move_parses_from_client_json() {
    let gid = Uuid::new_v4();
    let raw = format!(
        r#"{{"type":"SubmitMove","game_id":"{gid}","round":2,"move":"Rock"}}"#
    );
    let msg: ClientMsg = serde_json::from_str(&raw).expect("valid payload");
    match msg {
        ClientMsg::SubmitMove { game_id, round, mv } => {
            assert_eq!(game_id, gid);
            assert_eq!(round, 2);
            assert_eq!(mv, Move::Rock);
        }
        other => panic!("wrong variant: {other:?}"),
    }
}

#[test]
fn unknown_event_names_fail_to_parse() {
    let raw = r#"{"type":"DeleteEverything","game_id":"00000000-0000-0000-0000-000000000000"}"#;
    assert!(serde_json::from_str::<ClientMsg>(raw).is_err());
}

#[test]
fn lobby_messages_carry_no_game_id() {
    assert_eq!(ClientMsg::FetchOpenGames.game_id(), None);
    let create = ClientMsg::CreateGame {
        buy_in: Some(5.0),
        max_players: 4,
        game_type: "BATTLE_ROYALE".into(),
    };
    assert_eq!(create.game_id(), None);

    let gid = Uuid::new_v4();
    assert_eq!(ClientMsg::JoinGame { game_id: gid }.game_id(), Some(gid));
}

#[test]
fn event_names_match_wire_tags() {
    let gid = Uuid::new_v4();
    let msg = ClientMsg::JoinGame { game_id: gid };
    // The metrics label must agree with the serde tag so dashboards and
    // client payloads use one vocabulary.
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains(&format!(r#""type":"{}""#, msg.name())));
    assert_eq!(ClientMsg::FetchOpenGames.name(), "FetchOpenGames");
}

#[test]
fn error_messages_are_tagged() {
    let msg = ServerMsg::Error {
        message: "The game is already full.".into(),
    };
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains(r#""type":"Error""#));
}
