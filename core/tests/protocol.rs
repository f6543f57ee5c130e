use cardroom_core::{decode, encode, ClientMsg, Rank, RoomId, RoomIdError, ServerMsg, Suit};
use serde_json::{json, Value};

fn to_value(msg: &ClientMsg) -> Value {
    let text = encode(msg).expect("encode");
    serde_json::from_str(&text).expect("json")
}

#[test]
fn client_events_use_kebab_names_and_camel_fields() {
    let msg = ClientMsg::ActionDrop {
        room_id: "ROOM1".to_string(),
        selected_ids: vec!["c1".to_string(), "c2".to_string()],
    };
    assert_eq!(
        to_value(&msg),
        json!({"event": "action-drop", "data": {"roomId": "ROOM1", "selectedIds": ["c1", "c2"]}})
    );

    let msg = ClientMsg::RejoinRoom {
        room_id: "ROOM1".to_string(),
        name: "Ana".to_string(),
        player_id: "p-1".to_string(),
    };
    assert_eq!(
        to_value(&msg),
        json!({"event": "rejoin-room", "data": {"roomId": "ROOM1", "name": "Ana", "playerId": "p-1"}})
    );
}

#[test]
fn draw_and_gif_payloads_match_wire_names() {
    let draw = ClientMsg::ActionDraw {
        room_id: "R".to_string(),
        from_discard: true,
    };
    assert_eq!(
        to_value(&draw),
        json!({"event": "action-draw", "data": {"roomId": "R", "fromDiscard": true}})
    );
    let gif = ClientMsg::SendGif {
        room_id: "R".to_string(),
        target_id: "p2".to_string(),
        gif_id: "laugh".to_string(),
    };
    assert_eq!(gif.kind(), "send-gif");
    assert_eq!(
        to_value(&gif),
        json!({"event": "send-gif", "data": {"roomId": "R", "targetId": "p2", "gifId": "laugh"}})
    );
}

#[test]
fn game_state_decodes_with_hidden_hands() {
    let raw = json!({
        "event": "game-state",
        "data": {
            "roomId": "ROOM1",
            "players": [
                {
                    "id": "p1",
                    "name": "Ana",
                    "hand": [
                        {"id": "c1", "rank": "7", "suit": "♥"},
                        {"id": "c2", "rank": "JOKER"}
                    ],
                    "score": 12,
                    "hasDrawn": true,
                    "handSize": 2
                },
                {"id": "p2", "name": "Bo", "handSize": 5}
            ],
            "currentTurn": 1,
            "discardTop": {"id": "d1", "rank": "10", "suit": "♣"},
            "started": true,
            "closeCalled": false,
            "hostId": "p1",
            "yourId": "p1"
        }
    })
    .to_string();

    let Some(ServerMsg::GameState(snapshot)) = decode::<ServerMsg>(&raw) else {
        panic!("expected game-state");
    };
    assert_eq!(snapshot.room_id, "ROOM1");
    assert_eq!(snapshot.current_player_id(), Some("p2"));
    assert!(snapshot.is_host("p1"));

    let me = snapshot.player("p1").expect("viewer");
    assert_eq!(me.hand[0].rank, Rank::Seven);
    assert_eq!(me.hand[0].suit, Some(Suit::Hearts));
    assert!(me.hand[1].is_joker());
    assert_eq!(me.hand[1].suit, None);
    assert!(me.has_drawn);

    let other = snapshot.player("p2").expect("other");
    assert!(other.hand.is_empty());
    assert_eq!(other.hand_size, 5);
    assert_eq!(other.score, 0);
    assert!(!other.has_drawn);
}

#[test]
fn gif_play_and_error_decode() {
    let gif = decode::<ServerMsg>(r#"{"event":"gif-play","data":{"targetId":"p2","gifId":"clap"}}"#);
    assert_eq!(
        gif,
        Some(ServerMsg::GifPlay {
            target_id: "p2".to_string(),
            gif_id: "clap".to_string(),
        })
    );
    let err = decode::<ServerMsg>(r#"{"event":"error","data":{"message":"room not found"}}"#);
    assert_eq!(
        err,
        Some(ServerMsg::Error {
            message: "room not found".to_string(),
        })
    );
}

#[test]
fn malformed_frames_are_rejected() {
    assert!(decode::<ServerMsg>("not json").is_none());
    assert!(decode::<ServerMsg>(r#"{"event":"game-state","data":{"players":[]}}"#).is_none());
    assert!(decode::<ServerMsg>(r#"{"event":"unknown","data":{}}"#).is_none());
}

#[test]
fn room_id_parse_trims_and_validates() {
    assert_eq!(RoomId::parse("  AB12-x ").map(|id| id.to_string()), Ok("AB12-x".to_string()));
    assert_eq!(RoomId::parse("   "), Err(RoomIdError::Empty));
    assert_eq!(
        RoomId::parse("AB CD"),
        Err(RoomIdError::InvalidCharacter { ch: ' ', index: 2 })
    );
    assert_eq!(
        RoomId::parse("sala#7.ñ").map(|id| id.to_string()),
        Ok("sala#7.ñ".to_string())
    );
    let long = "A".repeat(70);
    assert_eq!(
        RoomId::parse(&long),
        Err(RoomIdError::TooLong { max: 64, found: 70 })
    );
}
