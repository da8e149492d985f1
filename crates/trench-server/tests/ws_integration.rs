#[allow(dead_code)]
mod common;

use futures::StreamExt;

use trench_core::math::Vec2;
use trench_core::net::messages::{
    ClientMessage, EmptyMsg, LeaveRoomMsg, PlayerInputMsg, ServerMessage,
};

use common::{
    TestServer, ws_connect, ws_join, ws_join_with_version, ws_read_until, ws_send_client_msg,
};

#[tokio::test]
async fn join_creates_room_and_sends_snapshot() {
    let server = TestServer::new().await;
    let mut stream = ws_connect(&server.ws_url()).await;

    let resp = ws_join(&mut stream, "squad-1", "Alice").await;
    assert!(resp.success);
    assert!(resp.player_id.is_some());
    assert_eq!(resp.room_id.as_deref(), Some("squad-1"));

    let snapshot = ws_read_until(&mut stream, |m| {
        matches!(m, ServerMessage::RoomSnapshot(_))
    })
    .await;
    let ServerMessage::RoomSnapshot(snap) = snapshot else {
        unreachable!();
    };
    assert_eq!(snap.players.len(), 1);

    let roster = ws_read_until(&mut stream, |m| matches!(m, ServerMessage::PlayerList(_))).await;
    let ServerMessage::PlayerList(pl) = roster else {
        unreachable!();
    };
    assert_eq!(pl.players.len(), 1);
    assert_eq!(pl.players[0].display_name, "Alice");
}

#[tokio::test]
async fn second_join_is_visible_to_both() {
    let server = TestServer::new().await;

    let mut alice = ws_connect(&server.ws_url()).await;
    let alice_resp = ws_join(&mut alice, "squad-1", "Alice").await;
    assert!(alice_resp.success);

    let mut bob = ws_connect(&server.ws_url()).await;
    let bob_resp = ws_join(&mut bob, "squad-1", "Bob").await;
    assert!(bob_resp.success);
    assert_ne!(alice_resp.player_id, bob_resp.player_id);

    // Bob's snapshot already includes Alice.
    let snapshot = ws_read_until(&mut bob, |m| matches!(m, ServerMessage::RoomSnapshot(_))).await;
    let ServerMessage::RoomSnapshot(snap) = snapshot else {
        unreachable!();
    };
    assert_eq!(snap.players.len(), 2);

    // Alice sees the updated roster.
    let roster = ws_read_until(&mut alice, |m| {
        matches!(m, ServerMessage::PlayerList(pl) if pl.players.len() == 2)
    })
    .await;
    let ServerMessage::PlayerList(pl) = roster else {
        unreachable!();
    };
    assert!(pl.players.iter().any(|p| p.display_name == "Bob"));
}

#[tokio::test]
async fn protocol_mismatch_is_rejected() {
    let server = TestServer::new().await;
    let mut stream = ws_connect(&server.ws_url()).await;

    let resp = ws_join_with_version(&mut stream, "squad-1", "Alice", 99).await;
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("Protocol version mismatch"));
}

#[tokio::test]
async fn invalid_room_id_is_rejected() {
    let server = TestServer::new().await;
    let mut stream = ws_connect(&server.ws_url()).await;

    let resp = ws_join(&mut stream, "no spaces allowed", "Alice").await;
    assert!(!resp.success);
    assert!(resp.error.is_some());
}

#[tokio::test]
async fn first_message_must_be_join() {
    let server = TestServer::new().await;
    let mut stream = ws_connect(&server.ws_url()).await;

    // An intent before JoinRoom gets the connection dropped.
    ws_send_client_msg(&mut stream, &ClientMessage::ReadyTimerStart(EmptyMsg {})).await;

    let next = tokio::time::timeout(std::time::Duration::from_secs(5), stream.next())
        .await
        .expect("timed out waiting for close");
    match next {
        None => {},
        Some(Ok(msg)) => assert!(msg.is_close(), "expected close frame, got: {msg:?}"),
        Some(Err(_)) => {},
    }
}

#[tokio::test]
async fn input_is_acknowledged_in_state_broadcast() {
    let server = TestServer::new().await;
    let mut stream = ws_connect(&server.ws_url()).await;

    let resp = ws_join(&mut stream, "squad-1", "Alice").await;
    let pid = resp.player_id.unwrap();

    ws_send_client_msg(
        &mut stream,
        &ClientMessage::PlayerInput(PlayerInputMsg {
            seq: 7,
            move_x: 1.0,
            move_y: 0.0,
            aim_angle: 0.0,
            dash: false,
            dt: 1.0 / 60.0,
            claimed_pos: Vec2::ZERO,
        }),
    )
    .await;

    ws_read_until(&mut stream, |m| {
        matches!(
            m,
            ServerMessage::PlayerStateUpdate(u)
                if u.updates.iter().any(|p| p.id == pid && p.last_input_seq == 7)
        )
    })
    .await;
}

#[tokio::test]
async fn leave_updates_remaining_roster() {
    let server = TestServer::new().await;

    let mut alice = ws_connect(&server.ws_url()).await;
    ws_join(&mut alice, "squad-1", "Alice").await;

    let mut bob = ws_connect(&server.ws_url()).await;
    let bob_resp = ws_join(&mut bob, "squad-1", "Bob").await;
    let bob_id = bob_resp.player_id.unwrap();
    ws_read_until(&mut alice, |m| {
        matches!(m, ServerMessage::PlayerList(pl) if pl.players.len() == 2)
    })
    .await;

    ws_send_client_msg(
        &mut bob,
        &ClientMessage::LeaveRoom(LeaveRoomMsg { player_id: bob_id }),
    )
    .await;

    ws_read_until(&mut alice, |m| {
        matches!(m, ServerMessage::PlayerList(pl) if pl.players.len() == 1)
    })
    .await;
}
