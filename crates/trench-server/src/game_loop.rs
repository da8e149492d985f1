use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use trench_core::net::messages::{ClientMessage, JoinRoomResponseMsg, ServerMessage};
use trench_core::net::protocol::encode_server_message;
use trench_core::player::PlayerId;
use trench_sim::GameRoom;
use trench_sim::config::SimConfig;
use trench_sim::context::{Outbound, RoomContext, Target};

/// Per-player sender for outbound WebSocket binary frames.
/// Bounded so a slow client drops messages instead of stalling the room.
/// Uses `Bytes` for zero-copy cloning when fanning out broadcasts.
pub type PlayerSender = mpsc::Sender<Bytes>;

/// Commands sent from the WebSocket handlers to a room's tick task.
#[derive(Debug)]
pub enum RoomCommand {
    Intent {
        player_id: PlayerId,
        msg: ClientMessage,
    },
    PlayerJoined {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    Stop,
}

/// Spawn the authoritative tick loop for one room as a tokio task.
pub fn spawn_room(
    room_id: String,
    world_seed: u64,
    config: SimConfig,
) -> (mpsc::UnboundedSender<RoomCommand>, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        run_room_loop(room_id, world_seed, config, cmd_rx).await;
    });
    (cmd_tx, handle)
}

/// The room loop owns the `GameRoom` outright; everything reaches it through
/// the command channel. Intents and joins are applied between ticks, so sim
/// mutation always fully precedes the resulting broadcasts.
async fn run_room_loop(
    room_id: String,
    world_seed: u64,
    config: SimConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<RoomCommand>,
) {
    let mut room = GameRoom::new(room_id.clone(), world_seed, &config);
    let mut senders: HashMap<PlayerId, PlayerSender> = HashMap::new();

    let dt = 1.0 / config.tick_rate_hz as f32;
    let mut interval = tokio::time::interval(Duration::from_secs_f32(dt));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let start = tokio::time::Instant::now();

    tracing::info!(room = %room_id, world_seed, "Room tick loop started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = start.elapsed().as_secs_f64();
                let mut ctx = RoomContext::new(now, dt, &config);
                room.tick(&mut ctx);
                dispatch(ctx.drain(), &senders, &room_id);
            }
            cmd = cmd_rx.recv() => {
                let now = start.elapsed().as_secs_f64();
                match cmd {
                    Some(RoomCommand::Intent { player_id, msg }) => {
                        let mut ctx = RoomContext::new(now, dt, &config);
                        room.handle_message(player_id, msg, &mut ctx);
                        dispatch(ctx.drain(), &senders, &room_id);
                    },
                    Some(RoomCommand::PlayerJoined { player_id, name, sender }) => {
                        senders.insert(player_id, sender);
                        let mut ctx = RoomContext::new(now, dt, &config);
                        ctx.send_to(
                            player_id,
                            ServerMessage::JoinRoomResponse(JoinRoomResponseMsg {
                                success: true,
                                player_id: Some(player_id),
                                room_id: Some(room_id.clone()),
                                scene: Some(room.scene),
                                error: None,
                            }),
                        );
                        room.add_player(player_id, name, &mut ctx);
                        dispatch(ctx.drain(), &senders, &room_id);
                        tracing::info!(player = player_id, room = %room_id, "Player joined room");
                    },
                    Some(RoomCommand::PlayerLeft { player_id }) => {
                        let mut ctx = RoomContext::new(now, dt, &config);
                        room.remove_player(player_id, &mut ctx);
                        dispatch(ctx.drain(), &senders, &room_id);
                        senders.remove(&player_id);
                        tracing::info!(player = player_id, room = %room_id, "Player left room");
                    },
                    Some(RoomCommand::Stop) | None => break,
                }
            }
        }
    }

    tracing::info!(room = %room_id, "Room tick loop stopped");
}

/// Encode each outbound message once, then fan the shared bytes out to the
/// targeted player channels.
fn dispatch(outbox: Vec<Outbound>, senders: &HashMap<PlayerId, PlayerSender>, room_id: &str) {
    for out in outbox {
        let data = match encode_server_message(&out.msg) {
            Ok(d) => Bytes::from(d),
            Err(e) => {
                tracing::error!(room = room_id, error = %e, "Failed to encode outbound message");
                continue;
            },
        };
        match out.target {
            Target::Broadcast => {
                for (&pid, tx) in senders {
                    forward(tx, data.clone(), pid, room_id);
                }
            },
            Target::To(pid) => {
                if let Some(tx) = senders.get(&pid) {
                    forward(tx, data, pid, room_id);
                }
            },
            Target::Except(skip) => {
                for (&pid, tx) in senders.iter().filter(|&(&pid, _)| pid != skip) {
                    forward(tx, data.clone(), pid, room_id);
                }
            },
        }
    }
}

fn forward(tx: &PlayerSender, data: Bytes, player_id: PlayerId, room_id: &str) {
    if tx.try_send(data).is_err() {
        tracing::debug!(
            player = player_id,
            room = room_id,
            "Dropping message for slow or disconnected client"
        );
    }
}
