use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use trench_core::net::messages::ClientMessage;
use trench_core::player::PlayerId;
use trench_core::room::is_valid_room_id;

use crate::config::ServerConfig;
use crate::game_loop::{PlayerSender, RoomCommand, spawn_room};

struct RoomEntry {
    cmd_tx: mpsc::UnboundedSender<RoomCommand>,
    #[allow(dead_code)]
    task: JoinHandle<()>,
    player_count: usize,
}

/// Tracks every live room task and which room each player is in.
///
/// The `player_rooms` index is the routing hot path: one hash lookup per
/// inbound intent instead of scanning room membership.
pub struct RoomRegistry {
    rooms: HashMap<String, RoomEntry>,
    player_rooms: HashMap<PlayerId, String>,
    next_player_id: PlayerId,
    limits_max_players: usize,
    max_rooms: usize,
    sim: trench_sim::config::SimConfig,
}

impl RoomRegistry {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            next_player_id: 1,
            limits_max_players: config.limits.max_players_per_room,
            max_rooms: config.rooms.max_rooms,
            sim: config.simulation.clone(),
        }
    }

    fn alloc_player_id(&mut self) -> PlayerId {
        let id = self.next_player_id;
        self.next_player_id += 1;
        id
    }

    /// Join the named room, creating it if it does not exist yet.
    /// Returns the allocated player id or a rejection reason.
    pub fn join_or_create(
        &mut self,
        room_id: &str,
        player_name: String,
        sender: PlayerSender,
    ) -> Result<PlayerId, String> {
        if !is_valid_room_id(room_id) {
            return Err("Invalid room id".to_string());
        }

        if let Some(entry) = self.rooms.get(room_id)
            && entry.player_count >= self.limits_max_players
        {
            return Err("Room is full".to_string());
        }
        if !self.rooms.contains_key(room_id) && self.rooms.len() >= self.max_rooms {
            return Err("Server is at room capacity".to_string());
        }

        let player_id = self.alloc_player_id();
        let entry = self.rooms.entry(room_id.to_string()).or_insert_with(|| {
            let world_seed = rand::random::<u64>();
            let (cmd_tx, task) = spawn_room(room_id.to_string(), world_seed, self.sim.clone());
            RoomEntry {
                cmd_tx,
                task,
                player_count: 0,
            }
        });

        let send_ok = entry
            .cmd_tx
            .send(RoomCommand::PlayerJoined {
                player_id,
                name: player_name,
                sender,
            })
            .is_ok();
        if send_ok {
            entry.player_count += 1;
        } else {
            // Task already exited; drop the stale entry and report failure.
            self.rooms.remove(room_id);
            return Err("Room is shutting down".to_string());
        }

        self.player_rooms.insert(player_id, room_id.to_string());
        Ok(player_id)
    }

    /// Remove a player. Tears the room down when its last player leaves.
    /// Returns the room id if the room was destroyed.
    pub fn leave(&mut self, player_id: PlayerId) -> Option<String> {
        let room_id = self.player_rooms.remove(&player_id)?;
        let entry = self.rooms.get_mut(&room_id)?;
        let _ = entry.cmd_tx.send(RoomCommand::PlayerLeft { player_id });
        entry.player_count = entry.player_count.saturating_sub(1);
        if entry.player_count == 0 {
            let _ = entry.cmd_tx.send(RoomCommand::Stop);
            self.rooms.remove(&room_id);
            tracing::info!(room = %room_id, "Room destroyed (last player left)");
            return Some(room_id);
        }
        None
    }

    /// Forward a decoded intent to the sender's room task.
    /// Returns false when the player has no live room.
    pub fn route_intent(&self, player_id: PlayerId, msg: ClientMessage) -> bool {
        let Some(room_id) = self.player_rooms.get(&player_id) else {
            return false;
        };
        let Some(entry) = self.rooms.get(room_id) else {
            return false;
        };
        entry
            .cmd_tx
            .send(RoomCommand::Intent { player_id, msg })
            .is_ok()
    }

    pub fn room_of(&self, player_id: PlayerId) -> Option<&str> {
        self.player_rooms.get(&player_id).map(String::as_str)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn player_count(&self) -> usize {
        self.player_rooms.len()
    }

    pub fn room_player_count(&self, room_id: &str) -> Option<usize> {
        self.rooms.get(room_id).map(|e| e.player_count)
    }
}
