//! Chests, inventory, ground items, the artifact, and batteries.
//!
//! Pickup is first-come-first-served: the ground item is removed from the
//! room map before anything is granted, so two near-simultaneous requests
//! can never both succeed.

use trench_core::item::{GroundItem, GroundItemPayload};
use trench_core::math::Vec2;
use trench_core::net::messages::{
    ArtifactStateMsg, BatteryPickupRequestMsg, ChestOpenRequestMsg, ChestOpenedMsg,
    GroundItemRemovedMsg, GroundItemSpawnedMsg, InventoryDropRequestMsg,
    InventoryPickupRequestMsg, PlayerHealthUpdateMsg, ServerMessage,
};
use trench_core::player::{INVENTORY_CAPACITY, MAX_BLOOD_MARKERS, MAX_DUCATS, PlayerId};

use crate::context::RoomContext;
use crate::handlers::{INTERACT_RANGE, PICKUP_RANGE, recompute_stats};
use crate::loot;
use crate::schedule::Task;
use crate::world::Artifact;
use crate::GameRoom;

impl GameRoom {
    pub(crate) fn handle_chest_open(
        &mut self,
        pid: PlayerId,
        m: ChestOpenRequestMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(p) = self.players.get(&pid).filter(|p| p.is_alive()) else {
            return;
        };
        let pos = p.pos;
        let Some(chest) = self.chests.get(&m.chest_id) else {
            return;
        };
        if chest.opened || chest.pos.distance(pos) > INTERACT_RANGE {
            return;
        }
        self.open_chest(&m.chest_id, ctx);
    }

    /// Open a chest: deterministic loot spill, artifact reveal, and a
    /// respawn timer. Idempotent per open state.
    pub(crate) fn open_chest(&mut self, chest_id: &str, ctx: &mut RoomContext<'_>) {
        let Some(chest) = self.chests.get_mut(chest_id) else {
            return;
        };
        if chest.opened {
            return;
        }
        chest.opened = true;
        chest.opening = false;
        let chest_pos = chest.pos;
        let variant = chest.variant;
        let has_artifact = chest.has_artifact;
        chest.has_artifact = false;

        let drops = loot::chest_loot(self.world_seed, chest_id, variant);
        let mut spawned = Vec::with_capacity(drops.len());
        for d in drops {
            let id = self.alloc_id();
            let item = GroundItem {
                id,
                pos: chest_pos.add(d.offset),
                velocity: d.offset.scale(2.0),
                payload: d.payload,
            };
            self.ground_items.insert(id, item.clone());
            ctx.broadcast(ServerMessage::GroundItemSpawned(GroundItemSpawnedMsg {
                item: item.clone(),
            }));
            spawned.push(item);
        }
        ctx.broadcast(ServerMessage::ChestOpened(ChestOpenedMsg {
            chest_id: chest_id.to_string(),
            loot: spawned,
            has_artifact,
        }));

        if has_artifact {
            let artifact = Artifact {
                carried_by: None,
                pos: chest_pos,
                integrity: 100.0,
            };
            ctx.broadcast(ServerMessage::ArtifactState(ArtifactStateMsg {
                carried_by: None,
                pos: artifact.pos,
                integrity: artifact.integrity,
            }));
            self.artifact = Some(artifact);
        }

        self.schedule.push_at(
            ctx.now + f64::from(ctx.config.chest_respawn_secs),
            Task::ChestRespawn {
                chest_id: chest_id.to_string(),
            },
        );
    }

    /// Drop one inventory slot onto a clear patch of ground.
    pub(crate) fn handle_inventory_drop(
        &mut self,
        pid: PlayerId,
        m: InventoryDropRequestMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let occupied: Vec<Vec2> = self.ground_items.values().map(|g| g.pos).collect();
        let boundary = self.boundary;
        let base_health = ctx.config.player_health_max;
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        let slot = m.slot as usize;
        if !p.is_alive() || slot >= p.inventory.len() {
            return;
        }
        let item = p.inventory.remove(slot);
        recompute_stats(p, base_health);
        let pos = loot::find_clear_drop_position(
            p.pos,
            &occupied,
            &boundary,
            ctx.config.drop_search_radius_step,
            ctx.config.drop_search_max_rings,
        );
        let health = p.health;
        let health_max = p.health_max;
        let id = self.alloc_id();
        let ground = GroundItem {
            id,
            pos,
            velocity: Vec2::ZERO,
            payload: GroundItemPayload::Gear(item),
        };
        self.ground_items.insert(id, ground.clone());
        ctx.broadcast(ServerMessage::GroundItemSpawned(GroundItemSpawnedMsg {
            item: ground,
        }));
        ctx.broadcast(ServerMessage::PlayerHealthUpdate(PlayerHealthUpdateMsg {
            id: pid,
            health,
            health_max,
        }));
    }

    pub(crate) fn handle_inventory_pickup(
        &mut self,
        pid: PlayerId,
        m: InventoryPickupRequestMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let base_health = ctx.config.player_health_max;
        let Some(p) = self.players.get(&pid).filter(|p| p.is_alive()) else {
            return;
        };
        let player_pos = p.pos;
        let Some(ground) = self.ground_items.get(&m.ground_item_id) else {
            return;
        };
        if ground.pos.distance(player_pos) > PICKUP_RANGE {
            return;
        }
        // Gear needs a free slot before we commit to removing the item.
        if matches!(ground.payload, GroundItemPayload::Gear(_))
            && self.players[&pid].inventory.len() >= INVENTORY_CAPACITY
        {
            return;
        }
        let Some(ground) = self.ground_items.remove(&m.ground_item_id) else {
            return;
        };
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        match ground.payload {
            GroundItemPayload::Gear(item) => {
                p.inventory.push(item);
                recompute_stats(p, base_health);
            },
            GroundItemPayload::Currency { kind, amount } => match kind {
                trench_core::item::CurrencyKind::Ducat => {
                    p.ducats = (p.ducats + amount).min(MAX_DUCATS);
                },
                trench_core::item::CurrencyKind::BloodMarker => {
                    p.blood_markers = (p.blood_markers + amount).min(MAX_BLOOD_MARKERS);
                },
            },
        }
        ctx.broadcast(ServerMessage::GroundItemRemoved(GroundItemRemovedMsg {
            ground_item_id: m.ground_item_id,
            taken_by: Some(pid),
        }));
    }

    pub(crate) fn handle_artifact_pickup(&mut self, pid: PlayerId, ctx: &mut RoomContext<'_>) {
        let Some(p) = self.players.get(&pid).filter(|p| p.is_alive()) else {
            return;
        };
        let player_pos = p.pos;
        let Some(artifact) = self.artifact.as_mut() else {
            return;
        };
        if artifact.carried_by.is_some() || artifact.pos.distance(player_pos) > PICKUP_RANGE {
            return;
        }
        artifact.carried_by = Some(pid);
        ctx.broadcast(ServerMessage::ArtifactState(ArtifactStateMsg {
            carried_by: artifact.carried_by,
            pos: artifact.pos,
            integrity: artifact.integrity,
        }));
    }

    pub(crate) fn handle_artifact_drop(&mut self, pid: PlayerId, ctx: &mut RoomContext<'_>) {
        let pos = self.players.get(&pid).map(|p| p.pos);
        let Some(artifact) = self.artifact.as_mut() else {
            return;
        };
        if artifact.carried_by != Some(pid) {
            return;
        }
        artifact.carried_by = None;
        if let Some(pos) = pos {
            artifact.pos = pos;
        }
        ctx.broadcast(ServerMessage::ArtifactState(ArtifactStateMsg {
            carried_by: None,
            pos: artifact.pos,
            integrity: artifact.integrity,
        }));
    }

    pub(crate) fn handle_battery_pickup(
        &mut self,
        pid: PlayerId,
        m: BatteryPickupRequestMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(p) = self.players.get(&pid).filter(|p| p.is_alive()) else {
            return;
        };
        if p.carrying_battery.is_some() {
            return;
        }
        let player_pos = p.pos;
        let Some(battery) = self.batteries.get_mut(&m.battery_id) else {
            return;
        };
        if battery.placed
            || battery.carried_by.is_some()
            || battery.pos.distance(player_pos) > PICKUP_RANGE
        {
            return;
        }
        battery.carried_by = Some(pid);
        let msg = battery.state_msg();
        if let Some(p) = self.players.get_mut(&pid) {
            p.carrying_battery = Some(m.battery_id);
        }
        ctx.broadcast(ServerMessage::BatteryState(msg));
    }

    pub(crate) fn handle_battery_drop(&mut self, pid: PlayerId, ctx: &mut RoomContext<'_>) {
        self.release_battery(pid, false, ctx);
    }

    /// Place the carried battery at the player's feet, powering it.
    pub(crate) fn handle_battery_place(&mut self, pid: PlayerId, ctx: &mut RoomContext<'_>) {
        self.release_battery(pid, true, ctx);
    }

    fn release_battery(&mut self, pid: PlayerId, place: bool, ctx: &mut RoomContext<'_>) {
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        let Some(battery_id) = p.carrying_battery.take() else {
            return;
        };
        let pos = p.pos;
        let Some(battery) = self.batteries.get_mut(&battery_id) else {
            return;
        };
        battery.carried_by = None;
        battery.pos = pos;
        battery.placed = place;
        ctx.broadcast(ServerMessage::BatteryState(battery.state_msg()));
    }

    /// Release anything the player is physically carrying at their current
    /// position. Used on respawn and disconnect.
    pub(crate) fn drop_carried(&mut self, pid: PlayerId, ctx: &mut RoomContext<'_>) {
        if self
            .artifact
            .as_ref()
            .is_some_and(|a| a.carried_by == Some(pid))
        {
            self.handle_artifact_drop(pid, ctx);
        }
        if self
            .players
            .get(&pid)
            .is_some_and(|p| p.carrying_battery.is_some())
        {
            self.release_battery(pid, false, ctx);
        }
    }
}
