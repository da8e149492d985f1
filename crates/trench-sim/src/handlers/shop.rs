//! The lobby shop and the quartermaster's one-time requisition bonus.

use trench_core::item::{GroundItem, GroundItemPayload, Rarity};
use trench_core::math::Vec2;
use trench_core::net::messages::{
    GroundItemSpawnedMsg, PurchaseResultMsg, PurchaseShopItemMsg, QuartermasterResultMsg,
    ServerMessage, ShopInventoryMsg,
};
use trench_core::player::{INVENTORY_CAPACITY, MAX_BLOOD_MARKERS, MAX_DUCATS, PlayerId};

use crate::GameRoom;
use crate::context::RoomContext;
use crate::handlers::recompute_stats;
use crate::loot;

impl GameRoom {
    pub(crate) fn handle_request_shop(&mut self, pid: PlayerId, ctx: &mut RoomContext<'_>) {
        if !self.players.contains_key(&pid) {
            return;
        }
        ctx.send_to(
            pid,
            ServerMessage::ShopInventory(ShopInventoryMsg {
                entries: loot::shop_catalog(self.world_seed),
            }),
        );
    }

    /// Validated purchase: slot exists, funds cover it, a slot is free.
    /// Results go only to the buyer.
    pub(crate) fn handle_purchase(
        &mut self,
        pid: PlayerId,
        m: PurchaseShopItemMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let base_health = ctx.config.player_health_max;
        let catalog = loot::shop_catalog(self.world_seed);
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        let fail = |ducats: u32, error: &str| {
            ServerMessage::PurchaseResult(PurchaseResultMsg {
                success: false,
                slot: m.slot,
                ducats_remaining: ducats,
                error: Some(error.to_string()),
            })
        };
        let Some(entry) = catalog.iter().find(|e| e.slot == m.slot) else {
            ctx.send_to(pid, fail(p.ducats, "no such item"));
            return;
        };
        if p.ducats < entry.cost_ducats {
            ctx.send_to(pid, fail(p.ducats, "not enough ducats"));
            return;
        }
        if p.inventory.len() >= INVENTORY_CAPACITY {
            ctx.send_to(pid, fail(p.ducats, "inventory full"));
            return;
        }
        p.ducats -= entry.cost_ducats;
        p.inventory.push(entry.item.clone());
        recompute_stats(p, base_health);
        ctx.send_to(
            pid,
            ServerMessage::PurchaseResult(PurchaseResultMsg {
                success: true,
                slot: m.slot,
                ducats_remaining: p.ducats,
                error: None,
            }),
        );
    }

    /// First visit grants ducats plus a free common item; every visit after
    /// that pays out a trickle of blood markers instead.
    pub(crate) fn handle_quartermaster(&mut self, pid: PlayerId, ctx: &mut RoomContext<'_>) {
        let base_health = ctx.config.player_health_max;
        let world_seed = self.world_seed;
        let occupied: Vec<Vec2> = self.ground_items.values().map(|g| g.pos).collect();
        let boundary = self.boundary;
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        if !p.quartermaster_visited {
            p.quartermaster_visited = true;
            let granted = ctx.config.quartermaster_bonus_ducats;
            p.ducats = (p.ducats + granted).min(MAX_DUCATS);
            let mut rng = loot::entity_rng(world_seed, &format!("quartermaster_{pid}"));
            let item = loot::roll_item(&mut rng, Rarity::Common);
            // No free slot means the bonus item lands on the ground instead.
            let mut overflow = None;
            let granted_item = if p.inventory.len() < INVENTORY_CAPACITY {
                p.inventory.push(item.clone());
                recompute_stats(p, base_health);
                Some(item)
            } else {
                let pos = loot::find_clear_drop_position(
                    p.pos,
                    &occupied,
                    &boundary,
                    ctx.config.drop_search_radius_step,
                    ctx.config.drop_search_max_rings,
                );
                overflow = Some((pos, item));
                None
            };
            ctx.send_to(
                pid,
                ServerMessage::QuartermasterResult(QuartermasterResultMsg {
                    first_visit: true,
                    ducats_granted: granted,
                    blood_markers_granted: 0,
                    item: granted_item,
                }),
            );
            if let Some((pos, item)) = overflow {
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
            }
        } else {
            let granted = ctx.config.quartermaster_repeat_blood_markers;
            p.blood_markers = (p.blood_markers + granted).min(MAX_BLOOD_MARKERS);
            ctx.send_to(
                pid,
                ServerMessage::QuartermasterResult(QuartermasterResultMsg {
                    first_visit: false,
                    ducats_granted: 0,
                    blood_markers_granted: granted,
                    item: None,
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::context::Target;
    use crate::world::PlayerState;
    use trench_core::math::Vec2;

    fn room() -> (GameRoom, SimConfig) {
        let config = SimConfig::default();
        let mut room = GameRoom::new("r".to_string(), 42, &config);
        room.players
            .insert(1, PlayerState::new(1, "a".into(), Vec2::ZERO, 100.0));
        (room, config)
    }

    #[test]
    fn shop_inventory_goes_only_to_requester() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_request_shop(1, &mut ctx);
        let out = ctx.drain();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target, Target::To(1));
        assert!(matches!(&out[0].msg, ServerMessage::ShopInventory(m) if m.entries.len() == 6));
    }

    #[test]
    fn purchase_checks_funds_then_deducts() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_purchase(1, PurchaseShopItemMsg { slot: 0 }, &mut ctx);
        let out = ctx.drain();
        assert!(matches!(
            &out[0].msg,
            ServerMessage::PurchaseResult(m) if !m.success
        ));

        let cost = loot::shop_catalog(42)[0].cost_ducats;
        room.players.get_mut(&1).unwrap().ducats = cost + 5;
        room.handle_purchase(1, PurchaseShopItemMsg { slot: 0 }, &mut ctx);
        let out = ctx.drain();
        assert!(matches!(
            &out[0].msg,
            ServerMessage::PurchaseResult(m) if m.success && m.ducats_remaining == 5
        ));
        assert_eq!(room.players[&1].inventory.len(), 1);
    }

    #[test]
    fn quartermaster_bonus_is_one_time() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_quartermaster(1, &mut ctx);
        let p = &room.players[&1];
        assert_eq!(p.ducats, config.quartermaster_bonus_ducats);
        assert_eq!(p.inventory.len(), 1);
        assert_eq!(p.blood_markers, 0);

        room.handle_quartermaster(1, &mut ctx);
        let p = &room.players[&1];
        // Repeat visit pays markers, never a second bonus.
        assert_eq!(p.ducats, config.quartermaster_bonus_ducats);
        assert_eq!(p.inventory.len(), 1);
        assert_eq!(p.blood_markers, config.quartermaster_repeat_blood_markers);
        let results: Vec<bool> = ctx
            .drain()
            .iter()
            .filter_map(|o| match &o.msg {
                ServerMessage::QuartermasterResult(m) => Some(m.first_visit),
                _ => None,
            })
            .collect();
        assert_eq!(results, vec![true, false]);
    }

    #[test]
    fn quartermaster_overflow_spawns_item_on_ground() {
        let (mut room, config) = room();
        let filler = loot::shop_catalog(42)[0].item.clone();
        let p = room.players.get_mut(&1).unwrap();
        for _ in 0..INVENTORY_CAPACITY {
            p.inventory.push(filler.clone());
        }

        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_quartermaster(1, &mut ctx);

        let p = &room.players[&1];
        assert_eq!(p.inventory.len(), INVENTORY_CAPACITY);
        assert_eq!(p.ducats, config.quartermaster_bonus_ducats);
        assert_eq!(room.ground_items.len(), 1);
        let out = ctx.drain();
        assert!(out.iter().any(|o| matches!(
            &o.msg,
            ServerMessage::QuartermasterResult(m) if m.first_visit && m.item.is_none()
        )));
        assert!(out.iter().any(|o| {
            matches!(
                &o.msg,
                ServerMessage::GroundItemSpawned(m)
                    if matches!(&m.item.payload, GroundItemPayload::Gear(i) if i.rarity == Rarity::Common)
            )
        }));
    }
}
