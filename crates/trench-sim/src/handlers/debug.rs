//! Dev tooling intents and the VFX relay.
//!
//! Debug intents stay enabled in every build; the host decides which
//! connections may send them.

use tracing::debug;

use trench_core::math::Vec2;
use trench_core::net::messages::{
    DebugSetValueMsg, DebugSpawnHordeMsg, EnemyKind, EnemyUpdateMsg, PlayerHealthUpdateMsg,
    ServerMessage, VfxCreatedMsg, VfxRelayMsg,
};
use trench_core::player::{MAX_BLOOD_MARKERS, MAX_DUCATS, PlayerId};

use crate::context::RoomContext;
use crate::world::Enemy;
use crate::{GameRoom, LURE_LIFETIME_SECS, LURE_VFX_KIND, Lure};

const MAX_HORDE: u8 = 20;
const TROOP_HEALTH: f32 = 60.0;

impl GameRoom {
    pub(crate) fn handle_debug_spawn_horde(
        &mut self,
        pid: PlayerId,
        m: DebugSpawnHordeMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if !self.players.contains_key(&pid) {
            return;
        }
        let count = m.count.min(MAX_HORDE);
        let mut spawned = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let angle = self.rng.gen_range_f64(0.0, std::f64::consts::TAU) as f32;
            let dist = self.rng.gen_range_f64(60.0, 220.0) as f32;
            let pos = m.near.add(Vec2::from_angle(angle).scale(dist));
            let (x, y) = self.boundary.clamp(pos.x, pos.y);
            let id = self.alloc_id();
            let enemy = Enemy::new(id, EnemyKind::Troop, Vec2::new(x, y), TROOP_HEALTH);
            spawned.push(enemy.snapshot());
            self.enemies.insert(id, enemy);
        }
        ctx.broadcast(ServerMessage::EnemyUpdate(EnemyUpdateMsg { enemies: spawned }));
    }

    pub(crate) fn handle_debug_set_value(
        &mut self,
        pid: PlayerId,
        m: DebugSetValueMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        match m.key.as_str() {
            "health" => {
                p.health = (m.value as f32).clamp(0.0, p.health_max);
                ctx.broadcast(ServerMessage::PlayerHealthUpdate(PlayerHealthUpdateMsg {
                    id: pid,
                    health: p.health,
                    health_max: p.health_max,
                }));
            },
            "ducats" => p.ducats = (m.value as u32).min(MAX_DUCATS),
            "blood_markers" => p.blood_markers = (m.value as u32).min(MAX_BLOOD_MARKERS),
            other => debug!(player = pid, key = other, "unknown debug key"),
        }
    }

    /// Relay cosmetic effects to everyone else. Attractor effects double as
    /// server-side lures that hostile NPCs chase.
    pub(crate) fn handle_vfx_created(
        &mut self,
        pid: PlayerId,
        m: VfxCreatedMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if !self.players.contains_key(&pid) {
            return;
        }
        ctx.send_except(
            pid,
            ServerMessage::VfxRelay(VfxRelayMsg {
                by: pid,
                kind: m.kind,
                pos: m.pos,
                angle: m.angle,
            }),
        );
        if m.kind == LURE_VFX_KIND {
            self.lures.push(Lure {
                pos: m.pos,
                expires_at: ctx.now + LURE_LIFETIME_SECS,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::context::Target;
    use crate::world::PlayerState;

    fn room() -> (GameRoom, SimConfig) {
        let config = SimConfig::default();
        let mut room = GameRoom::new("r".to_string(), 42, &config);
        room.players
            .insert(1, PlayerState::new(1, "a".into(), Vec2::ZERO, 100.0));
        (room, config)
    }

    #[test]
    fn horde_count_is_capped() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_debug_spawn_horde(
            1,
            DebugSpawnHordeMsg {
                count: 200,
                near: Vec2::ZERO,
            },
            &mut ctx,
        );
        assert_eq!(room.enemies.len(), MAX_HORDE as usize);
    }

    #[test]
    fn set_health_clamps_to_max() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_debug_set_value(
            1,
            DebugSetValueMsg {
                key: "health".into(),
                value: 9999.0,
            },
            &mut ctx,
        );
        assert_eq!(room.players[&1].health, 100.0);
    }

    #[test]
    fn lure_vfx_registers_attractor_and_relays() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(2.0, 0.033, &config);
        room.handle_vfx_created(
            1,
            VfxCreatedMsg {
                kind: LURE_VFX_KIND,
                pos: Vec2::new(50.0, 0.0),
                angle: 0.0,
            },
            &mut ctx,
        );
        assert_eq!(room.lures.len(), 1);
        assert_eq!(room.lures[0].expires_at, 2.0 + LURE_LIFETIME_SECS);
        let out = ctx.drain();
        assert_eq!(out[0].target, Target::Except(1));

        // Non-lure kinds relay without registering anything.
        room.handle_vfx_created(
            1,
            VfxCreatedMsg {
                kind: 9,
                pos: Vec2::ZERO,
                angle: 0.0,
            },
            &mut ctx,
        );
        assert_eq!(room.lures.len(), 1);
    }
}
