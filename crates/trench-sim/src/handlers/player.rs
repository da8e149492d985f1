//! Player movement, the two-phase revive flow, respawn, potions, and
//! status toggles.

use trench_core::math::Vec2;
use trench_core::net::messages::{
    PlayerHealthUpdateMsg, PlayerInputMsg, PlayerRespawnedMsg, ReviveBeginMsg,
    ReviveStartRequestMsg, ServerMessage, StatusToggleKind, StatusToggleResultMsg,
};
use trench_core::player::PlayerId;

use crate::context::RoomContext;
use crate::schedule::Task;
use crate::world::ReviveChannel;
use crate::{DASH_SPEED_MULT, GameRoom, hurt_player};

/// Largest per-input timestep the server will integrate. Anything bigger is
/// a stalled or doctored client.
const MAX_INPUT_DT: f32 = 0.1;

impl GameRoom {
    /// Integrate one movement input and compare against the client's claimed
    /// position. The server's integration is authoritative; drift beyond the
    /// threshold flags the client for a forced correction.
    pub(crate) fn handle_player_input(
        &mut self,
        pid: PlayerId,
        m: PlayerInputMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let boundary = self.boundary;
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        // While downed or forced the server owns the position outright.
        if !p.is_alive() || p.forced.is_some() {
            return;
        }
        if m.seq <= p.last_input_seq && p.last_input_seq != 0 {
            return;
        }
        p.last_input_seq = m.seq;

        let dt = m.dt.clamp(0.0, MAX_INPUT_DT);
        let mut dir = Vec2::new(m.move_x, m.move_y);
        let len = dir.length();
        if len > 1.0 {
            dir = dir.scale(1.0 / len);
        }
        let speed = p.stats.speed * if m.dash { DASH_SPEED_MULT } else { 1.0 };
        p.pos = p.pos.add(dir.scale(speed * dt));
        let (x, y) = boundary.clamp(p.pos.x, p.pos.y);
        p.pos = Vec2::new(x, y);

        p.needs_correction = p.pos.distance(m.claimed_pos) > ctx.config.correction_threshold;
    }

    /// Phase one of a revive: a living teammate starts a channel on a downed
    /// player. Completion is re-validated when the scheduled task fires.
    pub(crate) fn handle_revive_start(
        &mut self,
        pid: PlayerId,
        m: ReviveStartRequestMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if m.target == pid {
            return;
        }
        let Some(reviver) = self.players.get(&pid).filter(|p| p.is_alive()) else {
            return;
        };
        let reviver_pos = reviver.pos;
        let Some(target) = self.players.get_mut(&m.target) else {
            return;
        };
        let within_window = target
            .downed_at
            .is_some_and(|at| ctx.now - at <= f64::from(ctx.config.revive_window_secs));
        if !target.is_downed()
            || !within_window
            || target.revive_channel.is_some()
            || target.revive_ready.is_some()
            || reviver_pos.distance(target.pos) > ctx.config.revive_range
        {
            return;
        }
        let complete_at = ctx.now + f64::from(ctx.config.revive_channel_secs);
        target.revive_channel = Some(ReviveChannel {
            by: pid,
            complete_at,
        });
        self.schedule.push_at(complete_at, Task::ReviveChannelComplete {
            target: m.target,
            by: pid,
        });
        ctx.broadcast(ServerMessage::ReviveBegin(ReviveBeginMsg {
            target: m.target,
            by: pid,
            duration_secs: ctx.config.revive_channel_secs,
        }));
    }

    /// Phase two: the downed player accepts a completed channel and comes
    /// back at a fraction of max health.
    pub(crate) fn handle_revive_accept(&mut self, pid: PlayerId, ctx: &mut RoomContext<'_>) {
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        let valid = p.revive_ready.is_some_and(|r| ctx.now <= r.until);
        if !p.is_downed() || !valid {
            return;
        }
        p.revive_ready = None;
        p.downed_at = None;
        p.clear_status_effects();
        p.health = p.health_max * ctx.config.revive_health_fraction;
        self.schedule.cancel_revive(pid);
        ctx.broadcast(ServerMessage::ReviveComplete(
            trench_core::net::messages::ReviveCompleteMsg {
                target: pid,
                health: p.health,
            },
        ));
        ctx.broadcast(ServerMessage::PlayerHealthUpdate(PlayerHealthUpdateMsg {
            id: pid,
            health: p.health,
            health_max: p.health_max,
        }));
    }

    /// Client-reported death from a cause the server does not simulate
    /// (falls, scripted kills). Runs the normal death path.
    pub(crate) fn handle_player_death(&mut self, pid: PlayerId, ctx: &mut RoomContext<'_>) {
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        if !p.is_alive() {
            return;
        }
        let remaining = p.health;
        hurt_player(p, remaining, false, ctx, &mut self.schedule);
    }

    /// Give up on a revive and come back at base, full health, empty-handed.
    pub(crate) fn handle_player_respawn(&mut self, pid: PlayerId, ctx: &mut RoomContext<'_>) {
        self.drop_carried(pid, ctx);
        self.schedule.cancel_player(pid);
        let spawn = match self.scene {
            trench_core::room::Scene::Lobby => Vec2::new(-80.0, 0.0),
            trench_core::room::Scene::Level => Vec2::new(-60.0, -60.0),
        };
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        if !p.is_downed() {
            return;
        }
        p.downed_at = None;
        p.respawn_requested = false;
        p.revive_channel = None;
        p.revive_ready = None;
        p.clear_status_effects();
        p.health = p.health_max;
        p.pos = spawn;
        p.needs_correction = true;
        ctx.broadcast(ServerMessage::PlayerRespawned(PlayerRespawnedMsg {
            id: pid,
            pos: p.pos,
            health: p.health,
        }));
    }

    /// Drink a potion: healing arrives as scheduled pulses, not a lump sum,
    /// so death mid-potion forfeits the remainder.
    pub(crate) fn handle_use_health_potion(&mut self, pid: PlayerId, ctx: &mut RoomContext<'_>) {
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        if !p.is_alive() || p.potion_active {
            return;
        }
        p.potion_active = true;
        let ticks = ctx.config.potion_heal_ticks.max(1);
        let heal_per_tick = ctx.config.potion_heal_total / ticks as f32;
        let interval = ctx.config.potion_heal_secs / ticks as f32;
        self.schedule
            .push_at(ctx.now + f64::from(interval), Task::PotionHealTick {
                player: pid,
                remaining: ticks,
                heal_per_tick,
            });
    }

    pub(crate) fn handle_invincibility_toggle(
        &mut self,
        pid: PlayerId,
        enabled: bool,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        p.invincible = enabled;
        ctx.broadcast(ServerMessage::StatusToggleResult(StatusToggleResultMsg {
            id: pid,
            which: StatusToggleKind::Invincibility,
            enabled,
            success: true,
        }));
    }

    pub(crate) fn handle_invisibility_toggle(
        &mut self,
        pid: PlayerId,
        enabled: bool,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        p.invisible = enabled;
        ctx.broadcast(ServerMessage::StatusToggleResult(StatusToggleResultMsg {
            id: pid,
            which: StatusToggleKind::Invisibility,
            enabled,
            success: true,
        }));
    }

    /// Opting in or out of PvP. Cannot be flipped while downed.
    pub(crate) fn handle_set_evil_state(
        &mut self,
        pid: PlayerId,
        enabled: bool,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(p) = self.players.get_mut(&pid) else {
            return;
        };
        let success = !p.is_downed();
        if success {
            p.is_evil = enabled;
        }
        ctx.broadcast(ServerMessage::StatusToggleResult(StatusToggleResultMsg {
            id: pid,
            which: StatusToggleKind::Evil,
            enabled: p.is_evil,
            success,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::world::PlayerState;

    fn room() -> (GameRoom, SimConfig) {
        let config = SimConfig::default();
        let mut room = GameRoom::new("r".to_string(), 42, &config);
        room.players
            .insert(1, PlayerState::new(1, "a".into(), Vec2::ZERO, 100.0));
        room.players
            .insert(2, PlayerState::new(2, "b".into(), Vec2::new(40.0, 0.0), 100.0));
        (room, config)
    }

    fn down(room: &mut GameRoom, pid: PlayerId, at: f64) {
        let p = room.players.get_mut(&pid).unwrap();
        p.health = 0.0;
        p.downed_at = Some(at);
    }

    fn input(seq: u32, move_x: f32, dt: f32, claimed: Vec2) -> PlayerInputMsg {
        PlayerInputMsg {
            seq,
            move_x,
            move_y: 0.0,
            aim_angle: 0.0,
            dash: false,
            dt,
            claimed_pos: claimed,
        }
    }

    #[test]
    fn input_integrates_and_accepts_honest_claim() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        // 220 speed * 0.05s = 11 units along +x.
        room.handle_player_input(1, input(1, 1.0, 0.05, Vec2::new(11.0, 0.0)), &mut ctx);
        let p = &room.players[&1];
        assert!((p.pos.x - 11.0).abs() < 1e-3);
        assert!(!p.needs_correction);
        assert_eq!(p.last_input_seq, 1);
    }

    #[test]
    fn drifted_claim_flags_correction() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_player_input(1, input(1, 1.0, 0.05, Vec2::new(80.0, 0.0)), &mut ctx);
        assert!(room.players[&1].needs_correction);
        // Server kept its own integration, not the claim.
        assert!((room.players[&1].pos.x - 11.0).abs() < 1e-3);
    }

    #[test]
    fn stale_input_seq_is_ignored() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_player_input(1, input(5, 1.0, 0.05, Vec2::new(11.0, 0.0)), &mut ctx);
        room.handle_player_input(1, input(4, 1.0, 0.05, Vec2::new(22.0, 0.0)), &mut ctx);
        assert_eq!(room.players[&1].last_input_seq, 5);
        assert!((room.players[&1].pos.x - 11.0).abs() < 1e-3);
    }

    #[test]
    fn revive_full_flow() {
        let (mut room, config) = room();
        down(&mut room, 2, 10.0);

        let mut ctx = RoomContext::new(10.5, 0.033, &config);
        room.handle_revive_start(1, ReviveStartRequestMsg { target: 2 }, &mut ctx);
        assert!(room.players[&2].revive_channel.is_some());
        assert!(ctx
            .outbox()
            .iter()
            .any(|o| matches!(&o.msg, ServerMessage::ReviveBegin(m) if m.target == 2 && m.by == 1)));

        // Channel completes 4 seconds later.
        let mut ctx = RoomContext::new(14.6, 0.033, &config);
        for task in room.schedule.pop_due(14.6) {
            room.run_task(task, &mut ctx);
        }
        assert!(room.players[&2].revive_ready.is_some());

        room.handle_revive_accept(2, &mut ctx);
        let p = &room.players[&2];
        assert!(p.is_alive());
        assert!((p.health - 30.0).abs() < 1e-3);
        assert!(p.downed_at.is_none());
    }

    #[test]
    fn revive_start_rejected_out_of_range() {
        let (mut room, config) = room();
        down(&mut room, 2, 10.0);
        room.players.get_mut(&2).unwrap().pos = Vec2::new(500.0, 0.0);
        let mut ctx = RoomContext::new(10.5, 0.033, &config);
        room.handle_revive_start(1, ReviveStartRequestMsg { target: 2 }, &mut ctx);
        assert!(room.players[&2].revive_channel.is_none());
    }

    #[test]
    fn revive_channel_cancelled_if_reviver_walks_away() {
        let (mut room, config) = room();
        down(&mut room, 2, 10.0);
        let mut ctx = RoomContext::new(10.5, 0.033, &config);
        room.handle_revive_start(1, ReviveStartRequestMsg { target: 2 }, &mut ctx);

        room.players.get_mut(&1).unwrap().pos = Vec2::new(900.0, 0.0);
        let mut ctx = RoomContext::new(14.6, 0.033, &config);
        for task in room.schedule.pop_due(14.6) {
            room.run_task(task, &mut ctx);
        }
        assert!(room.players[&2].revive_ready.is_none());
        assert!(ctx
            .outbox()
            .iter()
            .any(|o| matches!(&o.msg, ServerMessage::ReviveCancel(m) if m.target == 2)));
    }

    #[test]
    fn revive_window_expiry_requires_respawn() {
        let (mut room, config) = room();
        down(&mut room, 2, 10.0);
        // Way past the revive window.
        let mut ctx = RoomContext::new(100.0, 0.033, &config);
        room.handle_revive_start(1, ReviveStartRequestMsg { target: 2 }, &mut ctx);
        assert!(room.players[&2].revive_channel.is_none());

        room.handle_player_respawn(2, &mut ctx);
        let p = &room.players[&2];
        assert!(p.is_alive());
        assert_eq!(p.health, p.health_max);
    }

    #[test]
    fn potion_heals_in_pulses_and_stops_on_death() {
        let (mut room, config) = room();
        room.players.get_mut(&1).unwrap().health = 40.0;
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_use_health_potion(1, &mut ctx);
        assert!(room.players[&1].potion_active);

        // Two pulses of 5 each.
        for t in [0.6, 1.1] {
            let mut ctx = RoomContext::new(t, 0.033, &config);
            for task in room.schedule.pop_due(t) {
                room.run_task(task, &mut ctx);
            }
        }
        assert!((room.players[&1].health - 50.0).abs() < 1e-3);

        // Death forfeits the remaining pulses.
        let p = room.players.get_mut(&1).unwrap();
        let remaining = p.health;
        hurt_player(p, remaining, false, &mut ctx, &mut room.schedule);
        assert!(room.schedule.is_empty());
    }

    #[test]
    fn evil_toggle_blocked_while_downed() {
        let (mut room, config) = room();
        down(&mut room, 1, 5.0);
        let mut ctx = RoomContext::new(5.5, 0.033, &config);
        room.handle_set_evil_state(1, true, &mut ctx);
        assert!(!room.players[&1].is_evil);
        assert!(ctx.outbox().iter().any(|o| matches!(
            &o.msg,
            ServerMessage::StatusToggleResult(m) if !m.success
        )));
    }
}
