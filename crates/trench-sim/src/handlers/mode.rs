//! Scene transitions and the ready/extraction timers.
//!
//! Timers are room-global and cooperative: any player may start or cancel
//! them. Expiry is handled in the tick loop, not here.

use tracing::debug;

use trench_core::net::messages::{
    ModeUpdateMsg, SceneChangeMsg, ServerMessage, SetLevelTypeMsg,
};
use trench_core::player::PlayerId;
use trench_core::room::Scene;

use crate::GameRoom;
use crate::context::RoomContext;

impl GameRoom {
    pub(crate) fn handle_scene_change(
        &mut self,
        pid: PlayerId,
        m: SceneChangeMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if m.scene == self.scene {
            return;
        }
        match m.scene {
            Scene::Level => self.start_level(ctx),
            Scene::Lobby => {
                debug!(player = pid, room = %self.id, "early return to lobby");
                self.reset_to_lobby(ctx);
            },
        }
    }

    /// Choose the level for the next deployment. Only meaningful in the
    /// lobby; mid-level changes are dropped.
    pub(crate) fn handle_set_level_type(
        &mut self,
        _pid: PlayerId,
        m: SetLevelTypeMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if self.scene != Scene::Lobby {
            return;
        }
        self.level_type = m.level_type;
        self.broadcast_mode(ctx);
    }

    pub(crate) fn handle_ready_timer_start(&mut self, _pid: PlayerId, ctx: &mut RoomContext<'_>) {
        if self.scene != Scene::Lobby || self.ready_ends_at.is_some() {
            return;
        }
        self.ready_ends_at = Some(ctx.now + f64::from(ctx.config.ready_timer_secs));
        self.broadcast_mode(ctx);
    }

    pub(crate) fn handle_ready_timer_cancel(&mut self, _pid: PlayerId, ctx: &mut RoomContext<'_>) {
        if self.ready_ends_at.take().is_some() {
            self.broadcast_mode(ctx);
        }
    }

    pub(crate) fn handle_extraction_timer_start(
        &mut self,
        _pid: PlayerId,
        ctx: &mut RoomContext<'_>,
    ) {
        if self.scene != Scene::Level || self.extraction_ends_at.is_some() {
            return;
        }
        self.extraction_ends_at = Some(ctx.now + f64::from(ctx.config.extraction_timer_secs));
        self.broadcast_mode(ctx);
    }

    pub(crate) fn handle_extraction_timer_cancel(
        &mut self,
        _pid: PlayerId,
        ctx: &mut RoomContext<'_>,
    ) {
        if self.extraction_ends_at.take().is_some() {
            self.broadcast_mode(ctx);
        }
    }

    fn broadcast_mode(&self, ctx: &mut RoomContext<'_>) {
        ctx.broadcast(ServerMessage::ModeUpdate(ModeUpdateMsg {
            scene: self.scene,
            level_type: self.level_type,
            ready_timer_remaining: self.ready_ends_at.map(|t| (t - ctx.now).max(0.0) as f32),
            extraction_timer_remaining: self
                .extraction_ends_at
                .map(|t| (t - ctx.now).max(0.0) as f32),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::world::PlayerState;
    use trench_core::math::Vec2;
    use trench_core::room::LevelType;

    fn room() -> (GameRoom, SimConfig) {
        let config = SimConfig::default();
        let mut room = GameRoom::new("r".to_string(), 42, &config);
        room.players
            .insert(1, PlayerState::new(1, "a".into(), Vec2::ZERO, 100.0));
        (room, config)
    }

    #[test]
    fn ready_timer_start_cancel() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(5.0, 0.033, &config);
        room.handle_ready_timer_start(1, &mut ctx);
        assert_eq!(room.ready_ends_at, Some(15.0));
        // Duplicate start does not restart the countdown.
        let mut ctx = RoomContext::new(7.0, 0.033, &config);
        room.handle_ready_timer_start(1, &mut ctx);
        assert_eq!(room.ready_ends_at, Some(15.0));

        room.handle_ready_timer_cancel(1, &mut ctx);
        assert!(room.ready_ends_at.is_none());
    }

    #[test]
    fn level_type_locked_once_deployed() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_set_level_type(
            1,
            SetLevelTypeMsg {
                level_type: LevelType::Catacombs,
            },
            &mut ctx,
        );
        assert_eq!(room.level_type, LevelType::Catacombs);

        room.start_level(&mut ctx);
        room.handle_set_level_type(
            1,
            SetLevelTypeMsg {
                level_type: LevelType::Ruins,
            },
            &mut ctx,
        );
        assert_eq!(room.level_type, LevelType::Catacombs);
    }

    #[test]
    fn extraction_timer_needs_level_scene() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_extraction_timer_start(1, &mut ctx);
        assert!(room.extraction_ends_at.is_none());

        room.start_level(&mut ctx);
        let mut ctx = RoomContext::new(1.0, 0.033, &config);
        room.handle_extraction_timer_start(1, &mut ctx);
        assert_eq!(room.extraction_ends_at, Some(121.0));
    }

    #[test]
    fn scene_change_round_trip() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_scene_change(1, SceneChangeMsg { scene: Scene::Level }, &mut ctx);
        assert_eq!(room.scene, Scene::Level);
        room.handle_scene_change(1, SceneChangeMsg { scene: Scene::Lobby }, &mut ctx);
        assert_eq!(room.scene, Scene::Lobby);
        assert!(room.enemies.is_empty());
    }
}
