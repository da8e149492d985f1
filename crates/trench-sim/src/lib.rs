//! Authoritative per-room simulation.
//!
//! One `GameRoom` owns every piece of mutable gameplay state for its id.
//! The host calls `tick` at a fixed rate and `handle_message` for each
//! decoded client intent; both take a `RoomContext` whose outbox the host
//! drains and delivers after the call returns, so all mutation for a tick
//! is complete before anything is broadcast.

pub mod combat;
pub mod config;
pub mod context;
pub mod loot;
pub mod npc;
pub mod schedule;
pub mod world;

mod handlers;

use std::collections::HashMap;

use tracing::debug;

use trench_core::item::GroundItem;
use trench_core::math::Vec2;
use trench_core::net::messages::{
    ArtifactStateMsg, ChestVariant, ClientMessage, DamageNumberMsg, DamageTargetKind, EnemyKind,
    ExtractionCompleteMsg, ForcedReason, ModeUpdateMsg, PlayerDiedMsg, PlayerHealthUpdateMsg,
    PlayerPosUpdate, PlayerStateUpdateMsg, ReviveCancelMsg, ReviveReadyMsg, RoomSnapshotMsg,
    ServerMessage,
};
use trench_core::player::PlayerId;
use trench_core::rng::SeededRng;
use trench_core::room::{Boundary, LevelType, Scene};

use combat::DamageOutcome;
use context::RoomContext;
use npc::NpcManager;
use schedule::{Schedule, Task};
use world::{Artifact, Barrel, Battery, Bullet, Chest, Enemy, PlayerState, ReviveReady};

pub const LOBBY_BOUNDARY: Boundary = Boundary {
    min_x: -600.0,
    min_y: -600.0,
    max_x: 600.0,
    max_y: 600.0,
};

pub const LEVEL_BOUNDARY: Boundary = Boundary {
    min_x: -2400.0,
    min_y: -2400.0,
    max_x: 2400.0,
    max_y: 2400.0,
};

/// VFX kind that doubles as a server-side attractor lure for hostile NPCs.
pub const LURE_VFX_KIND: u8 = 1;
const LURE_LIFETIME_SECS: f64 = 5.0;

/// Decay on knockback velocity per tick step.
const KNOCKBACK_DECAY: f32 = 0.85;
const DASH_SPEED_MULT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    Fire,
    Ensnare,
}

/// A static area effect on the level floor.
#[derive(Debug, Clone)]
pub struct Hazard {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: HazardKind,
}

const FIRE_HAZARD_DPS: f32 = 4.0;

/// A short-lived attractor that hostile NPCs chase in preference to players.
#[derive(Debug, Clone)]
pub struct Lure {
    pub pos: Vec2,
    pub expires_at: f64,
}

/// Build an `NpcWorld` from a room's fields, leaving `room.npcs` free to
/// borrow alongside it.
macro_rules! npc_world {
    ($room:expr, $lures:expr) => {
        $crate::npc::NpcWorld {
            players: &mut $room.players,
            enemies: &mut $room.enemies,
            ground_items: &mut $room.ground_items,
            next_entity_id: &mut $room.next_entity_id,
            schedule: &mut $room.schedule,
            rng: &mut $room.rng,
            world_seed: $room.world_seed,
            lures: $lures,
            accomplishments: &mut $room.accomplishments,
        }
    };
}
pub(crate) use npc_world;

/// The authoritative state container for one multiplayer session.
pub struct GameRoom {
    pub id: String,
    pub scene: Scene,
    pub level_type: LevelType,
    pub boundary: Boundary,
    pub world_seed: u64,
    pub rng: SeededRng,
    pub players: HashMap<PlayerId, PlayerState>,
    pub enemies: HashMap<u32, Enemy>,
    pub npcs: NpcManager,
    pub chests: HashMap<String, Chest>,
    pub ground_items: HashMap<u32, GroundItem>,
    pub barrels: HashMap<u32, Barrel>,
    pub batteries: HashMap<u32, Battery>,
    pub hazards: Vec<Hazard>,
    pub lures: Vec<Lure>,
    pub bullets: Vec<Bullet>,
    pub artifact: Option<Artifact>,
    pub accomplishments: Vec<String>,
    pub ready_ends_at: Option<f64>,
    pub extraction_ends_at: Option<f64>,
    pub schedule: Schedule,
    next_entity_id: u32,
    next_state_broadcast_at: f64,
}

impl GameRoom {
    pub fn new(id: String, world_seed: u64, config: &config::SimConfig) -> Self {
        Self {
            id,
            scene: Scene::Lobby,
            level_type: LevelType::default(),
            boundary: LOBBY_BOUNDARY,
            world_seed,
            rng: SeededRng::new(world_seed),
            players: HashMap::new(),
            enemies: HashMap::new(),
            npcs: NpcManager::new(config.broadcast_rate_hz),
            chests: HashMap::new(),
            ground_items: HashMap::new(),
            barrels: HashMap::new(),
            batteries: HashMap::new(),
            hazards: Vec::new(),
            lures: Vec::new(),
            bullets: Vec::new(),
            artifact: None,
            accomplishments: Vec::new(),
            ready_ends_at: None,
            extraction_ends_at: None,
            schedule: Schedule::new(),
            next_entity_id: 1,
            next_state_broadcast_at: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub(crate) fn alloc_id(&mut self) -> u32 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Lobby spawn point, staggered so players do not stack.
    fn spawn_point(&self) -> Vec2 {
        let idx = self.players.len() as f32;
        Vec2::new(-80.0 + idx * 40.0, 0.0)
    }

    /// Add a player and send them the late-join snapshot.
    pub fn add_player(&mut self, id: PlayerId, name: String, ctx: &mut RoomContext<'_>) {
        let spawn = self.spawn_point();
        let player = PlayerState::new(id, name, spawn, ctx.config.player_health_max);
        self.players.insert(id, player);
        ctx.send_to(
            id,
            ServerMessage::RoomSnapshot(Box::new(self.snapshot(ctx.now))),
        );
        self.broadcast_player_list(ctx);
    }

    /// Remove a player, dropping whatever they carried and cancelling any
    /// revive involving them.
    pub fn remove_player(&mut self, id: PlayerId, ctx: &mut RoomContext<'_>) {
        self.drop_carried(id, ctx);
        self.schedule.cancel_player(id);
        for p in self.players.values_mut() {
            if p.revive_channel.is_some_and(|c| c.by == id) {
                p.revive_channel = None;
                ctx.broadcast(ServerMessage::ReviveCancel(ReviveCancelMsg { target: p.id }));
            }
        }
        self.players.remove(&id);
        self.broadcast_player_list(ctx);
    }

    fn broadcast_player_list(&self, ctx: &mut RoomContext<'_>) {
        ctx.broadcast(ServerMessage::PlayerList(
            trench_core::net::messages::PlayerListMsg {
                players: self
                    .players
                    .values()
                    .map(|p| trench_core::player::Player {
                        id: p.id,
                        display_name: p.name.clone(),
                    })
                    .collect(),
            },
        ));
    }

    /// Full room sync for late joiners and scene changes.
    pub fn snapshot(&self, now: f64) -> RoomSnapshotMsg {
        RoomSnapshotMsg {
            scene: self.scene,
            level_type: self.level_type,
            world_seed: self.world_seed,
            players: self.players.values().map(PlayerState::snapshot).collect(),
            npcs: self.npcs.snapshots(),
            enemies: self.enemies.values().map(Enemy::snapshot).collect(),
            chests: self.chests.values().map(Chest::snapshot).collect(),
            ground_items: self.ground_items.values().cloned().collect(),
            artifact: self.artifact.as_ref().map(|a| ArtifactStateMsg {
                carried_by: a.carried_by,
                pos: a.pos,
                integrity: a.integrity,
            }),
            batteries: self.batteries.values().map(Battery::state_msg).collect(),
            ready_timer_remaining: self.ready_ends_at.map(|t| (t - now).max(0.0) as f32),
            extraction_timer_remaining: self
                .extraction_ends_at
                .map(|t| (t - now).max(0.0) as f32),
        }
    }

    /// One fixed-rate simulation step. All state mutation happens here (and
    /// in handlers) before the host drains the outbox.
    pub fn tick(&mut self, ctx: &mut RoomContext<'_>) {
        let now = ctx.now;
        let dt = ctx.dt;

        for task in self.schedule.pop_due(now) {
            self.run_task(task, ctx);
        }

        self.tick_players(ctx);
        self.tick_bullets(ctx);

        let lures: Vec<Vec2> = self.lures.iter().map(|l| l.pos).collect();
        self.lures.retain(|l| l.expires_at > now);
        let mut world = npc_world!(self, &lures);
        self.npcs.update(dt, now, &mut world, ctx);

        for e in self.enemies.values_mut() {
            if e.knockback_remaining > 0.0 {
                e.pos = e.pos.add(e.knockback_velocity.scale(dt));
                e.knockback_velocity = e.knockback_velocity.scale(KNOCKBACK_DECAY);
                e.knockback_remaining -= dt;
            }
        }

        if let Some(ends) = self.ready_ends_at
            && now >= ends
        {
            self.ready_ends_at = None;
            self.start_level(ctx);
        }
        if let Some(ends) = self.extraction_ends_at
            && now >= ends
        {
            self.extraction_ends_at = None;
            self.complete_extraction(ctx);
        }

        if now >= self.next_state_broadcast_at {
            let updates: Vec<PlayerPosUpdate> = self
                .players
                .values()
                .map(|p| PlayerPosUpdate {
                    id: p.id,
                    pos: p.pos,
                    last_input_seq: p.last_input_seq,
                    needs_correction: p.needs_correction,
                    forced: p.forced,
                })
                .collect();
            if !updates.is_empty() {
                ctx.broadcast(ServerMessage::PlayerStateUpdate(PlayerStateUpdateMsg {
                    updates,
                }));
            }
            self.next_state_broadcast_at =
                now + 1.0 / f64::from(ctx.config.broadcast_rate_hz.max(1));
        }
    }

    /// DOT, hazards, and forced-movement integration for every player.
    fn tick_players(&mut self, ctx: &mut RoomContext<'_>) {
        let now = ctx.now;
        let dt = ctx.dt;
        let hazards = std::mem::take(&mut self.hazards);
        for p in self.players.values_mut() {
            if p.is_alive() {
                for h in &hazards {
                    if p.pos.distance(h.pos) > h.radius {
                        continue;
                    }
                    match h.kind {
                        HazardKind::Fire => {
                            hurt_player(p, FIRE_HAZARD_DPS * dt, false, ctx, &mut self.schedule);
                        },
                        HazardKind::Ensnare => {
                            p.forced = Some(ForcedReason::Ensnared);
                            p.forced_until = now + 0.25;
                        },
                    }
                }
                let dot_damage = combat::tick_dots(&mut p.dots, dt);
                if dot_damage > 0.0 {
                    hurt_player(p, dot_damage, false, ctx, &mut self.schedule);
                }
            }
            match p.forced {
                Some(ForcedReason::Knockback) => {
                    p.pos = p.pos.add(p.knockback_velocity.scale(dt));
                    p.knockback_velocity = p.knockback_velocity.scale(KNOCKBACK_DECAY);
                    let (x, y) = self.boundary.clamp(p.pos.x, p.pos.y);
                    p.pos = Vec2::new(x, y);
                },
                Some(ForcedReason::Ensnared) | None => {},
            }
            if p.forced.is_some() && now >= p.forced_until {
                p.forced = None;
                p.knockback_velocity = Vec2::ZERO;
                // Client prediction restarts from server truth.
                p.needs_correction = true;
            }
        }
        self.hazards = hazards;
    }

    /// Server-tracked bullets: PvP and barrel collision only.
    fn tick_bullets(&mut self, ctx: &mut RoomContext<'_>) {
        let dt = ctx.dt;
        let mut bullets = std::mem::take(&mut self.bullets);
        bullets.retain_mut(|b| {
            b.life -= dt;
            if b.life <= 0.0 {
                return false;
            }
            b.pos = b.pos.add(b.velocity.scale(dt));
            if b.no_damage {
                return true;
            }
            let owner_evil = self.players.get(&b.owner).map(|p| p.is_evil);
            if let Some(owner_evil) = owner_evil {
                for p in self.players.values_mut() {
                    if p.id == b.owner || !p.is_alive() || p.invisible {
                        continue;
                    }
                    if !combat::pvp_allowed(owner_evil, p.is_evil) {
                        continue;
                    }
                    if p.pos.distance(b.pos) <= b.radius + 16.0 {
                        let amount = combat::apply_armor(b.damage, p.stats.armor);
                        hurt_player(p, amount, false, ctx, &mut self.schedule);
                        return false;
                    }
                }
            }
            let hit_barrel = self
                .barrels
                .values()
                .find(|bar| bar.alive && bar.pos.distance(b.pos) <= b.radius + 14.0)
                .map(|bar| bar.id);
            if let Some(barrel_id) = hit_barrel {
                self.damage_barrel_internal(barrel_id, b.damage, ctx);
                return false;
            }
            true
        });
        self.bullets = bullets;
    }

    fn run_task(&mut self, task: Task, ctx: &mut RoomContext<'_>) {
        match task {
            Task::PotionHealTick {
                player,
                remaining,
                heal_per_tick,
            } => {
                // Re-validate: the drinker may have died or left since.
                let Some(p) = self.players.get_mut(&player) else {
                    return;
                };
                if !p.is_alive() || !p.potion_active {
                    p.potion_active = false;
                    return;
                }
                p.health = (p.health + heal_per_tick).min(p.health_max);
                ctx.broadcast(ServerMessage::PlayerHealthUpdate(PlayerHealthUpdateMsg {
                    id: p.id,
                    health: p.health,
                    health_max: p.health_max,
                }));
                if remaining > 1 {
                    let interval = ctx.config.potion_heal_secs / ctx.config.potion_heal_ticks as f32;
                    self.schedule.push_at(
                        ctx.now + f64::from(interval),
                        Task::PotionHealTick {
                            player,
                            remaining: remaining - 1,
                            heal_per_tick,
                        },
                    );
                } else {
                    p.potion_active = false;
                }
            },
            Task::ReviveChannelComplete { target, by } => {
                let reviver_ok = self
                    .players
                    .get(&by)
                    .is_some_and(|r| r.is_alive());
                let reviver_pos = self.players.get(&by).map(|r| r.pos);
                let Some(t) = self.players.get_mut(&target) else {
                    return;
                };
                let channel_matches = t.revive_channel.is_some_and(|c| c.by == by);
                if !channel_matches {
                    return;
                }
                t.revive_channel = None;
                let in_range = reviver_pos
                    .is_some_and(|rp| rp.distance(t.pos) <= ctx.config.revive_range);
                if !t.is_downed() || !reviver_ok || !in_range {
                    ctx.broadcast(ServerMessage::ReviveCancel(ReviveCancelMsg { target }));
                    return;
                }
                let until = ctx.now + f64::from(ctx.config.revive_accept_window_secs);
                t.revive_ready = Some(ReviveReady { from: by, until });
                self.schedule
                    .push_at(until, Task::ReviveWindowExpire { target });
                ctx.broadcast(ServerMessage::ReviveReady(ReviveReadyMsg {
                    target,
                    from: by,
                    window_secs: ctx.config.revive_accept_window_secs,
                }));
            },
            Task::ReviveWindowExpire { target } => {
                if let Some(t) = self.players.get_mut(&target)
                    && t.revive_ready.is_some_and(|r| ctx.now >= r.until)
                {
                    t.revive_ready = None;
                    ctx.broadcast(ServerMessage::ReviveCancel(ReviveCancelMsg { target }));
                }
            },
            Task::ChestRespawn { chest_id } => {
                if let Some(c) = self.chests.get_mut(&chest_id) {
                    c.opened = false;
                    c.opening = false;
                    c.health = c.health_max;
                    ctx.broadcast(ServerMessage::ChestUpdate(
                        trench_core::net::messages::ChestUpdateMsg {
                            chest_id,
                            health: c.health,
                            opening: false,
                        },
                    ));
                }
            },
        }
    }

    /// Deploy into a level: regenerate every level-owned entity from the
    /// world RNG and sync all clients.
    pub(crate) fn start_level(&mut self, ctx: &mut RoomContext<'_>) {
        self.scene = Scene::Level;
        self.boundary = LEVEL_BOUNDARY;
        self.enemies.clear();
        self.npcs.clear();
        self.chests.clear();
        self.ground_items.clear();
        self.barrels.clear();
        self.batteries.clear();
        self.hazards.clear();
        self.lures.clear();
        self.bullets.clear();
        self.artifact = None;
        self.accomplishments.clear();

        let boss_id = self.alloc_id();
        let boss_pos = self.random_level_pos(900.0, 2000.0);
        self.enemies
            .insert(boss_id, Enemy::new(boss_id, EnemyKind::Boss, boss_pos, 5000.0));
        for _ in 0..6 {
            let id = self.alloc_id();
            let pos = self.random_level_pos(400.0, 2200.0);
            self.enemies.insert(id, Enemy::new(id, EnemyKind::Troop, pos, 60.0));
        }

        let prisoner_id = self.alloc_id();
        let prisoner_pos = self.random_level_pos(200.0, 700.0);
        self.npcs.spawn_prisoner(prisoner_id, prisoner_pos);
        let priest_id = self.alloc_id();
        let priest_pos = self.random_level_pos(900.0, 1800.0);
        self.npcs.spawn_priest(priest_id, priest_pos, ctx.config);

        let gold_pos = self.random_level_pos(800.0, 2000.0);
        self.chests.insert("gold_1".to_string(), Chest {
            id: "gold_1".to_string(),
            pos: gold_pos,
            variant: ChestVariant::Gold,
            opening: false,
            opened: false,
            health: 120.0,
            health_max: 120.0,
            has_artifact: true,
        });
        for i in 1..=3 {
            let id = format!("brown_{i}");
            let pos = self.random_level_pos(300.0, 2200.0);
            self.chests.insert(id.clone(), Chest {
                id,
                pos,
                variant: ChestVariant::Brown,
                opening: false,
                opened: false,
                health: 80.0,
                health_max: 80.0,
                has_artifact: false,
            });
        }
        let start_pos = self.random_level_pos(120.0, 300.0);
        self.chests.insert("start_gear_1".to_string(), Chest {
            id: "start_gear_1".to_string(),
            pos: start_pos,
            variant: ChestVariant::StartGear,
            opening: false,
            opened: false,
            health: 40.0,
            health_max: 40.0,
            has_artifact: false,
        });

        for _ in 0..4 {
            let id = self.alloc_id();
            let pos = self.random_level_pos(300.0, 2100.0);
            self.barrels.insert(id, Barrel {
                id,
                pos,
                health: 30.0,
                alive: true,
            });
        }
        for _ in 0..2 {
            let id = self.alloc_id();
            let pos = self.random_level_pos(600.0, 1600.0);
            self.batteries.insert(id, Battery {
                id,
                pos,
                carried_by: None,
                placed: false,
            });
        }
        for _ in 0..2 {
            let pos = self.random_level_pos(400.0, 2000.0);
            self.hazards.push(Hazard {
                pos,
                radius: 90.0,
                kind: HazardKind::Fire,
            });
        }
        let pos = self.random_level_pos(400.0, 2000.0);
        self.hazards.push(Hazard {
            pos,
            radius: 70.0,
            kind: HazardKind::Ensnare,
        });

        // Deploy players together at the level entry.
        let ids: Vec<PlayerId> = self.players.keys().copied().collect();
        for (i, pid) in ids.iter().enumerate() {
            if let Some(p) = self.players.get_mut(pid) {
                p.pos = Vec2::new(-60.0 + 40.0 * i as f32, -60.0);
                p.needs_correction = true;
            }
        }

        ctx.broadcast(ServerMessage::ModeUpdate(ModeUpdateMsg {
            scene: self.scene,
            level_type: self.level_type,
            ready_timer_remaining: None,
            extraction_timer_remaining: self
                .extraction_ends_at
                .map(|t| (t - ctx.now).max(0.0) as f32),
        }));
        ctx.broadcast(ServerMessage::RoomSnapshot(Box::new(self.snapshot(ctx.now))));
    }

    /// Extraction success: report accomplishments and reset to lobby.
    pub(crate) fn complete_extraction(&mut self, ctx: &mut RoomContext<'_>) {
        ctx.broadcast(ServerMessage::ExtractionComplete(ExtractionCompleteMsg {
            accomplishments: self.accomplishments.clone(),
        }));
        self.reset_to_lobby(ctx);
    }

    pub(crate) fn reset_to_lobby(&mut self, ctx: &mut RoomContext<'_>) {
        self.scene = Scene::Lobby;
        self.boundary = LOBBY_BOUNDARY;
        self.enemies.clear();
        self.npcs.clear();
        self.chests.clear();
        self.ground_items.clear();
        self.barrels.clear();
        self.batteries.clear();
        self.hazards.clear();
        self.lures.clear();
        self.bullets.clear();
        self.artifact = None;
        self.ready_ends_at = None;
        self.extraction_ends_at = None;
        self.schedule = Schedule::new();

        let ids: Vec<PlayerId> = self.players.keys().copied().collect();
        for (i, pid) in ids.iter().enumerate() {
            if let Some(p) = self.players.get_mut(pid) {
                p.pos = Vec2::new(-80.0 + 40.0 * i as f32, 0.0);
                p.health = p.health_max;
                p.downed_at = None;
                p.respawn_requested = false;
                p.revive_channel = None;
                p.revive_ready = None;
                p.carrying_battery = None;
                p.clear_status_effects();
                p.needs_correction = true;
            }
        }
        ctx.broadcast(ServerMessage::ModeUpdate(ModeUpdateMsg {
            scene: self.scene,
            level_type: self.level_type,
            ready_timer_remaining: None,
            extraction_timer_remaining: None,
        }));
        ctx.broadcast(ServerMessage::RoomSnapshot(Box::new(self.snapshot(ctx.now))));
    }

    fn random_level_pos(&mut self, min_dist: f32, max_dist: f32) -> Vec2 {
        let angle = self.rng.gen_range_f64(0.0, std::f64::consts::TAU) as f32;
        let dist = self
            .rng
            .gen_range_f64(f64::from(min_dist), f64::from(max_dist)) as f32;
        let p = Vec2::from_angle(angle).scale(dist);
        let (x, y) = LEVEL_BOUNDARY.clamp(p.x, p.y);
        Vec2::new(x, y)
    }

    /// Route one decoded client intent to its handler. Unknown or
    /// out-of-place intents are dropped: a stale socket must never take the
    /// room down.
    pub fn handle_message(
        &mut self,
        pid: PlayerId,
        msg: ClientMessage,
        ctx: &mut RoomContext<'_>,
    ) {
        if !self.players.contains_key(&pid) {
            debug!(player = pid, "intent from player not in room, dropping");
            return;
        }
        match msg {
            ClientMessage::JoinRoom(_) | ClientMessage::LeaveRoom(_) => {
                // Session lifecycle is the host's job, not the sim's.
                debug!(player = pid, "session message reached the sim, dropping");
            },
            ClientMessage::PlayerInput(m) => self.handle_player_input(pid, m, ctx),
            ClientMessage::BulletFired(m) => self.handle_bullet_fired(pid, m, ctx),
            ClientMessage::Weapon7Hitscan(m) => self.handle_hitscan(pid, 7, m, ctx),
            ClientMessage::Weapon8Hitscan(m) => self.handle_hitscan(pid, 8, m, ctx),
            ClientMessage::ExplosionDamage(m) => self.handle_explosion_damage(pid, m, ctx),
            ClientMessage::ProjectileHit(m) => self.handle_projectile_hit(pid, m, ctx),
            ClientMessage::DotTick(m) => self.handle_dot_tick(pid, m, ctx),
            ClientMessage::EnemyDied(m) => self.handle_enemy_died(pid, m, ctx),
            ClientMessage::ChestDamage(m) => self.handle_chest_damage(pid, m, ctx),
            ClientMessage::BarrelDamage(m) => self.handle_barrel_damage(pid, m, ctx),
            ClientMessage::ArtifactDamage(m) => self.handle_artifact_damage(pid, m, ctx),
            ClientMessage::PvpDirectDamage(m) => self.handle_pvp_direct_damage(pid, m, ctx),
            ClientMessage::NpcDamage(m) => self.handle_npc_damage(pid, m, ctx),
            ClientMessage::NpcDot(m) => self.handle_npc_dot(pid, m, ctx),
            ClientMessage::NpcSetState(m) => self.handle_npc_set_state(pid, m, ctx),
            ClientMessage::SceneChange(m) => self.handle_scene_change(pid, m, ctx),
            ClientMessage::SetLevelType(m) => self.handle_set_level_type(pid, m, ctx),
            ClientMessage::ReadyTimerStart(_) => self.handle_ready_timer_start(pid, ctx),
            ClientMessage::ReadyTimerCancel(_) => self.handle_ready_timer_cancel(pid, ctx),
            ClientMessage::ExtractionTimerStart(_) => {
                self.handle_extraction_timer_start(pid, ctx);
            },
            ClientMessage::ExtractionTimerCancel(_) => {
                self.handle_extraction_timer_cancel(pid, ctx);
            },
            ClientMessage::ReviveStartRequest(m) => self.handle_revive_start(pid, m, ctx),
            ClientMessage::ReviveAccept(_) => self.handle_revive_accept(pid, ctx),
            ClientMessage::PlayerDeath(_) => self.handle_player_death(pid, ctx),
            ClientMessage::PlayerRespawn(_) => self.handle_player_respawn(pid, ctx),
            ClientMessage::UseHealthPotion(_) => self.handle_use_health_potion(pid, ctx),
            ClientMessage::InvincibilityToggle(m) => {
                self.handle_invincibility_toggle(pid, m.enabled, ctx);
            },
            ClientMessage::InvisibilityToggle(m) => {
                self.handle_invisibility_toggle(pid, m.enabled, ctx);
            },
            ClientMessage::SetEvilState(m) => self.handle_set_evil_state(pid, m.enabled, ctx),
            ClientMessage::ChestOpenRequest(m) => self.handle_chest_open(pid, m, ctx),
            ClientMessage::InventoryDropRequest(m) => self.handle_inventory_drop(pid, m, ctx),
            ClientMessage::InventoryPickupRequest(m) => {
                self.handle_inventory_pickup(pid, m, ctx);
            },
            ClientMessage::ArtifactPickupRequest(_) => self.handle_artifact_pickup(pid, ctx),
            ClientMessage::ArtifactDropRequest(_) => self.handle_artifact_drop(pid, ctx),
            ClientMessage::BatteryPickupRequest(m) => self.handle_battery_pickup(pid, m, ctx),
            ClientMessage::BatteryDropRequest(_) => self.handle_battery_drop(pid, ctx),
            ClientMessage::BatteryPlaceRequest(_) => self.handle_battery_place(pid, ctx),
            ClientMessage::RequestShopInventory(_) => self.handle_request_shop(pid, ctx),
            ClientMessage::PurchaseShopItem(m) => self.handle_purchase(pid, m, ctx),
            ClientMessage::QuartermasterRequisition(_) => self.handle_quartermaster(pid, ctx),
            ClientMessage::DebugSpawnHorde(m) => self.handle_debug_spawn_horde(pid, m, ctx),
            ClientMessage::DebugSetValue(m) => self.handle_debug_set_value(pid, m, ctx),
            ClientMessage::VfxCreated(m) => self.handle_vfx_created(pid, m, ctx),
        }
    }
}

/// Apply damage to one player with full side effects: health broadcast,
/// damage number, and the one-shot death transition into the revive flow.
pub(crate) fn hurt_player(
    player: &mut PlayerState,
    amount: f32,
    crit: bool,
    ctx: &mut RoomContext<'_>,
    schedule: &mut Schedule,
) -> DamageOutcome {
    let outcome = combat::damage_player(player, amount);
    let DamageOutcome::Applied { died } = outcome else {
        return outcome;
    };
    ctx.broadcast(ServerMessage::PlayerHealthUpdate(PlayerHealthUpdateMsg {
        id: player.id,
        health: player.health,
        health_max: player.health_max,
    }));
    ctx.broadcast(ServerMessage::DamageNumber(DamageNumberMsg {
        pos: player.pos,
        amount,
        crit,
        target: DamageTargetKind::Player,
    }));
    if died {
        player.downed_at = Some(ctx.now);
        player.respawn_requested = false;
        player.revive_ready = None;
        player.revive_channel = None;
        player.clear_status_effects();
        schedule.cancel_potion(player.id);
        ctx.broadcast(ServerMessage::PlayerDied(PlayerDiedMsg {
            id: player.id,
            revive_window_secs: ctx.config.revive_window_secs,
        }));
    }
    outcome
}
