//! Server-authoritative NPC state machines.
//!
//! Two archetypes: the prisoner escort, whose every path ends in an
//! explosion, and the heretic priest, a durable burst-fire caster that
//! resets home when kited too far from its spawn. `switch_state` is the
//! only place a state changes; it also resets bark flavor so dialogue
//! always matches the new state.

use std::collections::HashMap;

use trench_core::item::GroundItem;
use trench_core::math::{Vec2, within_cone};
use trench_core::net::messages::{
    EnemyDamagedMsg, EnemyKilledMsg, EnemyKind, GroundItemSpawnedMsg, NpcDiedMsg, NpcExplosionMsg,
    NpcUpdateMsg, ServerMessage,
};
use trench_core::npc::{NpcId, NpcKind, NpcSnapshot, NpcState, PriestState, PrisonerState};
use trench_core::player::PlayerId;
use trench_core::rng::SeededRng;

use crate::combat::{self, DamageOutcome};
use crate::config::SimConfig;
use crate::context::RoomContext;
use crate::loot;
use crate::schedule::Schedule;
use crate::world::{DotSource, DotStack, Enemy, PlayerState};

const PLAYER_RADIUS: f32 = 16.0;
const CONTACT_EPSILON: f32 = 4.0;
const BARK_INTERVAL_MIN: f64 = 4.0;
const BARK_INTERVAL_MAX: f64 = 8.0;

/// Mutable room state the NPC update pass needs, split off `GameRoom` so the
/// manager can borrow it alongside itself.
pub struct NpcWorld<'a> {
    pub players: &'a mut HashMap<PlayerId, PlayerState>,
    pub enemies: &'a mut HashMap<u32, Enemy>,
    pub ground_items: &'a mut HashMap<u32, GroundItem>,
    pub next_entity_id: &'a mut u32,
    pub schedule: &'a mut Schedule,
    pub rng: &'a mut SeededRng,
    pub world_seed: u64,
    pub lures: &'a [Vec2],
    pub accomplishments: &'a mut Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Prisoner {
    pub id: NpcId,
    pub pos: Vec2,
    pub radius: f32,
    pub state: PrisonerState,
    pub alive: bool,
    pub follow_target: Option<PlayerId>,
    pub hostile_target: Option<PlayerId>,
    /// Counts down inside `Betrayed` and `Hostile`.
    pub state_timer: f32,
    pub attack_cooldown: f32,
    pub bark_line: u8,
    pub bark_next_at: f64,
}

impl Prisoner {
    fn new(id: NpcId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            radius: 14.0,
            state: PrisonerState::Idle,
            alive: true,
            follow_target: None,
            hostile_target: None,
            state_timer: 0.0,
            attack_cooldown: 0.0,
            bark_line: 0,
            bark_next_at: 0.0,
        }
    }

    fn switch_state(&mut self, new: PrisonerState, config: &SimConfig) {
        self.state = new;
        self.bark_line = 0;
        self.bark_next_at = 0.0;
        self.state_timer = match new {
            PrisonerState::Betrayed => config.prisoner_betrayed_secs,
            PrisonerState::Hostile => config.prisoner_hostile_secs,
            _ => 0.0,
        };
    }

    fn snapshot(&self) -> NpcSnapshot {
        NpcSnapshot {
            id: self.id,
            kind: NpcKind::Prisoner,
            pos: self.pos,
            state: NpcState::Prisoner(self.state),
            alive: self.alive,
            health: None,
            bark_line: self.bark_line,
        }
    }
}

/// Heretic priest movement phase while hostile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovePhase {
    Charge { timer: f32 },
    Evade { timer: f32, strafe_dir: f32 },
}

/// Burst-fire attack phase, independent of movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackPhase {
    Burst { remaining: f32, next_shot: f32 },
    Rest { remaining: f32 },
}

#[derive(Debug, Clone)]
pub struct Priest {
    pub id: NpcId,
    pub pos: Vec2,
    pub spawn_pos: Vec2,
    pub radius: f32,
    pub state: PriestState,
    pub alive: bool,
    pub health: f32,
    pub target: Option<PlayerId>,
    /// Pre-attack announce delay on entering hostile.
    pub announce_remaining: f32,
    pub move_phase: MovePhase,
    pub attack_phase: AttackPhase,
    pub dots: Vec<DotStack>,
    pub bark_line: u8,
    pub bark_next_at: f64,
}

impl Priest {
    fn new(id: NpcId, pos: Vec2, config: &SimConfig) -> Self {
        Self {
            id,
            pos,
            spawn_pos: pos,
            radius: 18.0,
            state: PriestState::Idle,
            alive: true,
            health: config.priest_health,
            target: None,
            announce_remaining: 0.0,
            move_phase: MovePhase::Charge { timer: 2.0 },
            attack_phase: AttackPhase::Rest { remaining: 1.0 },
            dots: Vec::new(),
            bark_line: 0,
            bark_next_at: 0.0,
        }
    }

    fn switch_state(&mut self, new: PriestState, config: &SimConfig, rng: &mut SeededRng) {
        self.state = new;
        self.bark_line = 0;
        self.bark_next_at = 0.0;
        match new {
            PriestState::Idle => {
                self.target = None;
                self.dots.clear();
            },
            PriestState::Hostile => {
                self.health = config.priest_health;
                self.announce_remaining = config.priest_announce_secs;
                self.move_phase = MovePhase::Charge {
                    timer: rng.gen_range_f64(1.0, 3.0) as f32,
                };
                self.attack_phase = AttackPhase::Rest {
                    remaining: rng.gen_range_f64(
                        f64::from(config.priest_rest_secs_min),
                        f64::from(config.priest_rest_secs_max),
                    ) as f32,
                };
            },
        }
    }

    fn snapshot(&self) -> NpcSnapshot {
        NpcSnapshot {
            id: self.id,
            kind: NpcKind::HereticPriest,
            pos: self.pos,
            state: NpcState::Priest(self.state),
            alive: self.alive,
            health: Some(self.health),
            bark_line: self.bark_line,
        }
    }
}

/// Per-room NPC owner: runs every state machine once per tick, then emits a
/// rate-limited snapshot broadcast.
pub struct NpcManager {
    pub prisoners: Vec<Prisoner>,
    pub priests: Vec<Priest>,
    next_broadcast_at: f64,
    broadcast_interval: f64,
}

impl NpcManager {
    pub fn new(broadcast_rate_hz: u32) -> Self {
        Self {
            prisoners: Vec::new(),
            priests: Vec::new(),
            next_broadcast_at: 0.0,
            broadcast_interval: 1.0 / f64::from(broadcast_rate_hz.max(1)),
        }
    }

    pub fn clear(&mut self) {
        self.prisoners.clear();
        self.priests.clear();
    }

    pub fn spawn_prisoner(&mut self, id: NpcId, pos: Vec2) {
        self.prisoners.push(Prisoner::new(id, pos));
    }

    pub fn spawn_priest(&mut self, id: NpcId, pos: Vec2, config: &SimConfig) {
        self.priests.push(Priest::new(id, pos, config));
    }

    pub fn snapshots(&self) -> Vec<NpcSnapshot> {
        self.prisoners
            .iter()
            .map(Prisoner::snapshot)
            .chain(self.priests.iter().map(Priest::snapshot))
            .collect()
    }

    /// Dialogue-triggered transition request. Only transitions on the legal
    /// graph are honored; anything else is silently dropped.
    pub fn request_state(
        &mut self,
        npc_id: NpcId,
        requested: NpcState,
        requester: PlayerId,
        config: &SimConfig,
        rng: &mut SeededRng,
    ) -> bool {
        if let NpcState::Prisoner(new) = requested
            && let Some(p) = self
                .prisoners
                .iter_mut()
                .find(|p| p.id == npc_id && p.alive)
        {
            let legal = matches!(
                (p.state, new),
                (PrisonerState::Idle, PrisonerState::Follow)
                    | (PrisonerState::Idle, PrisonerState::Betrayed)
                    | (PrisonerState::Follow, PrisonerState::Betrayed)
            );
            if !legal {
                return false;
            }
            match new {
                PrisonerState::Follow => p.follow_target = Some(requester),
                PrisonerState::Betrayed => p.hostile_target = Some(requester),
                _ => {},
            }
            p.switch_state(new, config);
            return true;
        }
        if let NpcState::Priest(new) = requested
            && let Some(p) = self.priests.iter_mut().find(|p| p.id == npc_id && p.alive)
        {
            if p.state == PriestState::Idle && new == PriestState::Hostile {
                p.target = Some(requester);
                p.switch_state(PriestState::Hostile, config, rng);
                return true;
            }
            return false;
        }
        false
    }

    /// Direct damage to a priest. Priests only take damage while hostile.
    /// Returns true when this hit killed it.
    pub fn damage_priest(
        &mut self,
        npc_id: NpcId,
        amount: f32,
        world: &mut NpcWorld<'_>,
        ctx: &mut RoomContext<'_>,
    ) -> bool {
        let Some(idx) = self
            .priests
            .iter()
            .position(|p| p.id == npc_id && p.alive && p.state == PriestState::Hostile)
        else {
            return false;
        };
        let p = &mut self.priests[idx];
        p.health = (p.health - amount).max(0.0);
        if p.health <= 0.0 {
            Self::kill_priest(&mut self.priests[idx], world, ctx);
            true
        } else {
            false
        }
    }

    /// Attach a DOT stack to a hostile priest.
    pub fn dot_priest(&mut self, npc_id: NpcId, dps: f32, duration: f32) -> bool {
        if let Some(p) = self
            .priests
            .iter_mut()
            .find(|p| p.id == npc_id && p.alive && p.state == PriestState::Hostile)
        {
            p.dots.push(DotStack {
                dps,
                time_left: duration,
                source: DotSource::Weapon,
            });
            true
        } else {
            false
        }
    }

    /// Advance every live NPC, then broadcast snapshots at the fixed rate.
    pub fn update(
        &mut self,
        dt: f32,
        now: f64,
        world: &mut NpcWorld<'_>,
        ctx: &mut RoomContext<'_>,
    ) {
        for i in 0..self.prisoners.len() {
            if self.prisoners[i].alive {
                Self::update_prisoner(&mut self.prisoners[i], dt, now, world, ctx);
            }
        }
        for i in 0..self.priests.len() {
            if self.priests[i].alive {
                Self::update_priest(&mut self.priests[i], dt, now, world, ctx);
            }
        }
        self.prisoners.retain(|p| p.alive);
        self.priests.retain(|p| p.alive);

        if now >= self.next_broadcast_at {
            ctx.broadcast(ServerMessage::NpcUpdate(NpcUpdateMsg {
                npcs: self.snapshots(),
            }));
            self.next_broadcast_at = now + self.broadcast_interval;
        }
    }

    fn update_prisoner(
        p: &mut Prisoner,
        dt: f32,
        now: f64,
        world: &mut NpcWorld<'_>,
        ctx: &mut RoomContext<'_>,
    ) {
        let config = ctx.config;
        tick_bark(&mut p.bark_line, &mut p.bark_next_at, now, world.rng);
        p.attack_cooldown = (p.attack_cooldown - dt).max(0.0);

        match p.state {
            PrisonerState::Idle => {
                Self::prisoner_auto_attack(p, world, ctx);
            },
            PrisonerState::Follow => {
                Self::prisoner_auto_attack(p, world, ctx);
                let Some(target) = p.follow_target.and_then(|id| world.players.get(&id)) else {
                    p.switch_state(PrisonerState::Idle, config);
                    return;
                };
                let gap = p.radius + PLAYER_RADIUS + config.prisoner_follow_gap;
                if p.pos.distance(target.pos) > gap {
                    let dir = p.pos.direction_to(target.pos);
                    p.pos = p.pos.add(dir.scale(config.prisoner_speed * dt));
                }
                // Hand off to the suicide charge once the boss closes in.
                let target_pos = target.pos;
                let boss_near = world.enemies.values().any(|e| {
                    e.alive
                        && e.kind == EnemyKind::Boss
                        && e.pos.distance(target_pos) <= config.prisoner_boss_trigger_range
                });
                if boss_near {
                    p.switch_state(PrisonerState::RunToBoss, config);
                }
            },
            PrisonerState::Betrayed => {
                p.state_timer -= dt;
                if p.state_timer <= 0.0 {
                    p.switch_state(PrisonerState::Hostile, config);
                }
            },
            PrisonerState::Hostile => {
                p.state_timer -= dt;
                if p.state_timer <= 0.0 {
                    Self::explode_prisoner(p, PrisonerState::Hostile, world, ctx);
                    return;
                }
                let chase = Self::hostile_chase_point(p, world, config);
                if let Some(point) = chase {
                    let breathing_room = p.radius + PLAYER_RADIUS;
                    if p.pos.distance(point) > breathing_room {
                        let speed = config.prisoner_speed * config.prisoner_hostile_speed_bonus;
                        let dir = p.pos.direction_to(point);
                        p.pos = p.pos.add(dir.scale(speed * dt));
                    }
                }
            },
            PrisonerState::RunToBoss => {
                Self::prisoner_auto_attack(p, world, ctx);
                let boss = world
                    .enemies
                    .values()
                    .filter(|e| e.alive && e.kind == EnemyKind::Boss)
                    .min_by(|a, b| {
                        a.pos.distance_sq(p.pos).total_cmp(&b.pos.distance_sq(p.pos))
                    })
                    .map(|e| (e.id, e.pos, e.radius_for_contact()));
                let Some((_, boss_pos, boss_radius)) = boss else {
                    p.switch_state(PrisonerState::Idle, config);
                    return;
                };
                let dir = p.pos.direction_to(boss_pos);
                p.pos = p.pos.add(dir.scale(config.prisoner_speed * dt));
                if p.pos.distance(boss_pos) <= p.radius + boss_radius + CONTACT_EPSILON {
                    Self::explode_prisoner(p, PrisonerState::RunToBoss, world, ctx);
                }
            },
        }
    }

    /// Target point for a hostile prisoner: a lure in range wins over
    /// players; otherwise the designated target, falling back to the
    /// nearest alive, visible, non-dialogue player.
    fn hostile_chase_point(
        p: &Prisoner,
        world: &NpcWorld<'_>,
        config: &SimConfig,
    ) -> Option<Vec2> {
        if let Some(lure) = world
            .lures
            .iter()
            .find(|l| l.distance(p.pos) <= config.prisoner_lure_range)
        {
            return Some(*lure);
        }
        let eligible = |pl: &&PlayerState| pl.is_alive() && !pl.invisible && !pl.in_dialogue;
        if let Some(designated) = p
            .hostile_target
            .and_then(|id| world.players.get(&id))
            .filter(|pl| eligible(pl))
        {
            return Some(designated.pos);
        }
        world
            .players
            .values()
            .filter(|pl| pl.is_alive() && !pl.invisible && !pl.in_dialogue)
            .min_by(|a, b| a.pos.distance_sq(p.pos).total_cmp(&b.pos.distance_sq(p.pos)))
            .map(|pl| pl.pos)
    }

    /// Cooldown-gated swing at the nearest troop in attack range.
    fn prisoner_auto_attack(
        p: &mut Prisoner,
        world: &mut NpcWorld<'_>,
        ctx: &mut RoomContext<'_>,
    ) {
        if p.attack_cooldown > 0.0 {
            return;
        }
        let config = ctx.config;
        let target = world
            .enemies
            .values_mut()
            .filter(|e| {
                e.alive
                    && e.kind == EnemyKind::Troop
                    && e.pos.distance(p.pos) <= config.prisoner_attack_range
            })
            .min_by(|a, b| a.pos.distance_sq(p.pos).total_cmp(&b.pos.distance_sq(p.pos)));
        let Some(enemy) = target else {
            return;
        };
        p.attack_cooldown = config.prisoner_attack_cooldown_secs;
        let outcome = combat::damage_enemy(enemy, config.prisoner_attack_damage);
        if let DamageOutcome::Applied { died } = outcome {
            ctx.broadcast(ServerMessage::EnemyDamaged(EnemyDamagedMsg {
                enemy_id: enemy.id,
                health: enemy.health,
                crit: false,
            }));
            if died {
                let (id, pos) = (enemy.id, enemy.pos);
                Self::enemy_killed(id, pos, world, ctx);
            }
        }
    }

    /// Terminal explosion. Boss takes a max-health fraction hit; troops take
    /// falloff damage, except during a boss charge where they are nearly
    /// always killed outright; players are spared entirely on a boss charge.
    fn explode_prisoner(
        p: &mut Prisoner,
        from_state: PrisonerState,
        world: &mut NpcWorld<'_>,
        ctx: &mut RoomContext<'_>,
    ) {
        let config = ctx.config;
        p.alive = false;
        ctx.broadcast(ServerMessage::NpcExplosion(NpcExplosionMsg {
            npc_id: p.id,
            pos: p.pos,
            radius: config.prisoner_explosion_radius,
        }));

        let boss_charge = from_state == PrisonerState::RunToBoss;
        let mut killed: Vec<(u32, Vec2)> = Vec::new();
        for enemy in world.enemies.values_mut() {
            if !enemy.alive {
                continue;
            }
            let dist = enemy.pos.distance(p.pos);
            if dist > config.prisoner_explosion_radius {
                continue;
            }
            let amount = if enemy.kind == EnemyKind::Boss {
                let fraction = world.rng.gen_range_f64(
                    f64::from(config.prisoner_boss_hit_min_fraction),
                    f64::from(config.prisoner_boss_hit_max_fraction),
                ) as f32;
                enemy.health_max * fraction
            } else if boss_charge
                && world.rng.next_f64() < config.prisoner_troop_instakill_chance
            {
                enemy.health
            } else {
                combat::explosion_damage(
                    dist,
                    config.prisoner_explosion_inner_radius,
                    config.prisoner_explosion_radius,
                    config.prisoner_explosion_damage_max,
                    config.prisoner_explosion_damage_min,
                )
                .unwrap_or(0.0)
            };
            if let DamageOutcome::Applied { died } = combat::damage_enemy(enemy, amount) {
                ctx.broadcast(ServerMessage::EnemyDamaged(EnemyDamagedMsg {
                    enemy_id: enemy.id,
                    health: enemy.health,
                    crit: false,
                }));
                if died {
                    killed.push((enemy.id, enemy.pos));
                }
            }
        }
        for (id, pos) in killed {
            Self::enemy_killed(id, pos, world, ctx);
        }

        if !boss_charge {
            let pos = p.pos;
            let ids: Vec<PlayerId> = world.players.keys().copied().collect();
            for pid in ids {
                let Some(player) = world.players.get_mut(&pid) else {
                    continue;
                };
                let dist = player.pos.distance(pos);
                let Some(raw) = combat::explosion_damage(
                    dist,
                    config.prisoner_explosion_inner_radius,
                    config.prisoner_explosion_radius,
                    config.prisoner_explosion_damage_max,
                    config.prisoner_explosion_damage_min,
                ) else {
                    continue;
                };
                let amount = combat::apply_armor(raw, player.stats.armor);
                crate::hurt_player(player, amount, false, ctx, world.schedule);
            }
        }
    }

    fn enemy_killed(
        enemy_id: u32,
        pos: Vec2,
        world: &mut NpcWorld<'_>,
        ctx: &mut RoomContext<'_>,
    ) {
        let drops = loot::spawn_enemy_loot(
            pos,
            world.rng,
            world.ground_items,
            world.next_entity_id,
        );
        for item in &drops {
            ctx.broadcast(ServerMessage::GroundItemSpawned(GroundItemSpawnedMsg {
                item: item.clone(),
            }));
        }
        ctx.broadcast(ServerMessage::EnemyKilled(EnemyKilledMsg {
            enemy_id,
            loot: drops,
        }));
        world.enemies.remove(&enemy_id);
    }

    fn update_priest(
        p: &mut Priest,
        dt: f32,
        now: f64,
        world: &mut NpcWorld<'_>,
        ctx: &mut RoomContext<'_>,
    ) {
        let config = ctx.config;
        tick_bark(&mut p.bark_line, &mut p.bark_next_at, now, world.rng);

        if p.state == PriestState::Idle {
            return;
        }

        // Give-up rule: a hostile priest dragged too far from its spawn is
        // forcibly reset home.
        let give_up = config.priest_give_up_range;
        if p.pos.distance_sq(p.spawn_pos) > give_up * give_up {
            p.pos = p.spawn_pos;
            p.switch_state(PriestState::Idle, config, world.rng);
            return;
        }

        // DOT from players keeps ticking through announce and movement.
        let dot_damage = combat::tick_dots(&mut p.dots, dt);
        if dot_damage > 0.0 {
            p.health = (p.health - dot_damage).max(0.0);
            if p.health <= 0.0 {
                Self::kill_priest(p, world, ctx);
                return;
            }
        }

        if p.announce_remaining > 0.0 {
            p.announce_remaining -= dt;
            return;
        }

        let target = p
            .target
            .and_then(|id| world.players.get(&id))
            .filter(|pl| pl.is_alive() && !pl.invisible)
            .map(|pl| pl.pos)
            .or_else(|| {
                world
                    .players
                    .values()
                    .filter(|pl| pl.is_alive() && !pl.invisible)
                    .min_by(|a, b| {
                        a.pos.distance_sq(p.pos).total_cmp(&b.pos.distance_sq(p.pos))
                    })
                    .map(|pl| pl.pos)
            });
        let Some(target_pos) = target else {
            return;
        };

        // Movement phase machine.
        match &mut p.move_phase {
            MovePhase::Charge { timer } => {
                *timer -= dt;
                let dir = p.pos.direction_to(target_pos);
                p.pos = p.pos.add(dir.scale(config.priest_charge_speed * dt));
                if p.pos.distance(target_pos) <= config.priest_charge_switch_range || *timer <= 0.0
                {
                    p.move_phase = MovePhase::Evade {
                        timer: world.rng.gen_range_f64(1.0, 2.5) as f32,
                        strafe_dir: if world.rng.next_f64() < 0.5 { 1.0 } else { -1.0 },
                    };
                }
            },
            MovePhase::Evade { timer, strafe_dir } => {
                *timer -= dt;
                let to_target = p.pos.direction_to(target_pos);
                let mut step = to_target.perp().scale(*strafe_dir);
                // Bias outward when crowding the target.
                if p.pos.distance(target_pos) < config.priest_evade_close_range {
                    step = step.add(to_target.scale(-0.6));
                }
                p.pos = p.pos.add(step.scale(config.priest_evade_speed * dt));
                if *timer <= 0.0 {
                    p.move_phase = MovePhase::Charge {
                        timer: world.rng.gen_range_f64(1.5, 3.5) as f32,
                    };
                }
            },
        }

        // Attack phase machine, independent of movement. The cone shot fires
        // after the match so the phase borrow is released first.
        let mut fire = false;
        match &mut p.attack_phase {
            AttackPhase::Burst {
                remaining,
                next_shot,
            } => {
                *remaining -= dt;
                *next_shot -= dt;
                if *next_shot <= 0.0 {
                    *next_shot = world.rng.gen_range_f64(
                        f64::from(config.priest_burst_shot_interval_min_secs),
                        f64::from(config.priest_burst_shot_interval_max_secs),
                    ) as f32;
                    fire = true;
                }
                if *remaining <= 0.0 {
                    p.attack_phase = AttackPhase::Rest {
                        remaining: world.rng.gen_range_f64(
                            f64::from(config.priest_rest_secs_min),
                            f64::from(config.priest_rest_secs_max),
                        ) as f32,
                    };
                }
            },
            AttackPhase::Rest { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    p.attack_phase = AttackPhase::Burst {
                        remaining: world.rng.gen_range_f64(
                            f64::from(config.priest_burst_secs_min),
                            f64::from(config.priest_burst_secs_max),
                        ) as f32,
                        next_shot: 0.0,
                    };
                }
            },
        }
        if fire {
            Self::priest_cone_attack(p, target_pos, world, config);
        }
    }

    /// One cone shot: aim at the target with bounded inaccuracy, then stack
    /// a DOT on every player caught in the cone. AOE damage-over-time, not
    /// an instant hit.
    fn priest_cone_attack(
        p: &Priest,
        target_pos: Vec2,
        world: &mut NpcWorld<'_>,
        config: &SimConfig,
    ) {
        let inaccuracy = config.priest_cone_inaccuracy_deg.to_radians();
        let jitter = world.rng.gen_range_f64(f64::from(-inaccuracy), f64::from(inaccuracy)) as f32;
        let aim = p.pos.angle_to(target_pos) + jitter;
        let half_angle = config.priest_cone_half_angle_deg.to_radians();
        for player in world.players.values_mut() {
            if !player.is_alive() || player.invincible {
                continue;
            }
            if within_cone(p.pos, aim, half_angle, config.priest_cone_range, player.pos) {
                player.dots.push(DotStack {
                    dps: config.priest_cone_dot_dps,
                    time_left: config.priest_cone_dot_secs,
                    source: DotSource::PriestCone,
                });
            }
        }
    }

    fn kill_priest(p: &mut Priest, world: &mut NpcWorld<'_>, ctx: &mut RoomContext<'_>) {
        p.alive = false;
        let drops = loot::priest_loot(world.world_seed, p.id, ctx.config.priest_loot_count);
        let mut spawned: Vec<GroundItem> = Vec::with_capacity(drops.len());
        for d in drops {
            let id = *world.next_entity_id;
            *world.next_entity_id += 1;
            let item = GroundItem {
                id,
                pos: p.pos.add(d.offset),
                velocity: d.offset.scale(2.0),
                payload: d.payload,
            };
            world.ground_items.insert(id, item.clone());
            spawned.push(item);
        }
        let accomplishment = "heretic_priest_slain";
        let first_kill = !world.accomplishments.iter().any(|a| a == accomplishment);
        if first_kill {
            world.accomplishments.push(accomplishment.to_string());
        }
        ctx.broadcast(ServerMessage::NpcDied(NpcDiedMsg {
            npc_id: p.id,
            loot: spawned,
            mission_accomplished: first_kill.then(|| accomplishment.to_string()),
        }));
    }
}

/// Cycle the bark line on a randomized cadence. State switches reset the
/// line index so flavor text always matches the state.
fn tick_bark(line: &mut u8, next_at: &mut f64, now: f64, rng: &mut SeededRng) {
    if now >= *next_at {
        if *next_at > 0.0 {
            *line = line.wrapping_add(1);
        }
        *next_at = now + rng.gen_range_f64(BARK_INTERVAL_MIN, BARK_INTERVAL_MAX);
    }
}

impl Enemy {
    /// Contact radius for NPC collision. Bosses are physically larger.
    pub fn radius_for_contact(&self) -> f32 {
        match self.kind {
            EnemyKind::Boss => 48.0,
            EnemyKind::Troop => 16.0,
        }
    }
}
