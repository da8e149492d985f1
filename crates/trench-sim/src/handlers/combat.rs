//! Combat intents: relayed projectiles, validated hitscans, explosions,
//! and damage claims against enemies, NPCs, fixtures, and other players.
//!
//! The server re-validates every client damage claim against its own state.
//! Claims that fail validation are silently dropped; the claimant's own
//! client is free to show a miss.

use tracing::debug;

use trench_core::math::{Vec2, within_cone};
use trench_core::npc::PriestState;
use trench_core::net::messages::{
    ArtifactDamageMsg, ArtifactStateMsg, BarrelDamageMsg, BulletFiredMsg, BulletFiredRelayMsg,
    ChestDamageMsg, ChestUpdateMsg, DamageNumberMsg, DamageTargetKind, DotTickMsg, EnemyDamagedMsg,
    EnemyDiedMsg, EnemyKilledMsg, GroundItemSpawnedMsg, HitscanHitMsg, HitscanMsg, NpcDamageMsg,
    NpcDotMsg, NpcSetStateMsg, NpcUpdateMsg, ProjectileHitMsg, PvpDirectDamageMsg, ServerMessage,
    VfxRelayMsg,
};
use trench_core::player::PlayerId;

use crate::combat::{self, DamageOutcome};
use crate::context::RoomContext;
use crate::loot;
use crate::world::Bullet;
use crate::{GameRoom, hurt_player, npc_world};

/// Hard caps on client-supplied combat numbers.
const MAX_BULLET_LIFE: f32 = 6.0;
const MAX_CLAIMED_DAMAGE: f32 = 500.0;
const MAX_EXPLOSION_RADIUS: f32 = 420.0;
const MAX_DOT_DPS: f32 = 100.0;
const MAX_DOT_TICK_DT: f32 = 0.25;
const MAX_DOT_DURATION: f32 = 12.0;

const HITSCAN_RANGE: f32 = 900.0;
/// Angular slack when re-validating a claimed hitscan hit.
const HITSCAN_TOLERANCE_RAD: f32 = 0.22;
const WEAPON7_DAMAGE: f32 = 35.0;
const WEAPON8_DAMAGE: f32 = 60.0;
const WEAPON_HITSCAN_CRIT: f32 = 0.05;

const BARREL_EXPLOSION_RADIUS: f32 = 160.0;
const BARREL_EXPLOSION_INNER: f32 = 40.0;
const BARREL_DAMAGE_MAX: f32 = 120.0;
const BARREL_DAMAGE_MIN: f32 = 60.0;
/// VFX kind clients render for a barrel detonation.
const BARREL_EXPLOSION_VFX: u8 = 3;

const ENEMY_KNOCKBACK_SECS: f32 = 0.25;

impl GameRoom {
    /// Relay a fired bullet to everyone else and track it server-side for
    /// PvP and barrel collision. Enemy damage from bullets arrives as
    /// separate hit claims.
    pub(crate) fn handle_bullet_fired(
        &mut self,
        pid: PlayerId,
        m: BulletFiredMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if !self.players.get(&pid).is_some_and(|p| p.is_alive()) {
            return;
        }
        let m = BulletFiredMsg {
            life: m.life.clamp(0.0, MAX_BULLET_LIFE),
            damage: m.damage.clamp(0.0, MAX_CLAIMED_DAMAGE),
            ..m
        };
        ctx.send_except(
            pid,
            ServerMessage::BulletFiredRelay(BulletFiredRelayMsg {
                shooter: pid,
                bullet: m.clone(),
            }),
        );
        self.bullets.push(Bullet {
            id: m.bullet_id,
            owner: pid,
            pos: m.pos,
            velocity: m.velocity,
            damage: m.damage,
            radius: m.radius,
            life: m.life,
            is_cone: m.is_cone,
            ignore_enemies: m.ignore_enemies,
            no_damage: m.no_damage,
        });
    }

    /// Validated hitscan shot. Each claimed enemy hit must actually lie
    /// along the shot ray within range; claimed player hits additionally
    /// pass the PvP gate.
    pub(crate) fn handle_hitscan(
        &mut self,
        pid: PlayerId,
        weapon: u8,
        m: HitscanMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(shooter) = self.players.get(&pid).filter(|p| p.is_alive()) else {
            return;
        };
        let stats = shooter.stats;
        let shooter_evil = shooter.is_evil;
        let origin = m.origin;
        if origin.distance(shooter.pos) > 64.0 {
            debug!(player = pid, "hitscan origin far from shooter, dropping");
            return;
        }
        let base = if weapon == 7 { WEAPON7_DAMAGE } else { WEAPON8_DAMAGE };

        let mut confirmed_enemies = Vec::new();
        for enemy_id in &m.enemy_hits {
            let Some(enemy) = self.enemies.get_mut(enemy_id) else {
                continue;
            };
            if !enemy.alive || !on_ray(origin, m.angle, enemy.pos) {
                continue;
            }
            let hit = combat::roll_hit(&mut self.rng, base, Some(&stats), WEAPON_HITSCAN_CRIT);
            if let DamageOutcome::Applied { died } = combat::damage_enemy(enemy, hit.damage) {
                confirmed_enemies.push(*enemy_id);
                ctx.broadcast(ServerMessage::EnemyDamaged(EnemyDamagedMsg {
                    enemy_id: *enemy_id,
                    health: enemy.health,
                    crit: hit.crit,
                }));
                ctx.broadcast(ServerMessage::DamageNumber(DamageNumberMsg {
                    pos: enemy.pos,
                    amount: hit.damage,
                    crit: hit.crit,
                    target: DamageTargetKind::Enemy,
                }));
                if died {
                    self.kill_enemy(*enemy_id, ctx);
                }
            }
        }

        let mut confirmed_players = Vec::new();
        for target_id in &m.player_hits {
            if *target_id == pid {
                continue;
            }
            let Some(target) = self.players.get_mut(target_id) else {
                continue;
            };
            if !target.is_alive()
                || target.invisible
                || !combat::pvp_allowed(shooter_evil, target.is_evil)
                || !on_ray(origin, m.angle, target.pos)
            {
                continue;
            }
            let hit = combat::roll_hit(&mut self.rng, base, Some(&stats), WEAPON_HITSCAN_CRIT);
            let amount = combat::apply_armor(hit.damage, target.stats.armor);
            if let DamageOutcome::Applied { .. } =
                hurt_player(target, amount, hit.crit, ctx, &mut self.schedule)
            {
                confirmed_players.push(*target_id);
            }
        }

        ctx.send_except(
            pid,
            ServerMessage::HitscanHit(HitscanHitMsg {
                weapon,
                shooter: pid,
                enemy_hits: confirmed_enemies,
                player_hits: confirmed_players,
            }),
        );
    }

    /// Area damage claim from a client-simulated explosion.
    pub(crate) fn handle_explosion_damage(
        &mut self,
        pid: PlayerId,
        m: trench_core::net::messages::ExplosionDamageMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(shooter) = self.players.get(&pid).filter(|p| p.is_alive()) else {
            return;
        };
        let shooter_evil = shooter.is_evil;
        let radius = m.radius.clamp(0.0, MAX_EXPLOSION_RADIUS);
        let inner = m.inner_radius.clamp(0.0, radius);
        let max_damage = m.max_damage.clamp(0.0, MAX_CLAIMED_DAMAGE);
        let min_damage = m.min_damage.clamp(0.0, max_damage);

        let mut killed = Vec::new();
        for enemy in self.enemies.values_mut() {
            if !enemy.alive {
                continue;
            }
            let dist = enemy.pos.distance(m.pos);
            let Some(amount) = combat::explosion_damage(dist, inner, radius, max_damage, min_damage)
            else {
                continue;
            };
            if let DamageOutcome::Applied { died } = combat::damage_enemy(enemy, amount) {
                ctx.broadcast(ServerMessage::EnemyDamaged(EnemyDamagedMsg {
                    enemy_id: enemy.id,
                    health: enemy.health,
                    crit: false,
                }));
                if died {
                    killed.push(enemy.id);
                }
            }
        }
        for id in killed {
            self.kill_enemy(id, ctx);
        }

        let target_ids: Vec<PlayerId> = self.players.keys().copied().collect();
        for target_id in target_ids {
            if target_id == pid {
                continue;
            }
            let Some(target) = self.players.get_mut(&target_id) else {
                continue;
            };
            if !target.is_alive() || !combat::pvp_allowed(shooter_evil, target.is_evil) {
                continue;
            }
            let dist = target.pos.distance(m.pos);
            let Some(raw) = combat::explosion_damage(dist, inner, radius, max_damage, min_damage)
            else {
                continue;
            };
            let amount = combat::apply_armor(raw, target.stats.armor);
            hurt_player(target, amount, false, ctx, &mut self.schedule);
        }

        let barrel_ids: Vec<u32> = self
            .barrels
            .values()
            .filter(|b| b.alive && b.pos.distance(m.pos) <= radius)
            .map(|b| b.id)
            .collect();
        for id in barrel_ids {
            self.damage_barrel_internal(id, max_damage, ctx);
        }
    }

    /// A client-simulated projectile connecting with an enemy.
    pub(crate) fn handle_projectile_hit(
        &mut self,
        pid: PlayerId,
        m: ProjectileHitMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(shooter) = self.players.get(&pid).filter(|p| p.is_alive()) else {
            return;
        };
        let stats = shooter.stats;
        let base = m.base_damage.clamp(0.0, MAX_CLAIMED_DAMAGE);
        let Some(enemy) = self.enemies.get_mut(&m.enemy_id).filter(|e| e.alive) else {
            return;
        };
        let hit = combat::roll_hit(&mut self.rng, base, Some(&stats), m.weapon_crit);
        let DamageOutcome::Applied { died } = combat::damage_enemy(enemy, hit.damage) else {
            return;
        };
        if let Some(kb) = m.knockback {
            enemy.knockback_velocity = kb;
            enemy.knockback_remaining = ENEMY_KNOCKBACK_SECS;
        }
        ctx.broadcast(ServerMessage::EnemyDamaged(EnemyDamagedMsg {
            enemy_id: m.enemy_id,
            health: enemy.health,
            crit: hit.crit,
        }));
        ctx.broadcast(ServerMessage::DamageNumber(DamageNumberMsg {
            pos: enemy.pos,
            amount: hit.damage,
            crit: hit.crit,
            target: DamageTargetKind::Enemy,
        }));
        if died {
            self.kill_enemy(m.enemy_id, ctx);
        }
    }

    /// One tick of a client-simulated weapon DOT on an enemy.
    pub(crate) fn handle_dot_tick(
        &mut self,
        pid: PlayerId,
        m: DotTickMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if !self.players.contains_key(&pid) {
            return;
        }
        let amount = m.dps.clamp(0.0, MAX_DOT_DPS) * m.dt.clamp(0.0, MAX_DOT_TICK_DT);
        let Some(enemy) = self.enemies.get_mut(&m.enemy_id).filter(|e| e.alive) else {
            return;
        };
        let DamageOutcome::Applied { died } = combat::damage_enemy(enemy, amount) else {
            return;
        };
        ctx.broadcast(ServerMessage::EnemyDamaged(EnemyDamagedMsg {
            enemy_id: m.enemy_id,
            health: enemy.health,
            crit: false,
        }));
        if died {
            self.kill_enemy(m.enemy_id, ctx);
        }
    }

    /// Client claim that an enemy died. Honored only when the server's own
    /// ledger agrees the enemy is out of health.
    pub(crate) fn handle_enemy_died(
        &mut self,
        pid: PlayerId,
        m: EnemyDiedMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(enemy) = self.enemies.get(&m.enemy_id) else {
            return;
        };
        if enemy.health > 0.0 {
            debug!(player = pid, enemy = m.enemy_id, "death claim for live enemy, dropping");
            return;
        }
        self.kill_enemy(m.enemy_id, ctx);
    }

    /// Shared enemy death path: loot roll, broadcasts, removal.
    pub(crate) fn kill_enemy(&mut self, enemy_id: u32, ctx: &mut RoomContext<'_>) {
        let Some(enemy) = self.enemies.get(&enemy_id) else {
            return;
        };
        let pos = enemy.pos;
        let drops = loot::spawn_enemy_loot(
            pos,
            &mut self.rng,
            &mut self.ground_items,
            &mut self.next_entity_id,
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
        self.enemies.remove(&enemy_id);
    }

    pub(crate) fn handle_chest_damage(
        &mut self,
        pid: PlayerId,
        m: ChestDamageMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if !self.players.get(&pid).is_some_and(|p| p.is_alive()) {
            return;
        }
        let Some(chest) = self.chests.get_mut(&m.chest_id) else {
            return;
        };
        if chest.opened {
            return;
        }
        chest.health = (chest.health - m.damage.clamp(0.0, MAX_CLAIMED_DAMAGE)).max(0.0);
        chest.opening = chest.health < chest.health_max;
        ctx.broadcast(ServerMessage::ChestUpdate(ChestUpdateMsg {
            chest_id: m.chest_id.clone(),
            health: chest.health,
            opening: chest.opening,
        }));
        if chest.health <= 0.0 {
            self.open_chest(&m.chest_id, ctx);
        }
    }

    pub(crate) fn handle_barrel_damage(
        &mut self,
        pid: PlayerId,
        m: BarrelDamageMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if !self.players.get(&pid).is_some_and(|p| p.is_alive()) {
            return;
        }
        self.damage_barrel_internal(m.barrel_id, m.damage.clamp(0.0, MAX_CLAIMED_DAMAGE), ctx);
    }

    /// Barrel damage with the detonation on depletion. Barrel blasts are
    /// environmental: they hit every player regardless of PvP state.
    pub(crate) fn damage_barrel_internal(
        &mut self,
        barrel_id: u32,
        damage: f32,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(barrel) = self.barrels.get_mut(&barrel_id) else {
            return;
        };
        if !barrel.alive {
            return;
        }
        barrel.health -= damage;
        if barrel.health > 0.0 {
            return;
        }
        barrel.alive = false;
        let pos = barrel.pos;
        ctx.broadcast(ServerMessage::VfxRelay(VfxRelayMsg {
            by: 0,
            kind: BARREL_EXPLOSION_VFX,
            pos,
            angle: 0.0,
        }));

        let mut killed = Vec::new();
        for enemy in self.enemies.values_mut() {
            if !enemy.alive {
                continue;
            }
            let Some(amount) = combat::explosion_damage(
                enemy.pos.distance(pos),
                BARREL_EXPLOSION_INNER,
                BARREL_EXPLOSION_RADIUS,
                BARREL_DAMAGE_MAX,
                BARREL_DAMAGE_MIN,
            ) else {
                continue;
            };
            if let DamageOutcome::Applied { died } = combat::damage_enemy(enemy, amount) {
                ctx.broadcast(ServerMessage::EnemyDamaged(EnemyDamagedMsg {
                    enemy_id: enemy.id,
                    health: enemy.health,
                    crit: false,
                }));
                if died {
                    killed.push(enemy.id);
                }
            }
        }
        for id in killed {
            self.kill_enemy(id, ctx);
        }

        let ids: Vec<PlayerId> = self.players.keys().copied().collect();
        for target_id in ids {
            let Some(target) = self.players.get_mut(&target_id) else {
                continue;
            };
            if !target.is_alive() {
                continue;
            }
            let Some(raw) = combat::explosion_damage(
                target.pos.distance(pos),
                BARREL_EXPLOSION_INNER,
                BARREL_EXPLOSION_RADIUS,
                BARREL_DAMAGE_MAX,
                BARREL_DAMAGE_MIN,
            ) else {
                continue;
            };
            let amount = combat::apply_armor(raw, target.stats.armor);
            hurt_player(target, amount, false, ctx, &mut self.schedule);
        }
    }

    pub(crate) fn handle_artifact_damage(
        &mut self,
        pid: PlayerId,
        m: ArtifactDamageMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if !self.players.contains_key(&pid) {
            return;
        }
        let Some(artifact) = self.artifact.as_mut() else {
            return;
        };
        // A carried artifact is shielded by its carrier.
        if artifact.carried_by.is_some() {
            return;
        }
        artifact.integrity =
            (artifact.integrity - m.damage.clamp(0.0, MAX_CLAIMED_DAMAGE)).max(0.0);
        ctx.broadcast(ServerMessage::ArtifactState(ArtifactStateMsg {
            carried_by: artifact.carried_by,
            pos: artifact.pos,
            integrity: artifact.integrity,
        }));
    }

    /// Direct PvP damage claim (melee, contact weapons).
    pub(crate) fn handle_pvp_direct_damage(
        &mut self,
        pid: PlayerId,
        m: PvpDirectDamageMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if m.target == pid {
            return;
        }
        let Some(attacker) = self.players.get(&pid).filter(|p| p.is_alive()) else {
            return;
        };
        let stats = attacker.stats;
        let attacker_evil = attacker.is_evil;
        let Some(target) = self.players.get_mut(&m.target) else {
            return;
        };
        if !target.is_alive() || !combat::pvp_allowed(attacker_evil, target.is_evil) {
            return;
        }
        let base = m.base_damage.clamp(0.0, MAX_CLAIMED_DAMAGE);
        let hit = combat::roll_hit(&mut self.rng, base, Some(&stats), m.weapon_crit);
        let amount = combat::apply_armor(hit.damage, target.stats.armor);
        hurt_player(target, amount, hit.crit, ctx, &mut self.schedule);
    }

    pub(crate) fn handle_npc_damage(
        &mut self,
        pid: PlayerId,
        m: NpcDamageMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        let Some(attacker) = self.players.get(&pid).filter(|p| p.is_alive()) else {
            return;
        };
        let stats = attacker.stats;
        let base = m.base_damage.clamp(0.0, MAX_CLAIMED_DAMAGE);
        // Priests only take hits while hostile; anything else is a whiff.
        let Some(pos) = self
            .npcs
            .priests
            .iter()
            .find(|p| p.id == m.npc_id && p.alive && p.state == PriestState::Hostile)
            .map(|p| p.pos)
        else {
            return;
        };
        let hit = combat::roll_hit(&mut self.rng, base, Some(&stats), m.weapon_crit);
        let lures: Vec<Vec2> = self.lures.iter().map(|l| l.pos).collect();
        let mut world = npc_world!(self, &lures);
        self.npcs.damage_priest(m.npc_id, hit.damage, &mut world, ctx);
        ctx.broadcast(ServerMessage::DamageNumber(DamageNumberMsg {
            pos,
            amount: hit.damage,
            crit: hit.crit,
            target: DamageTargetKind::Npc,
        }));
    }

    pub(crate) fn handle_npc_dot(
        &mut self,
        pid: PlayerId,
        m: NpcDotMsg,
        _ctx: &mut RoomContext<'_>,
    ) {
        if !self.players.contains_key(&pid) {
            return;
        }
        self.npcs.dot_priest(
            m.npc_id,
            m.dps.clamp(0.0, MAX_DOT_DPS),
            m.duration.clamp(0.0, MAX_DOT_DURATION),
        );
    }

    /// Dialogue-driven NPC transition. On success the new state is synced
    /// immediately rather than waiting for the next rate-gated broadcast.
    pub(crate) fn handle_npc_set_state(
        &mut self,
        pid: PlayerId,
        m: NpcSetStateMsg,
        ctx: &mut RoomContext<'_>,
    ) {
        if !self.players.get(&pid).is_some_and(|p| p.is_alive()) {
            return;
        }
        if self
            .npcs
            .request_state(m.npc_id, m.state, pid, ctx.config, &mut self.rng)
        {
            ctx.broadcast(ServerMessage::NpcUpdate(NpcUpdateMsg {
                npcs: self.npcs.snapshots(),
            }));
        }
    }
}

/// A claimed hit point counts as on the shot ray when it is in range and
/// within angular tolerance of the reported aim.
fn on_ray(origin: Vec2, angle: f32, point: Vec2) -> bool {
    within_cone(origin, angle, HITSCAN_TOLERANCE_RAD, HITSCAN_RANGE, point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use trench_core::net::messages::EnemyKind;
    use crate::world::{Barrel, Enemy, PlayerState};

    fn room() -> (GameRoom, SimConfig) {
        let config = SimConfig::default();
        let mut room = GameRoom::new("r".to_string(), 42, &config);
        room.players
            .insert(1, PlayerState::new(1, "a".into(), Vec2::ZERO, 100.0));
        room.players.insert(
            2,
            PlayerState::new(2, "b".into(), Vec2::new(200.0, 0.0), 100.0),
        );
        (room, config)
    }

    #[test]
    fn hitscan_rejects_off_ray_enemy() {
        let (mut room, config) = room();
        room.enemies
            .insert(10, Enemy::new(10, EnemyKind::Troop, Vec2::new(0.0, 300.0), 60.0));
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        // Aiming along +x while the enemy sits on +y.
        room.handle_hitscan(
            1,
            7,
            HitscanMsg {
                origin: Vec2::ZERO,
                angle: 0.0,
                enemy_hits: vec![10],
                player_hits: vec![],
            },
            &mut ctx,
        );
        assert_eq!(room.enemies[&10].health, 60.0);
    }

    #[test]
    fn hitscan_confirms_on_ray_enemy() {
        let (mut room, config) = room();
        room.enemies
            .insert(10, Enemy::new(10, EnemyKind::Troop, Vec2::new(300.0, 0.0), 600.0));
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_hitscan(
            1,
            7,
            HitscanMsg {
                origin: Vec2::ZERO,
                angle: 0.0,
                enemy_hits: vec![10],
                player_hits: vec![],
            },
            &mut ctx,
        );
        assert!(room.enemies[&10].health < 600.0);
        assert!(ctx
            .outbox()
            .iter()
            .any(|o| matches!(&o.msg, ServerMessage::HitscanHit(m) if m.enemy_hits == vec![10])));
    }

    #[test]
    fn npc_damage_claim_hits_hostile_priest() {
        let (mut room, config) = room();
        room.npcs.spawn_priest(5, Vec2::new(100.0, 0.0), &config);
        room.npcs.request_state(
            5,
            trench_core::npc::NpcState::Priest(PriestState::Hostile),
            1,
            &config,
            &mut room.rng,
        );
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_npc_damage(
            1,
            NpcDamageMsg {
                npc_id: 5,
                base_damage: 50.0,
                weapon_crit: 0.0,
            },
            &mut ctx,
        );
        assert!(room.npcs.priests[0].health < config.priest_health);
        assert!(ctx.outbox().iter().any(|o| matches!(
            &o.msg,
            ServerMessage::DamageNumber(m) if m.target == DamageTargetKind::Npc
        )));
    }

    #[test]
    fn pvp_needs_exactly_one_side_evil() {
        let (mut room, config) = room();
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        let claim = PvpDirectDamageMsg {
            target: 2,
            base_damage: 30.0,
            weapon_crit: 0.0,
        };
        room.handle_pvp_direct_damage(1, claim.clone(), &mut ctx);
        assert_eq!(room.players[&2].health, 100.0);

        room.players.get_mut(&1).unwrap().is_evil = true;
        room.handle_pvp_direct_damage(1, claim, &mut ctx);
        assert!(room.players[&2].health < 100.0);
    }

    #[test]
    fn enemy_death_claim_needs_zero_health() {
        let (mut room, config) = room();
        room.enemies
            .insert(10, Enemy::new(10, EnemyKind::Troop, Vec2::new(50.0, 0.0), 60.0));
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_enemy_died(1, EnemyDiedMsg { enemy_id: 10 }, &mut ctx);
        assert!(room.enemies.contains_key(&10));

        room.enemies.get_mut(&10).unwrap().health = 0.0;
        room.handle_enemy_died(1, EnemyDiedMsg { enemy_id: 10 }, &mut ctx);
        assert!(!room.enemies.contains_key(&10));
        assert!(ctx
            .outbox()
            .iter()
            .any(|o| matches!(&o.msg, ServerMessage::EnemyKilled(m) if m.enemy_id == 10)));
    }

    #[test]
    fn barrel_detonation_hurts_nearby_player() {
        let (mut room, config) = room();
        room.barrels.insert(30, Barrel {
            id: 30,
            pos: Vec2::new(20.0, 0.0),
            health: 10.0,
            alive: true,
        });
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_barrel_damage(
            1,
            BarrelDamageMsg {
                barrel_id: 30,
                damage: 50.0,
            },
            &mut ctx,
        );
        assert!(!room.barrels[&30].alive);
        // Player 1 sits inside the inner radius.
        assert!(room.players[&1].health < 100.0);
        // Player 2 is outside the outer radius.
        assert_eq!(room.players[&2].health, 100.0);
    }

    #[test]
    fn carried_artifact_ignores_damage() {
        let (mut room, config) = room();
        room.artifact = Some(crate::world::Artifact {
            carried_by: Some(2),
            pos: Vec2::ZERO,
            integrity: 100.0,
        });
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_artifact_damage(1, ArtifactDamageMsg { damage: 40.0 }, &mut ctx);
        assert_eq!(room.artifact.as_ref().unwrap().integrity, 100.0);

        room.artifact.as_mut().unwrap().carried_by = None;
        room.handle_artifact_damage(1, ArtifactDamageMsg { damage: 40.0 }, &mut ctx);
        assert_eq!(room.artifact.as_ref().unwrap().integrity, 60.0);
    }

    #[test]
    fn explosion_claim_is_radius_capped() {
        let (mut room, config) = room();
        room.enemies.insert(
            10,
            Enemy::new(10, EnemyKind::Troop, Vec2::new(2000.0, 0.0), 60.0),
        );
        let mut ctx = RoomContext::new(0.0, 0.033, &config);
        room.handle_explosion_damage(
            1,
            trench_core::net::messages::ExplosionDamageMsg {
                pos: Vec2::ZERO,
                inner_radius: 100.0,
                radius: 5000.0,
                max_damage: 9999.0,
                min_damage: 9999.0,
            },
            &mut ctx,
        );
        // Far enemy untouched despite the inflated claim.
        assert_eq!(room.enemies[&10].health, 60.0);
    }
}
