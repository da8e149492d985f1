//! Uniform damage resolution shared by every damage source: direct hits,
//! explosions, hitscan, and DOT ticks, applied identically to players,
//! NPCs, and enemies.

use trench_core::player::PlayerStats;
use trench_core::rng::SeededRng;

use crate::world::{DotStack, Enemy, PlayerState};

/// Effective armor reduction never exceeds 75%.
pub const ARMOR_REDUCTION_CAP: f32 = 0.75;

/// Outcome of rolling a hit through the damage pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolledHit {
    pub damage: f32,
    pub crit: bool,
}

/// Roll raw damage for a hit: add the attacker's attack power, then roll a
/// crit with chance `min(1, weapon_crit + attacker_crit_chance)`.
pub fn roll_hit(
    rng: &mut SeededRng,
    base: f32,
    attacker: Option<&PlayerStats>,
    weapon_crit: f32,
) -> RolledHit {
    let (attack_power, crit_chance, crit_mult) = match attacker {
        Some(s) => (s.attack_power, s.crit_chance, s.crit_multiplier),
        None => (0.0, 0.0, 1.0),
    };
    let mut damage = base + attack_power;
    let chance = (weapon_crit + crit_chance).min(1.0);
    let crit = chance > 0.0 && rng.next_f64() < f64::from(chance);
    if crit {
        damage *= crit_mult;
    }
    RolledHit { damage, crit }
}

/// Apply the defender's armor. Reduction is `armor / 100`, capped at 75%.
pub fn apply_armor(damage: f32, armor: f32) -> f32 {
    let reduction = (armor / 100.0).min(ARMOR_REDUCTION_CAP).max(0.0);
    damage * (1.0 - reduction)
}

/// Linear explosion falloff: full damage inside `inner`, interpolated down
/// to `damage_min` at `outer`. Returns `None` outside the blast radius.
pub fn explosion_damage(
    distance: f32,
    inner: f32,
    outer: f32,
    damage_max: f32,
    damage_min: f32,
) -> Option<f32> {
    if distance > outer {
        return None;
    }
    if outer <= inner {
        return Some(damage_max);
    }
    let t = ((distance - inner) / (outer - inner)).clamp(0.0, 1.0);
    Some(damage_max - (damage_max - damage_min) * t)
}

/// PvP damage only crosses alignment lines; same-alignment hits are no-ops.
pub fn pvp_allowed(attacker_evil: bool, defender_evil: bool) -> bool {
    attacker_evil != defender_evil
}

/// Advance all DOT stacks by `dt`: purge expired stacks, then deal the sum
/// of the remaining DPS values for this slice of time.
pub fn tick_dots(dots: &mut Vec<DotStack>, dt: f32) -> f32 {
    dots.retain(|d| d.time_left > 0.0);
    let total_dps: f32 = dots.iter().map(|d| d.dps).sum();
    for d in dots.iter_mut() {
        d.time_left -= dt;
    }
    total_dps * dt
}

/// What applying damage did to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target was dead or invincible; nothing happened, no events.
    Blocked,
    Applied {
        died: bool,
    },
}

/// Subtract health from a player, honoring the invincible/dead pre-checks
/// and flooring at zero. Death fires at most once per life: the transition
/// is only reported when health was previously above zero.
pub fn damage_player(player: &mut PlayerState, amount: f32) -> DamageOutcome {
    if player.invincible || !player.is_alive() {
        return DamageOutcome::Blocked;
    }
    let before = player.health;
    player.health = (player.health - amount).max(0.0);
    DamageOutcome::Applied {
        died: before > 0.0 && player.health <= 0.0,
    }
}

/// Subtract health from an enemy, flooring at zero.
pub fn damage_enemy(enemy: &mut Enemy, amount: f32) -> DamageOutcome {
    if !enemy.alive {
        return DamageOutcome::Blocked;
    }
    let before = enemy.health;
    enemy.health = (enemy.health - amount).max(0.0);
    let died = before > 0.0 && enemy.health <= 0.0;
    if died {
        enemy.alive = false;
    }
    DamageOutcome::Applied { died }
}
