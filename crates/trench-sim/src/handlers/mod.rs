//! Client intent handlers, grouped by concern. Every handler is an
//! `impl GameRoom` method taking the sender id, the decoded payload, and the
//! tick context. Invalid intents are dropped or answered with a failure
//! result; they never panic the room.

mod combat;
mod debug;
mod item;
mod mode;
mod player;
mod shop;

use trench_core::item::StatBonus;
use trench_core::player::PlayerStats;

use crate::world::PlayerState;

/// Max distance for opening chests and talking to fixtures.
pub(crate) const INTERACT_RANGE: f32 = 60.0;
/// Max distance for picking things up off the ground.
pub(crate) const PICKUP_RANGE: f32 = 48.0;

/// Re-derive a player's stats from base values plus every carried item.
/// Called whenever the inventory changes. Health is clamped into the new
/// maximum, never refilled.
pub(crate) fn recompute_stats(p: &mut PlayerState, base_health_max: f32) {
    let mut stats = PlayerStats::default();
    let mut health_max = base_health_max;
    for item in &p.inventory {
        match item.bonus {
            StatBonus::AttackPower(v) => stats.attack_power += v,
            StatBonus::Armor(v) => stats.armor += v,
            StatBonus::CritChance(v) => stats.crit_chance += v,
            StatBonus::CritMultiplier(v) => stats.crit_multiplier += v,
            StatBonus::Speed(v) => stats.speed += v,
            StatBonus::HealthMax(v) => health_max += v,
        }
    }
    p.stats = stats;
    p.health_max = health_max;
    p.health = p.health.min(p.health_max);
}

#[cfg(test)]
mod tests {
    use super::*;
    use trench_core::item::{Item, Rarity};
    use trench_core::math::Vec2;

    #[test]
    fn stats_fold_inventory_bonuses() {
        let mut p = PlayerState::new(1, "a".into(), Vec2::ZERO, 100.0);
        p.inventory.push(Item {
            name: "Iron Rosary".into(),
            rarity: Rarity::Uncommon,
            bonus: StatBonus::Armor(6.0),
        });
        p.inventory.push(Item {
            name: "Grail Shard".into(),
            rarity: Rarity::Relic,
            bonus: StatBonus::HealthMax(48.0),
        });
        recompute_stats(&mut p, 100.0);
        assert_eq!(p.stats.armor, 6.0);
        assert_eq!(p.health_max, 148.0);
        // Health never refills from a recompute.
        assert_eq!(p.health, 100.0);
    }

    #[test]
    fn dropping_health_gear_clamps_health() {
        let mut p = PlayerState::new(1, "a".into(), Vec2::ZERO, 100.0);
        p.inventory.push(Item {
            name: "Grail Shard".into(),
            rarity: Rarity::Relic,
            bonus: StatBonus::HealthMax(48.0),
        });
        recompute_stats(&mut p, 100.0);
        p.health = 140.0;
        p.inventory.clear();
        recompute_stats(&mut p, 100.0);
        assert_eq!(p.health_max, 100.0);
        assert_eq!(p.health, 100.0);
    }
}
