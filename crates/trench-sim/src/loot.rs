//! Loot tables, shop catalog, and deterministic drop placement.
//!
//! Chest and priest drops must be reproducible from `world_seed` plus the
//! entity id alone: a restarted server with the same seed re-derives the
//! same loot at the same angles, without consuming the room's shared RNG.

use std::f32::consts::TAU;

use trench_core::item::{
    CurrencyKind, GroundItem, GroundItemPayload, Item, Rarity, ShopEntry, StatBonus,
};
use trench_core::math::Vec2;
use trench_core::net::messages::ChestVariant;
use trench_core::rng::{SeededRng, hash_id};
use trench_core::room::Boundary;

/// A rolled drop before it becomes a `GroundItem`: offset from the source
/// position plus payload.
#[derive(Debug, Clone)]
pub struct Drop {
    pub offset: Vec2,
    pub payload: GroundItemPayload,
}

const COMMON_NAMES: &[&str] = &[
    "Rusted Bayonet",
    "Trench Spade",
    "Tin Icon",
    "Wax-Sealed Orders",
];
const UNCOMMON_NAMES: &[&str] = &["Blessed Shrapnel", "Gas-Hound Mask", "Iron Rosary"];
const RARE_NAMES: &[&str] = &["Saint's Fingerbone", "Thurible Charge"];
const RELIC_NAMES: &[&str] = &["Grail Shard"];

/// Roll one gear item of the given rarity. Bonuses scale with tier.
pub fn roll_item(rng: &mut SeededRng, rarity: Rarity) -> Item {
    let (names, scale) = match rarity {
        Rarity::Common => (COMMON_NAMES, 1.0),
        Rarity::Uncommon => (UNCOMMON_NAMES, 2.0),
        Rarity::Rare => (RARE_NAMES, 3.5),
        Rarity::Relic => (RELIC_NAMES, 6.0),
    };
    let name = rng.pick(names).copied().unwrap_or("Trench Spade");
    let bonus = match rng.gen_range_i64(0, 5) {
        0 => StatBonus::AttackPower(2.0 * scale),
        1 => StatBonus::Armor(3.0 * scale),
        2 => StatBonus::CritChance(0.02 * scale),
        3 => StatBonus::CritMultiplier(0.1 * scale),
        4 => StatBonus::Speed(5.0 * scale),
        _ => StatBonus::HealthMax(8.0 * scale),
    };
    Item {
        name: name.to_string(),
        rarity,
        bonus,
    }
}

/// Roll a rarity tier weighted toward the bottom.
pub fn roll_rarity(rng: &mut SeededRng) -> Rarity {
    let v = rng.next_f64();
    if v < 0.60 {
        Rarity::Common
    } else if v < 0.88 {
        Rarity::Uncommon
    } else if v < 0.98 {
        Rarity::Rare
    } else {
        Rarity::Relic
    }
}

/// Deterministic RNG for one entity's loot: world seed folded with the
/// entity id hash, so per-entity rolls are independent of roll order.
pub fn entity_rng(world_seed: u64, entity_id: &str) -> SeededRng {
    SeededRng::new(world_seed.wrapping_add(hash_id(entity_id)))
}

/// Loot for opening a chest. Same seed and chest id give the same payloads
/// at the same angular offsets on every call.
pub fn chest_loot(world_seed: u64, chest_id: &str, variant: ChestVariant) -> Vec<Drop> {
    let mut rng = entity_rng(world_seed, chest_id);
    let (count, scatter) = match variant {
        ChestVariant::Gold => (3, 42.0),
        ChestVariant::Brown => (2, 34.0),
        ChestVariant::StartGear => (1, 26.0),
    };
    let base_angle = rng.gen_range_f64(0.0, f64::from(TAU)) as f32;
    (0..count)
        .map(|i| {
            let angle = base_angle + TAU * i as f32 / count as f32;
            let payload = match variant {
                ChestVariant::StartGear => {
                    GroundItemPayload::Gear(roll_item(&mut rng, Rarity::Common))
                },
                _ => {
                    if rng.next_f64() < 0.35 {
                        GroundItemPayload::Currency {
                            kind: CurrencyKind::Ducat,
                            amount: rng.gen_range_i64(5, 25) as u32,
                        }
                    } else {
                        let rarity = roll_rarity(&mut rng);
                        GroundItemPayload::Gear(roll_item(&mut rng, rarity))
                    }
                },
            };
            Drop {
                offset: Vec2::from_angle(angle).scale(scatter),
                payload,
            }
        })
        .collect()
}

/// The heretic priest's guaranteed drop: `count` items in an even angular
/// spread, seeded from the priest's id.
pub fn priest_loot(world_seed: u64, npc_id: u32, count: u32) -> Vec<Drop> {
    let mut rng = entity_rng(world_seed, &format!("priest_{npc_id}"));
    let base_angle = rng.gen_range_f64(0.0, f64::from(TAU)) as f32;
    (0..count)
        .map(|i| {
            let angle = base_angle + TAU * i as f32 / count as f32;
            // Priest loot skews high: at least uncommon.
            let rarity = match roll_rarity(&mut rng) {
                Rarity::Common => Rarity::Uncommon,
                r => r,
            };
            Drop {
                offset: Vec2::from_angle(angle).scale(48.0),
                payload: GroundItemPayload::Gear(roll_item(&mut rng, rarity)),
            }
        })
        .collect()
}

/// The fixed shop catalog for a world seed.
pub fn shop_catalog(world_seed: u64) -> Vec<ShopEntry> {
    let mut rng = entity_rng(world_seed, "shop");
    let tiers = [
        (Rarity::Common, 20),
        (Rarity::Common, 25),
        (Rarity::Uncommon, 60),
        (Rarity::Uncommon, 75),
        (Rarity::Rare, 160),
        (Rarity::Relic, 400),
    ];
    tiers
        .iter()
        .enumerate()
        .map(|(slot, (rarity, cost))| ShopEntry {
            slot: slot as u8,
            cost_ducats: *cost,
            item: roll_item(&mut rng, *rarity),
        })
        .collect()
}

/// Roll and spawn loot for a slain enemy at `pos`. Enemy drops are chance
/// rolls against the room's shared RNG, unlike the seed-derived chest and
/// priest tables.
pub fn spawn_enemy_loot(
    pos: Vec2,
    rng: &mut SeededRng,
    ground_items: &mut std::collections::HashMap<u32, GroundItem>,
    next_id: &mut u32,
) -> Vec<GroundItem> {
    if rng.next_f64() < 0.40 {
        return Vec::new();
    }
    let count = rng.gen_range_i64(1, 2);
    let mut spawned = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let angle = rng.gen_range_f64(0.0, f64::from(TAU)) as f32;
        let offset = Vec2::from_angle(angle).scale(rng.gen_range_f64(8.0, 28.0) as f32);
        let payload = if rng.next_f64() < 0.7 {
            GroundItemPayload::Currency {
                kind: CurrencyKind::Ducat,
                amount: rng.gen_range_i64(1, 8) as u32,
            }
        } else {
            let rarity = roll_rarity(rng);
            GroundItemPayload::Gear(roll_item(rng, rarity))
        };
        let id = *next_id;
        *next_id += 1;
        let item = GroundItem {
            id,
            pos: pos.add(offset),
            velocity: offset.scale(3.0),
            payload,
        };
        ground_items.insert(id, item.clone());
        spawned.push(item);
    }
    spawned
}

/// Minimum spacing between a drop and existing ground items.
const DROP_CLEARANCE: f32 = 18.0;

/// Ring search for a clear position to drop an item near `origin`.
///
/// Tries the origin first, then rings of increasing radius with eight
/// angular samples each. A position is clear when it is inside the boundary
/// and at least `DROP_CLEARANCE` from every occupied point. Falls back to
/// the clamped origin when every candidate is blocked.
pub fn find_clear_drop_position(
    origin: Vec2,
    occupied: &[Vec2],
    boundary: &Boundary,
    radius_step: f32,
    max_rings: u32,
) -> Vec2 {
    let is_clear = |p: Vec2| {
        boundary.contains(p.x, p.y)
            && occupied
                .iter()
                .all(|o| o.distance_sq(p) >= DROP_CLEARANCE * DROP_CLEARANCE)
    };
    if is_clear(origin) {
        return origin;
    }
    for ring in 1..=max_rings {
        let radius = radius_step * ring as f32;
        for step in 0..8 {
            let angle = TAU * step as f32 / 8.0;
            let candidate = origin.add(Vec2::from_angle(angle).scale(radius));
            if is_clear(candidate) {
                return candidate;
            }
        }
    }
    let (x, y) = boundary.clamp(origin.x, origin.y);
    Vec2::new(x, y)
}
