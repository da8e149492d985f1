use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Gear rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Relic,
}

/// A single stat bonus granted by a piece of gear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatBonus {
    AttackPower(f32),
    Armor(f32),
    CritChance(f32),
    CritMultiplier(f32),
    Speed(f32),
    HealthMax(f32),
}

/// A carryable stat-bonus item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub rarity: Rarity,
    pub bonus: StatBonus,
}

/// Currency denominations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyKind {
    Ducat,
    BloodMarker,
}

/// What a ground item resolves to on pickup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroundItemPayload {
    Gear(Item),
    Currency { kind: CurrencyKind, amount: u32 },
}

/// An item lying on the ground, unique per room by id.
/// Velocity is cosmetic scatter for the client; the payload is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundItem {
    pub id: u32,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub payload: GroundItemPayload,
}

/// A purchasable entry in the shop inventory broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopEntry {
    pub slot: u8,
    pub cost_ducats: u32,
    pub item: Item,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_ordering() {
        assert!(Rarity::Common < Rarity::Uncommon);
        assert!(Rarity::Rare < Rarity::Relic);
    }
}
