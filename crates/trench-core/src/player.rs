use serde::{Deserialize, Serialize};

/// Unique identifier for a connected player (allocated per connection).
pub type PlayerId = u64;

/// Lobby-level identity of a connected player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
}

/// Combat stats carried by a player. Gear bonuses fold into these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub attack_power: f32,
    pub armor: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub speed: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            attack_power: 0.0,
            armor: 0.0,
            crit_chance: 0.05,
            crit_multiplier: 2.0,
            speed: 220.0,
        }
    }
}

/// Hard cap on carried gear.
pub const INVENTORY_CAPACITY: usize = 6;
/// Currency caps.
pub const MAX_DUCATS: u32 = 9_999;
pub const MAX_BLOOD_MARKERS: u32 = 99;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_have_no_gear_bonus() {
        let stats = PlayerStats::default();
        assert_eq!(stats.attack_power, 0.0);
        assert_eq!(stats.armor, 0.0);
        assert!(stats.crit_chance > 0.0 && stats.crit_chance < 1.0);
    }
}
