use serde::{Deserialize, Serialize};

/// Data-driven gameplay tuning for a room simulation.
///
/// Everything here is balance, not protocol: changing a value must never
/// break the wire format or the handler contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulation tick rate (Hz).
    pub tick_rate_hz: u32,
    /// Player/NPC state broadcast rate (Hz).
    pub broadcast_rate_hz: u32,

    /// Starting player health.
    pub player_health_max: f32,
    /// Fraction of max health restored by an accepted revive.
    pub revive_health_fraction: f32,
    /// Maximum distance between reviver and downed target (units).
    pub revive_range: f32,
    /// Revive channel duration (seconds).
    pub revive_channel_secs: f32,
    /// Window after a completed channel in which the target may accept.
    pub revive_accept_window_secs: f32,
    /// Window after going down during which teammates can revive at all.
    pub revive_window_secs: f32,

    /// Health potion: total healing and duration of the over-time effect.
    pub potion_heal_total: f32,
    pub potion_heal_secs: f32,
    pub potion_heal_ticks: u32,

    /// Knockback forced-position duration (seconds).
    pub knockback_secs: f32,
    /// Positional drift beyond which the server flags `needs_correction`.
    pub correction_threshold: f32,

    /// Prisoner escort NPC.
    pub prisoner_attack_range: f32,
    pub prisoner_attack_damage: f32,
    pub prisoner_attack_cooldown_secs: f32,
    pub prisoner_follow_gap: f32,
    pub prisoner_speed: f32,
    pub prisoner_hostile_speed_bonus: f32,
    pub prisoner_betrayed_secs: f32,
    pub prisoner_hostile_secs: f32,
    pub prisoner_boss_trigger_range: f32,
    pub prisoner_explosion_radius: f32,
    pub prisoner_explosion_inner_radius: f32,
    /// Range at which a hostile prisoner prefers an attractor lure over players.
    pub prisoner_lure_range: f32,
    pub prisoner_explosion_damage_max: f32,
    pub prisoner_explosion_damage_min: f32,
    /// Boss damage from a suicide charge, as a fraction range of boss max health.
    pub prisoner_boss_hit_min_fraction: f32,
    pub prisoner_boss_hit_max_fraction: f32,
    /// Chance a troop caught in a run-to-boss blast is killed outright.
    pub prisoner_troop_instakill_chance: f64,

    /// Heretic priest NPC.
    pub priest_health: f32,
    pub priest_announce_secs: f32,
    pub priest_charge_speed: f32,
    pub priest_evade_speed: f32,
    pub priest_charge_switch_range: f32,
    pub priest_evade_close_range: f32,
    pub priest_burst_shot_interval_min_secs: f32,
    pub priest_burst_shot_interval_max_secs: f32,
    pub priest_burst_secs_min: f32,
    pub priest_burst_secs_max: f32,
    pub priest_rest_secs_min: f32,
    pub priest_rest_secs_max: f32,
    pub priest_cone_range: f32,
    pub priest_cone_half_angle_deg: f32,
    pub priest_cone_inaccuracy_deg: f32,
    pub priest_cone_dot_dps: f32,
    pub priest_cone_dot_secs: f32,
    /// Distance from spawn beyond which a non-idle priest resets home.
    pub priest_give_up_range: f32,
    pub priest_loot_count: u32,

    /// Shop / quartermaster economy.
    pub quartermaster_bonus_ducats: u32,
    pub quartermaster_repeat_blood_markers: u32,

    /// Mode timers.
    pub ready_timer_secs: f32,
    pub extraction_timer_secs: f32,

    /// Chest respawn delay after extraction reset (seconds).
    pub chest_respawn_secs: f32,
    /// Ring-search parameters for finding a clear drop position.
    pub drop_search_radius_step: f32,
    pub drop_search_max_rings: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 30,
            broadcast_rate_hz: 10,

            player_health_max: 100.0,
            revive_health_fraction: 0.30,
            revive_range: 80.0,
            revive_channel_secs: 4.0,
            revive_accept_window_secs: 10.0,
            revive_window_secs: 60.0,

            potion_heal_total: 40.0,
            potion_heal_secs: 4.0,
            potion_heal_ticks: 8,

            knockback_secs: 0.35,
            correction_threshold: 10.0,

            prisoner_attack_range: 180.0,
            prisoner_attack_damage: 15.0,
            prisoner_attack_cooldown_secs: 1.2,
            prisoner_follow_gap: 12.0,
            prisoner_speed: 160.0,
            prisoner_hostile_speed_bonus: 1.15,
            prisoner_betrayed_secs: 3.0,
            prisoner_hostile_secs: 4.0,
            prisoner_boss_trigger_range: 800.0,
            prisoner_explosion_radius: 220.0,
            prisoner_explosion_inner_radius: 60.0,
            prisoner_lure_range: 260.0,
            prisoner_explosion_damage_max: 300.0,
            prisoner_explosion_damage_min: 150.0,
            prisoner_boss_hit_min_fraction: 0.50,
            prisoner_boss_hit_max_fraction: 0.70,
            prisoner_troop_instakill_chance: 0.95,

            priest_health: 1000.0,
            priest_announce_secs: 1.5,
            priest_charge_speed: 240.0,
            priest_evade_speed: 200.0,
            priest_charge_switch_range: 140.0,
            priest_evade_close_range: 220.0,
            priest_burst_shot_interval_min_secs: 0.090,
            priest_burst_shot_interval_max_secs: 0.140,
            priest_burst_secs_min: 2.0,
            priest_burst_secs_max: 7.0,
            priest_rest_secs_min: 1.0,
            priest_rest_secs_max: 3.0,
            priest_cone_range: 320.0,
            priest_cone_half_angle_deg: 10.0,
            priest_cone_inaccuracy_deg: 10.0,
            priest_cone_dot_dps: 1.0,
            priest_cone_dot_secs: 3.0,
            priest_give_up_range: 3000.0,
            priest_loot_count: 4,

            quartermaster_bonus_ducats: 30,
            quartermaster_repeat_blood_markers: 10,

            ready_timer_secs: 10.0,
            extraction_timer_secs: 120.0,

            chest_respawn_secs: 30.0,
            drop_search_radius_step: 24.0,
            drop_search_max_rings: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = SimConfig::default();
        assert!(c.tick_rate_hz >= c.broadcast_rate_hz);
        assert!(c.revive_health_fraction > 0.0 && c.revive_health_fraction < 1.0);
        assert!(c.prisoner_boss_hit_min_fraction <= c.prisoner_boss_hit_max_fraction);
        assert!(c.priest_burst_secs_min <= c.priest_burst_secs_max);
    }

    #[test]
    fn deserializes_partial_toml() {
        let c: SimConfig = toml::from_str("priest_health = 500.0").unwrap();
        assert_eq!(c.priest_health, 500.0);
        assert_eq!(c.tick_rate_hz, SimConfig::default().tick_rate_hz);
    }
}
