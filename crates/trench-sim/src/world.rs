use serde::{Deserialize, Serialize};

use trench_core::item::Item;
use trench_core::math::Vec2;
use trench_core::net::messages::{
    BatteryStateMsg, ChestSnapshot, ChestVariant, EnemyKind, EnemySnapshot, ForcedReason,
    PlayerSnapshot,
};
use trench_core::player::{PlayerId, PlayerStats};

/// What applied a DOT stack. Stacks from different sources never merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DotSource {
    Weapon,
    PriestCone,
}

/// One damage-over-time stack. Stacks are independent and additive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DotStack {
    pub dps: f32,
    pub time_left: f32,
    pub source: DotSource,
}

/// A pending revive channel on a downed player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviveChannel {
    pub by: PlayerId,
    pub complete_at: f64,
}

/// A completed channel waiting for the target to accept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviveReady {
    pub from: PlayerId,
    pub until: f64,
}

/// Server-authoritative state for one connected player.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub pos: Vec2,
    pub health: f32,
    pub health_max: f32,
    pub stats: PlayerStats,
    pub inventory: Vec<Item>,
    pub ducats: u32,
    pub blood_markers: u32,
    pub is_evil: bool,
    pub invincible: bool,
    pub invisible: bool,
    pub in_dialogue: bool,
    pub dots: Vec<DotStack>,
    /// Sequence number of the most recent input applied.
    pub last_input_seq: u32,
    /// Set when the client's claimed position drifted past the threshold.
    pub needs_correction: bool,
    /// While set, the server owns the position outright (knockback, snare).
    pub forced: Option<ForcedReason>,
    pub knockback_velocity: Vec2,
    pub forced_until: f64,
    /// Room time at which the player went down; `None` while alive.
    pub downed_at: Option<f64>,
    pub respawn_requested: bool,
    pub revive_channel: Option<ReviveChannel>,
    pub revive_ready: Option<ReviveReady>,
    pub potion_active: bool,
    pub quartermaster_visited: bool,
    pub carrying_battery: Option<u32>,
}

impl PlayerState {
    pub fn new(id: PlayerId, name: String, pos: Vec2, health_max: f32) -> Self {
        Self {
            id,
            name,
            pos,
            health: health_max,
            health_max,
            stats: PlayerStats::default(),
            inventory: Vec::new(),
            ducats: 0,
            blood_markers: 0,
            is_evil: false,
            invincible: false,
            invisible: false,
            in_dialogue: false,
            dots: Vec::new(),
            last_input_seq: 0,
            needs_correction: false,
            forced: None,
            knockback_velocity: Vec2::ZERO,
            forced_until: 0.0,
            downed_at: None,
            respawn_requested: false,
            revive_channel: None,
            revive_ready: None,
            potion_active: false,
            quartermaster_visited: false,
            carrying_battery: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Downed means dead but still inside the revive flow.
    pub fn is_downed(&self) -> bool {
        self.downed_at.is_some() && !self.respawn_requested
    }

    /// Drop every status effect. Used on revive and respawn.
    pub fn clear_status_effects(&mut self) {
        self.dots.clear();
        self.forced = None;
        self.knockback_velocity = Vec2::ZERO;
        self.potion_active = false;
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            pos: self.pos,
            health: self.health,
            health_max: self.health_max,
            is_evil: self.is_evil,
            invisible: self.invisible,
            downed: self.is_downed(),
        }
    }
}

/// A hostile combatant owned by the room.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub health: f32,
    pub health_max: f32,
    pub alive: bool,
    pub knockback_velocity: Vec2,
    pub knockback_remaining: f32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, health_max: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            health: health_max,
            health_max,
            alive: true,
            knockback_velocity: Vec2::ZERO,
            knockback_remaining: 0.0,
        }
    }

    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            pos: self.pos,
            health: self.health,
            health_max: self.health_max,
            alive: self.alive,
        }
    }
}

/// A lootable chest. The gold chest may hold the extraction artifact.
#[derive(Debug, Clone)]
pub struct Chest {
    pub id: String,
    pub pos: Vec2,
    pub variant: ChestVariant,
    pub opening: bool,
    pub opened: bool,
    pub health: f32,
    pub health_max: f32,
    pub has_artifact: bool,
}

impl Chest {
    pub fn snapshot(&self) -> ChestSnapshot {
        ChestSnapshot {
            id: self.id.clone(),
            pos: self.pos,
            variant: self.variant,
            opening: self.opening,
            opened: self.opened,
            health: self.health,
            health_max: self.health_max,
        }
    }
}

/// The extraction objective. At most one carrier at any time.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub carried_by: Option<PlayerId>,
    pub pos: Vec2,
    pub integrity: f32,
}

/// A placeable battery for powering the extraction gate.
#[derive(Debug, Clone)]
pub struct Battery {
    pub id: u32,
    pub pos: Vec2,
    pub carried_by: Option<PlayerId>,
    pub placed: bool,
}

impl Battery {
    pub fn state_msg(&self) -> BatteryStateMsg {
        BatteryStateMsg {
            battery_id: self.id,
            carried_by: self.carried_by,
            pos: self.pos,
            placed: self.placed,
        }
    }
}

/// An explodable environment barrel.
#[derive(Debug, Clone)]
pub struct Barrel {
    pub id: u32,
    pub pos: Vec2,
    pub health: f32,
    pub alive: bool,
}

/// Server-tracked bullet subset, used only for PvP and hazard collision.
/// Most projectiles are relayed and client-simulated.
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: u32,
    pub owner: PlayerId,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub radius: f32,
    pub life: f32,
    pub is_cone: bool,
    pub ignore_enemies: bool,
    pub no_damage: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_player_is_alive_and_not_downed() {
        let p = PlayerState::new(1, "a".into(), Vec2::ZERO, 100.0);
        assert!(p.is_alive());
        assert!(!p.is_downed());
    }

    #[test]
    fn downed_until_respawn_requested() {
        let mut p = PlayerState::new(1, "a".into(), Vec2::ZERO, 100.0);
        p.health = 0.0;
        p.downed_at = Some(5.0);
        assert!(p.is_downed());
        p.respawn_requested = true;
        assert!(!p.is_downed());
    }

    #[test]
    fn clear_status_effects_purges_dots_and_forcing() {
        let mut p = PlayerState::new(1, "a".into(), Vec2::ZERO, 100.0);
        p.dots.push(DotStack {
            dps: 5.0,
            time_left: 3.0,
            source: DotSource::PriestCone,
        });
        p.forced = Some(ForcedReason::Knockback);
        p.knockback_velocity = Vec2::new(10.0, 0.0);
        p.clear_status_effects();
        assert!(p.dots.is_empty());
        assert!(p.forced.is_none());
        assert_eq!(p.knockback_velocity, Vec2::ZERO);
    }
}
