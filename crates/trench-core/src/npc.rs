use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Per-room NPC identifier.
pub type NpcId = u32;

/// NPC archetypes. Each carries its own state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NpcKind {
    Prisoner,
    HereticPriest,
}

/// Prisoner escort states. `Betrayed` and `Hostile` both end in an
/// explosion; `RunToBoss` ends in a suicide charge against the boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrisonerState {
    Idle,
    Follow,
    RunToBoss,
    Betrayed,
    Hostile,
}

/// Heretic priest states. Leaves `Hostile` only by dying or by the
/// give-up reset back to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriestState {
    Idle,
    Hostile,
}

/// Archetype-tagged state, exhaustively matchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NpcState {
    Prisoner(PrisonerState),
    Priest(PriestState),
}

/// Wire-visible NPC snapshot broadcast at the NPC update rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcSnapshot {
    pub id: NpcId,
    pub kind: NpcKind,
    pub pos: Vec2,
    pub state: NpcState,
    pub alive: bool,
    /// Combat health, present for archetypes that take damage (priest).
    pub health: Option<f32>,
    /// Index into the state's bark line set, for client dialogue flavor.
    pub bark_line: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_tags_match_kind() {
        let s = NpcState::Prisoner(PrisonerState::Betrayed);
        assert!(matches!(s, NpcState::Prisoner(_)));
        let s = NpcState::Priest(PriestState::Hostile);
        assert!(matches!(s, NpcState::Priest(_)));
    }
}
