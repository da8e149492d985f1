use serde::{Deserialize, Serialize};

use crate::item::{GroundItem, Item, ShopEntry};
use crate::math::Vec2;
use crate::npc::{NpcId, NpcSnapshot, NpcState};
use crate::player::{Player, PlayerId};
use crate::room::{LevelType, Scene};

/// Network message type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    // Client -> Server: session
    JoinRoom = 0x01,
    LeaveRoom = 0x02,
    PlayerInput = 0x03,

    // Client -> Server: combat
    BulletFired = 0x10,
    Weapon7Hitscan = 0x11,
    Weapon8Hitscan = 0x12,
    ExplosionDamage = 0x13,
    ProjectileHit = 0x14,
    DotTick = 0x15,
    EnemyDied = 0x16,
    ChestDamage = 0x17,
    BarrelDamage = 0x18,
    ArtifactDamage = 0x19,
    PvpDirectDamage = 0x1A,

    // Client -> Server: NPCs
    NpcDamage = 0x20,
    NpcDot = 0x21,
    NpcSetState = 0x22,

    // Client -> Server: mode/scene
    SceneChange = 0x28,
    SetLevelType = 0x29,
    ReadyTimerStart = 0x2A,
    ReadyTimerCancel = 0x2B,
    ExtractionTimerStart = 0x2C,
    ExtractionTimerCancel = 0x2D,

    // Client -> Server: player status
    ReviveStartRequest = 0x30,
    ReviveAccept = 0x31,
    PlayerDeath = 0x32,
    PlayerRespawn = 0x33,
    UseHealthPotion = 0x34,
    InvincibilityToggle = 0x35,
    InvisibilityToggle = 0x36,
    SetEvilState = 0x37,

    // Client -> Server: items/economy
    ChestOpenRequest = 0x40,
    InventoryDropRequest = 0x41,
    InventoryPickupRequest = 0x42,
    ArtifactPickupRequest = 0x43,
    ArtifactDropRequest = 0x44,
    BatteryPickupRequest = 0x45,
    BatteryDropRequest = 0x46,
    BatteryPlaceRequest = 0x47,
    RequestShopInventory = 0x48,
    PurchaseShopItem = 0x49,
    QuartermasterRequisition = 0x4A,

    // Client -> Server: debug/dev tooling
    DebugSpawnHorde = 0x50,
    DebugSetValue = 0x51,
    VfxCreated = 0x52,

    // Server -> Client
    JoinRoomResponse = 0x80,
    RoomSnapshot = 0x81,
    PlayerList = 0x82,
    PlayerStateUpdate = 0x83,
    PlayerHealthUpdate = 0x84,
    DamageNumber = 0x85,
    PlayerDied = 0x86,
    PlayerRespawned = 0x87,
    ReviveBegin = 0x88,
    ReviveCancel = 0x89,
    ReviveReady = 0x8A,
    ReviveComplete = 0x8B,
    StatusToggleResult = 0x8C,
    NpcUpdate = 0x90,
    NpcExplosion = 0x91,
    NpcDied = 0x92,
    EnemyUpdate = 0x98,
    EnemyDamaged = 0x99,
    EnemyKilled = 0x9A,
    ChestOpened = 0xA0,
    ChestUpdate = 0xA1,
    GroundItemSpawned = 0xA2,
    GroundItemRemoved = 0xA3,
    ArtifactState = 0xA4,
    BatteryState = 0xA5,
    ShopInventory = 0xA8,
    PurchaseResult = 0xA9,
    QuartermasterResult = 0xAA,
    ModeUpdate = 0xB0,
    ExtractionComplete = 0xB1,
    BulletFiredRelay = 0xB8,
    HitscanHit = 0xB9,
    VfxRelay = 0xBA,
}

impl MessageType {
    pub fn from_byte(b: u8) -> Option<Self> {
        use MessageType::*;
        Some(match b {
            0x01 => JoinRoom,
            0x02 => LeaveRoom,
            0x03 => PlayerInput,
            0x10 => BulletFired,
            0x11 => Weapon7Hitscan,
            0x12 => Weapon8Hitscan,
            0x13 => ExplosionDamage,
            0x14 => ProjectileHit,
            0x15 => DotTick,
            0x16 => EnemyDied,
            0x17 => ChestDamage,
            0x18 => BarrelDamage,
            0x19 => ArtifactDamage,
            0x1A => PvpDirectDamage,
            0x20 => NpcDamage,
            0x21 => NpcDot,
            0x22 => NpcSetState,
            0x28 => SceneChange,
            0x29 => SetLevelType,
            0x2A => ReadyTimerStart,
            0x2B => ReadyTimerCancel,
            0x2C => ExtractionTimerStart,
            0x2D => ExtractionTimerCancel,
            0x30 => ReviveStartRequest,
            0x31 => ReviveAccept,
            0x32 => PlayerDeath,
            0x33 => PlayerRespawn,
            0x34 => UseHealthPotion,
            0x35 => InvincibilityToggle,
            0x36 => InvisibilityToggle,
            0x37 => SetEvilState,
            0x40 => ChestOpenRequest,
            0x41 => InventoryDropRequest,
            0x42 => InventoryPickupRequest,
            0x43 => ArtifactPickupRequest,
            0x44 => ArtifactDropRequest,
            0x45 => BatteryPickupRequest,
            0x46 => BatteryDropRequest,
            0x47 => BatteryPlaceRequest,
            0x48 => RequestShopInventory,
            0x49 => PurchaseShopItem,
            0x4A => QuartermasterRequisition,
            0x50 => DebugSpawnHorde,
            0x51 => DebugSetValue,
            0x52 => VfxCreated,
            0x80 => JoinRoomResponse,
            0x81 => RoomSnapshot,
            0x82 => PlayerList,
            0x83 => PlayerStateUpdate,
            0x84 => PlayerHealthUpdate,
            0x85 => DamageNumber,
            0x86 => PlayerDied,
            0x87 => PlayerRespawned,
            0x88 => ReviveBegin,
            0x89 => ReviveCancel,
            0x8A => ReviveReady,
            0x8B => ReviveComplete,
            0x8C => StatusToggleResult,
            0x90 => NpcUpdate,
            0x91 => NpcExplosion,
            0x92 => NpcDied,
            0x98 => EnemyUpdate,
            0x99 => EnemyDamaged,
            0x9A => EnemyKilled,
            0xA0 => ChestOpened,
            0xA1 => ChestUpdate,
            0xA2 => GroundItemSpawned,
            0xA3 => GroundItemRemoved,
            0xA4 => ArtifactState,
            0xA5 => BatteryState,
            0xA8 => ShopInventory,
            0xA9 => PurchaseResult,
            0xAA => QuartermasterResult,
            0xB0 => ModeUpdate,
            0xB1 => ExtractionComplete,
            0xB8 => BulletFiredRelay,
            0xB9 => HitscanHit,
            0xBA => VfxRelay,
            _ => return None,
        })
    }
}

// ================================================================
// Client -> Server payloads
// ================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomMsg {
    pub room_id: String,
    pub player_name: String,
    pub protocol_version: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRoomMsg {
    pub player_id: PlayerId,
}

/// Per-frame movement/action intent. The server integrates the same inputs
/// the client predicts from, keyed by `seq` for reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInputMsg {
    pub seq: u32,
    pub move_x: f32,
    pub move_y: f32,
    pub aim_angle: f32,
    pub dash: bool,
    pub dt: f32,
    /// Where the client's own prediction placed it after this input. The
    /// server compares against its integration to flag drift.
    pub claimed_pos: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletFiredMsg {
    pub bullet_id: u32,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub radius: f32,
    pub life: f32,
    pub weapon: u8,
    pub is_cone: bool,
    pub ignore_enemies: bool,
    pub no_damage: bool,
}

/// Hitscan shot with client-claimed hits; the server re-validates each
/// target before applying damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitscanMsg {
    pub origin: Vec2,
    pub angle: f32,
    pub enemy_hits: Vec<u32>,
    pub player_hits: Vec<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionDamageMsg {
    pub pos: Vec2,
    pub inner_radius: f32,
    pub radius: f32,
    pub max_damage: f32,
    pub min_damage: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileHitMsg {
    pub enemy_id: u32,
    pub base_damage: f32,
    pub weapon_crit: f32,
    pub knockback: Option<Vec2>,
}

/// Client-simulated weapon DOT ticking on an enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotTickMsg {
    pub enemy_id: u32,
    pub dps: f32,
    pub dt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDiedMsg {
    pub enemy_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChestDamageMsg {
    pub chest_id: String,
    pub damage: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrelDamageMsg {
    pub barrel_id: u32,
    pub damage: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDamageMsg {
    pub damage: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvpDirectDamageMsg {
    pub target: PlayerId,
    pub base_damage: f32,
    pub weapon_crit: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcDamageMsg {
    pub npc_id: NpcId,
    pub base_damage: f32,
    pub weapon_crit: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcDotMsg {
    pub npc_id: NpcId,
    pub dps: f32,
    pub duration: f32,
}

/// Dialogue-triggered NPC state transition request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcSetStateMsg {
    pub npc_id: NpcId,
    pub state: NpcState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneChangeMsg {
    pub scene: Scene,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLevelTypeMsg {
    pub level_type: LevelType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviveStartRequestMsg {
    pub target: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleMsg {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChestOpenRequestMsg {
    pub chest_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryDropRequestMsg {
    pub slot: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPickupRequestMsg {
    pub ground_item_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryPickupRequestMsg {
    pub battery_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseShopItemMsg {
    pub slot: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSpawnHordeMsg {
    pub count: u8,
    pub near: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSetValueMsg {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VfxCreatedMsg {
    pub kind: u8,
    pub pos: Vec2,
    pub angle: f32,
}

/// Empty-payload marker for intents that carry no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyMsg {}

// ================================================================
// Server -> Client payloads
// ================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomResponseMsg {
    pub success: bool,
    pub player_id: Option<PlayerId>,
    pub room_id: Option<String>,
    pub scene: Option<Scene>,
    pub error: Option<String>,
}

/// Wire-visible player state for snapshots and movement broadcasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub pos: Vec2,
    pub health: f32,
    pub health_max: f32,
    pub is_evil: bool,
    pub invisible: bool,
    pub downed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub health: f32,
    pub health_max: f32,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Troop,
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChestVariant {
    Gold,
    Brown,
    StartGear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChestSnapshot {
    pub id: String,
    pub pos: Vec2,
    pub variant: ChestVariant,
    pub opening: bool,
    pub opened: bool,
    pub health: f32,
    pub health_max: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactStateMsg {
    pub carried_by: Option<PlayerId>,
    pub pos: Vec2,
    pub integrity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryStateMsg {
    pub battery_id: u32,
    pub carried_by: Option<PlayerId>,
    pub pos: Vec2,
    pub placed: bool,
}

/// Late-join (and scene-change) full room sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshotMsg {
    pub scene: Scene,
    pub level_type: LevelType,
    pub world_seed: u64,
    pub players: Vec<PlayerSnapshot>,
    pub npcs: Vec<NpcSnapshot>,
    pub enemies: Vec<EnemySnapshot>,
    pub chests: Vec<ChestSnapshot>,
    pub ground_items: Vec<GroundItem>,
    pub artifact: Option<ArtifactStateMsg>,
    pub batteries: Vec<BatteryStateMsg>,
    pub ready_timer_remaining: Option<f32>,
    pub extraction_timer_remaining: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerListMsg {
    pub players: Vec<Player>,
}

/// Why the server is forcing a client's position rather than letting
/// prediction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForcedReason {
    Knockback,
    Ensnared,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPosUpdate {
    pub id: PlayerId,
    pub pos: Vec2,
    pub last_input_seq: u32,
    pub needs_correction: bool,
    pub forced: Option<ForcedReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStateUpdateMsg {
    pub updates: Vec<PlayerPosUpdate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerHealthUpdateMsg {
    pub id: PlayerId,
    pub health: f32,
    pub health_max: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageTargetKind {
    Player,
    Enemy,
    Npc,
    Chest,
    Barrel,
    Artifact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageNumberMsg {
    pub pos: Vec2,
    pub amount: f32,
    pub crit: bool,
    pub target: DamageTargetKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDiedMsg {
    pub id: PlayerId,
    pub revive_window_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRespawnedMsg {
    pub id: PlayerId,
    pub pos: Vec2,
    pub health: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviveBeginMsg {
    pub target: PlayerId,
    pub by: PlayerId,
    pub duration_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviveCancelMsg {
    pub target: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviveReadyMsg {
    pub target: PlayerId,
    pub from: PlayerId,
    pub window_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviveCompleteMsg {
    pub target: PlayerId,
    pub health: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusToggleResultMsg {
    pub id: PlayerId,
    pub which: StatusToggleKind,
    pub enabled: bool,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusToggleKind {
    Invincibility,
    Invisibility,
    Evil,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcUpdateMsg {
    pub npcs: Vec<NpcSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcExplosionMsg {
    pub npc_id: NpcId,
    pub pos: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcDiedMsg {
    pub npc_id: NpcId,
    pub loot: Vec<GroundItem>,
    pub mission_accomplished: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyUpdateMsg {
    pub enemies: Vec<EnemySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDamagedMsg {
    pub enemy_id: u32,
    pub health: f32,
    pub crit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyKilledMsg {
    pub enemy_id: u32,
    pub loot: Vec<GroundItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChestOpenedMsg {
    pub chest_id: String,
    pub loot: Vec<GroundItem>,
    pub has_artifact: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChestUpdateMsg {
    pub chest_id: String,
    pub health: f32,
    pub opening: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundItemSpawnedMsg {
    pub item: GroundItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundItemRemovedMsg {
    pub ground_item_id: u32,
    pub taken_by: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopInventoryMsg {
    pub entries: Vec<ShopEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseResultMsg {
    pub success: bool,
    pub slot: u8,
    pub ducats_remaining: u32,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuartermasterResultMsg {
    pub first_visit: bool,
    pub ducats_granted: u32,
    pub blood_markers_granted: u32,
    pub item: Option<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeUpdateMsg {
    pub scene: Scene,
    pub level_type: LevelType,
    pub ready_timer_remaining: Option<f32>,
    pub extraction_timer_remaining: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionCompleteMsg {
    pub accomplishments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletFiredRelayMsg {
    pub shooter: PlayerId,
    pub bullet: BulletFiredMsg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitscanHitMsg {
    pub weapon: u8,
    pub shooter: PlayerId,
    pub enemy_hits: Vec<u32>,
    pub player_hits: Vec<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VfxRelayMsg {
    pub by: PlayerId,
    pub kind: u8,
    pub pos: Vec2,
    pub angle: f32,
}

// ================================================================
// Top-level message enums
// ================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    JoinRoom(JoinRoomMsg),
    LeaveRoom(LeaveRoomMsg),
    PlayerInput(PlayerInputMsg),
    BulletFired(BulletFiredMsg),
    Weapon7Hitscan(HitscanMsg),
    Weapon8Hitscan(HitscanMsg),
    ExplosionDamage(ExplosionDamageMsg),
    ProjectileHit(ProjectileHitMsg),
    DotTick(DotTickMsg),
    EnemyDied(EnemyDiedMsg),
    ChestDamage(ChestDamageMsg),
    BarrelDamage(BarrelDamageMsg),
    ArtifactDamage(ArtifactDamageMsg),
    PvpDirectDamage(PvpDirectDamageMsg),
    NpcDamage(NpcDamageMsg),
    NpcDot(NpcDotMsg),
    NpcSetState(NpcSetStateMsg),
    SceneChange(SceneChangeMsg),
    SetLevelType(SetLevelTypeMsg),
    ReadyTimerStart(EmptyMsg),
    ReadyTimerCancel(EmptyMsg),
    ExtractionTimerStart(EmptyMsg),
    ExtractionTimerCancel(EmptyMsg),
    ReviveStartRequest(ReviveStartRequestMsg),
    ReviveAccept(EmptyMsg),
    PlayerDeath(EmptyMsg),
    PlayerRespawn(EmptyMsg),
    UseHealthPotion(EmptyMsg),
    InvincibilityToggle(ToggleMsg),
    InvisibilityToggle(ToggleMsg),
    SetEvilState(ToggleMsg),
    ChestOpenRequest(ChestOpenRequestMsg),
    InventoryDropRequest(InventoryDropRequestMsg),
    InventoryPickupRequest(InventoryPickupRequestMsg),
    ArtifactPickupRequest(EmptyMsg),
    ArtifactDropRequest(EmptyMsg),
    BatteryPickupRequest(BatteryPickupRequestMsg),
    BatteryDropRequest(EmptyMsg),
    BatteryPlaceRequest(EmptyMsg),
    RequestShopInventory(EmptyMsg),
    PurchaseShopItem(PurchaseShopItemMsg),
    QuartermasterRequisition(EmptyMsg),
    DebugSpawnHorde(DebugSpawnHordeMsg),
    DebugSetValue(DebugSetValueMsg),
    VfxCreated(VfxCreatedMsg),
}

impl ClientMessage {
    pub fn message_type(&self) -> MessageType {
        use ClientMessage::*;
        match self {
            JoinRoom(_) => MessageType::JoinRoom,
            LeaveRoom(_) => MessageType::LeaveRoom,
            PlayerInput(_) => MessageType::PlayerInput,
            BulletFired(_) => MessageType::BulletFired,
            Weapon7Hitscan(_) => MessageType::Weapon7Hitscan,
            Weapon8Hitscan(_) => MessageType::Weapon8Hitscan,
            ExplosionDamage(_) => MessageType::ExplosionDamage,
            ProjectileHit(_) => MessageType::ProjectileHit,
            DotTick(_) => MessageType::DotTick,
            EnemyDied(_) => MessageType::EnemyDied,
            ChestDamage(_) => MessageType::ChestDamage,
            BarrelDamage(_) => MessageType::BarrelDamage,
            ArtifactDamage(_) => MessageType::ArtifactDamage,
            PvpDirectDamage(_) => MessageType::PvpDirectDamage,
            NpcDamage(_) => MessageType::NpcDamage,
            NpcDot(_) => MessageType::NpcDot,
            NpcSetState(_) => MessageType::NpcSetState,
            SceneChange(_) => MessageType::SceneChange,
            SetLevelType(_) => MessageType::SetLevelType,
            ReadyTimerStart(_) => MessageType::ReadyTimerStart,
            ReadyTimerCancel(_) => MessageType::ReadyTimerCancel,
            ExtractionTimerStart(_) => MessageType::ExtractionTimerStart,
            ExtractionTimerCancel(_) => MessageType::ExtractionTimerCancel,
            ReviveStartRequest(_) => MessageType::ReviveStartRequest,
            ReviveAccept(_) => MessageType::ReviveAccept,
            PlayerDeath(_) => MessageType::PlayerDeath,
            PlayerRespawn(_) => MessageType::PlayerRespawn,
            UseHealthPotion(_) => MessageType::UseHealthPotion,
            InvincibilityToggle(_) => MessageType::InvincibilityToggle,
            InvisibilityToggle(_) => MessageType::InvisibilityToggle,
            SetEvilState(_) => MessageType::SetEvilState,
            ChestOpenRequest(_) => MessageType::ChestOpenRequest,
            InventoryDropRequest(_) => MessageType::InventoryDropRequest,
            InventoryPickupRequest(_) => MessageType::InventoryPickupRequest,
            ArtifactPickupRequest(_) => MessageType::ArtifactPickupRequest,
            ArtifactDropRequest(_) => MessageType::ArtifactDropRequest,
            BatteryPickupRequest(_) => MessageType::BatteryPickupRequest,
            BatteryDropRequest(_) => MessageType::BatteryDropRequest,
            BatteryPlaceRequest(_) => MessageType::BatteryPlaceRequest,
            RequestShopInventory(_) => MessageType::RequestShopInventory,
            PurchaseShopItem(_) => MessageType::PurchaseShopItem,
            QuartermasterRequisition(_) => MessageType::QuartermasterRequisition,
            DebugSpawnHorde(_) => MessageType::DebugSpawnHorde,
            DebugSetValue(_) => MessageType::DebugSetValue,
            VfxCreated(_) => MessageType::VfxCreated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    JoinRoomResponse(JoinRoomResponseMsg),
    RoomSnapshot(Box<RoomSnapshotMsg>),
    PlayerList(PlayerListMsg),
    PlayerStateUpdate(PlayerStateUpdateMsg),
    PlayerHealthUpdate(PlayerHealthUpdateMsg),
    DamageNumber(DamageNumberMsg),
    PlayerDied(PlayerDiedMsg),
    PlayerRespawned(PlayerRespawnedMsg),
    ReviveBegin(ReviveBeginMsg),
    ReviveCancel(ReviveCancelMsg),
    ReviveReady(ReviveReadyMsg),
    ReviveComplete(ReviveCompleteMsg),
    StatusToggleResult(StatusToggleResultMsg),
    NpcUpdate(NpcUpdateMsg),
    NpcExplosion(NpcExplosionMsg),
    NpcDied(NpcDiedMsg),
    EnemyUpdate(EnemyUpdateMsg),
    EnemyDamaged(EnemyDamagedMsg),
    EnemyKilled(EnemyKilledMsg),
    ChestOpened(ChestOpenedMsg),
    ChestUpdate(ChestUpdateMsg),
    GroundItemSpawned(GroundItemSpawnedMsg),
    GroundItemRemoved(GroundItemRemovedMsg),
    ArtifactState(ArtifactStateMsg),
    BatteryState(BatteryStateMsg),
    ShopInventory(ShopInventoryMsg),
    PurchaseResult(PurchaseResultMsg),
    QuartermasterResult(QuartermasterResultMsg),
    ModeUpdate(ModeUpdateMsg),
    ExtractionComplete(ExtractionCompleteMsg),
    BulletFiredRelay(BulletFiredRelayMsg),
    HitscanHit(HitscanHitMsg),
    VfxRelay(VfxRelayMsg),
}

impl ServerMessage {
    pub fn message_type(&self) -> MessageType {
        use ServerMessage::*;
        match self {
            JoinRoomResponse(_) => MessageType::JoinRoomResponse,
            RoomSnapshot(_) => MessageType::RoomSnapshot,
            PlayerList(_) => MessageType::PlayerList,
            PlayerStateUpdate(_) => MessageType::PlayerStateUpdate,
            PlayerHealthUpdate(_) => MessageType::PlayerHealthUpdate,
            DamageNumber(_) => MessageType::DamageNumber,
            PlayerDied(_) => MessageType::PlayerDied,
            PlayerRespawned(_) => MessageType::PlayerRespawned,
            ReviveBegin(_) => MessageType::ReviveBegin,
            ReviveCancel(_) => MessageType::ReviveCancel,
            ReviveReady(_) => MessageType::ReviveReady,
            ReviveComplete(_) => MessageType::ReviveComplete,
            StatusToggleResult(_) => MessageType::StatusToggleResult,
            NpcUpdate(_) => MessageType::NpcUpdate,
            NpcExplosion(_) => MessageType::NpcExplosion,
            NpcDied(_) => MessageType::NpcDied,
            EnemyUpdate(_) => MessageType::EnemyUpdate,
            EnemyDamaged(_) => MessageType::EnemyDamaged,
            EnemyKilled(_) => MessageType::EnemyKilled,
            ChestOpened(_) => MessageType::ChestOpened,
            ChestUpdate(_) => MessageType::ChestUpdate,
            GroundItemSpawned(_) => MessageType::GroundItemSpawned,
            GroundItemRemoved(_) => MessageType::GroundItemRemoved,
            ArtifactState(_) => MessageType::ArtifactState,
            BatteryState(_) => MessageType::BatteryState,
            ShopInventory(_) => MessageType::ShopInventory,
            PurchaseResult(_) => MessageType::PurchaseResult,
            QuartermasterResult(_) => MessageType::QuartermasterResult,
            ModeUpdate(_) => MessageType::ModeUpdate,
            ExtractionComplete(_) => MessageType::ExtractionComplete,
            BulletFiredRelay(_) => MessageType::BulletFiredRelay,
            HitscanHit(_) => MessageType::HitscanHit,
            VfxRelay(_) => MessageType::VfxRelay,
        }
    }
}
