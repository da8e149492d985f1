use serde::{Deserialize, Serialize};

use super::messages::{ClientMessage, MessageType, ServerMessage};

/// Current protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Broadcast rate for room state in Hz.
pub const DEFAULT_BROADCAST_RATE_HZ: u32 = 10;

/// Simulation tick rate in Hz.
pub const DEFAULT_TICK_RATE_HZ: u32 = 30;

/// Maximum message payload size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024; // 64 KiB

#[derive(Debug)]
pub enum ProtocolError {
    EmptyMessage,
    UnknownMessageType(u8),
    PayloadTooLarge(usize),
    SerializeError(String),
    DeserializeError(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::UnknownMessageType(b) => write!(f, "unknown message type: 0x{b:02x}"),
            Self::PayloadTooLarge(size) => {
                write!(f, "payload too large: {size} bytes (max {MAX_MESSAGE_SIZE})")
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Encode a serializable payload with a 1-byte type prefix.
pub fn encode_message<T: Serialize>(
    msg_type: MessageType,
    payload: &T,
) -> Result<Vec<u8>, ProtocolError> {
    let payload_bytes =
        rmp_serde::to_vec(payload).map_err(|e| ProtocolError::SerializeError(e.to_string()))?;
    let total = 1 + payload_bytes.len();
    if total > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(total));
    }
    let mut buf = Vec::with_capacity(total);
    buf.push(msg_type as u8);
    buf.extend_from_slice(&payload_bytes);
    Ok(buf)
}

/// Encode a `ClientMessage` to wire format.
pub fn encode_client_message(msg: &ClientMessage) -> Result<Vec<u8>, ProtocolError> {
    use ClientMessage::*;
    let msg_type = msg.message_type();
    match msg {
        JoinRoom(m) => encode_message(msg_type, m),
        LeaveRoom(m) => encode_message(msg_type, m),
        PlayerInput(m) => encode_message(msg_type, m),
        BulletFired(m) => encode_message(msg_type, m),
        Weapon7Hitscan(m) | Weapon8Hitscan(m) => encode_message(msg_type, m),
        ExplosionDamage(m) => encode_message(msg_type, m),
        ProjectileHit(m) => encode_message(msg_type, m),
        DotTick(m) => encode_message(msg_type, m),
        EnemyDied(m) => encode_message(msg_type, m),
        ChestDamage(m) => encode_message(msg_type, m),
        BarrelDamage(m) => encode_message(msg_type, m),
        ArtifactDamage(m) => encode_message(msg_type, m),
        PvpDirectDamage(m) => encode_message(msg_type, m),
        NpcDamage(m) => encode_message(msg_type, m),
        NpcDot(m) => encode_message(msg_type, m),
        NpcSetState(m) => encode_message(msg_type, m),
        SceneChange(m) => encode_message(msg_type, m),
        SetLevelType(m) => encode_message(msg_type, m),
        ReadyTimerStart(m) | ReadyTimerCancel(m) | ExtractionTimerStart(m)
        | ExtractionTimerCancel(m) | ReviveAccept(m) | PlayerDeath(m) | PlayerRespawn(m)
        | UseHealthPotion(m) | ArtifactPickupRequest(m) | ArtifactDropRequest(m)
        | BatteryDropRequest(m) | BatteryPlaceRequest(m) | RequestShopInventory(m)
        | QuartermasterRequisition(m) => encode_message(msg_type, m),
        ReviveStartRequest(m) => encode_message(msg_type, m),
        InvincibilityToggle(m) | InvisibilityToggle(m) | SetEvilState(m) => {
            encode_message(msg_type, m)
        },
        ChestOpenRequest(m) => encode_message(msg_type, m),
        InventoryDropRequest(m) => encode_message(msg_type, m),
        InventoryPickupRequest(m) => encode_message(msg_type, m),
        BatteryPickupRequest(m) => encode_message(msg_type, m),
        PurchaseShopItem(m) => encode_message(msg_type, m),
        DebugSpawnHorde(m) => encode_message(msg_type, m),
        DebugSetValue(m) => encode_message(msg_type, m),
        VfxCreated(m) => encode_message(msg_type, m),
    }
}

/// Encode a `ServerMessage` to wire format.
pub fn encode_server_message(msg: &ServerMessage) -> Result<Vec<u8>, ProtocolError> {
    use ServerMessage::*;
    let msg_type = msg.message_type();
    match msg {
        JoinRoomResponse(m) => encode_message(msg_type, m),
        RoomSnapshot(m) => encode_message(msg_type, m.as_ref()),
        PlayerList(m) => encode_message(msg_type, m),
        PlayerStateUpdate(m) => encode_message(msg_type, m),
        PlayerHealthUpdate(m) => encode_message(msg_type, m),
        DamageNumber(m) => encode_message(msg_type, m),
        PlayerDied(m) => encode_message(msg_type, m),
        PlayerRespawned(m) => encode_message(msg_type, m),
        ReviveBegin(m) => encode_message(msg_type, m),
        ReviveCancel(m) => encode_message(msg_type, m),
        ReviveReady(m) => encode_message(msg_type, m),
        ReviveComplete(m) => encode_message(msg_type, m),
        StatusToggleResult(m) => encode_message(msg_type, m),
        NpcUpdate(m) => encode_message(msg_type, m),
        NpcExplosion(m) => encode_message(msg_type, m),
        NpcDied(m) => encode_message(msg_type, m),
        EnemyUpdate(m) => encode_message(msg_type, m),
        EnemyDamaged(m) => encode_message(msg_type, m),
        EnemyKilled(m) => encode_message(msg_type, m),
        ChestOpened(m) => encode_message(msg_type, m),
        ChestUpdate(m) => encode_message(msg_type, m),
        GroundItemSpawned(m) => encode_message(msg_type, m),
        GroundItemRemoved(m) => encode_message(msg_type, m),
        ArtifactState(m) => encode_message(msg_type, m),
        BatteryState(m) => encode_message(msg_type, m),
        ShopInventory(m) => encode_message(msg_type, m),
        PurchaseResult(m) => encode_message(msg_type, m),
        QuartermasterResult(m) => encode_message(msg_type, m),
        ModeUpdate(m) => encode_message(msg_type, m),
        ExtractionComplete(m) => encode_message(msg_type, m),
        BulletFiredRelay(m) => encode_message(msg_type, m),
        HitscanHit(m) => encode_message(msg_type, m),
        VfxRelay(m) => encode_message(msg_type, m),
    }
}

/// Extract the message type byte from raw wire data.
pub fn decode_message_type(data: &[u8]) -> Result<MessageType, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    MessageType::from_byte(data[0]).ok_or(ProtocolError::UnknownMessageType(data[0]))
}

/// Decode a MessagePack payload (bytes after the type prefix).
pub fn decode_payload<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    rmp_serde::from_slice(&data[1..]).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
}

/// Decode raw wire data into a `ClientMessage`.
pub fn decode_client_message(data: &[u8]) -> Result<ClientMessage, ProtocolError> {
    let msg_type = decode_message_type(data)?;
    Ok(match msg_type {
        MessageType::JoinRoom => ClientMessage::JoinRoom(decode_payload(data)?),
        MessageType::LeaveRoom => ClientMessage::LeaveRoom(decode_payload(data)?),
        MessageType::PlayerInput => ClientMessage::PlayerInput(decode_payload(data)?),
        MessageType::BulletFired => ClientMessage::BulletFired(decode_payload(data)?),
        MessageType::Weapon7Hitscan => ClientMessage::Weapon7Hitscan(decode_payload(data)?),
        MessageType::Weapon8Hitscan => ClientMessage::Weapon8Hitscan(decode_payload(data)?),
        MessageType::ExplosionDamage => ClientMessage::ExplosionDamage(decode_payload(data)?),
        MessageType::ProjectileHit => ClientMessage::ProjectileHit(decode_payload(data)?),
        MessageType::DotTick => ClientMessage::DotTick(decode_payload(data)?),
        MessageType::EnemyDied => ClientMessage::EnemyDied(decode_payload(data)?),
        MessageType::ChestDamage => ClientMessage::ChestDamage(decode_payload(data)?),
        MessageType::BarrelDamage => ClientMessage::BarrelDamage(decode_payload(data)?),
        MessageType::ArtifactDamage => ClientMessage::ArtifactDamage(decode_payload(data)?),
        MessageType::PvpDirectDamage => ClientMessage::PvpDirectDamage(decode_payload(data)?),
        MessageType::NpcDamage => ClientMessage::NpcDamage(decode_payload(data)?),
        MessageType::NpcDot => ClientMessage::NpcDot(decode_payload(data)?),
        MessageType::NpcSetState => ClientMessage::NpcSetState(decode_payload(data)?),
        MessageType::SceneChange => ClientMessage::SceneChange(decode_payload(data)?),
        MessageType::SetLevelType => ClientMessage::SetLevelType(decode_payload(data)?),
        MessageType::ReadyTimerStart => ClientMessage::ReadyTimerStart(decode_payload(data)?),
        MessageType::ReadyTimerCancel => ClientMessage::ReadyTimerCancel(decode_payload(data)?),
        MessageType::ExtractionTimerStart => {
            ClientMessage::ExtractionTimerStart(decode_payload(data)?)
        },
        MessageType::ExtractionTimerCancel => {
            ClientMessage::ExtractionTimerCancel(decode_payload(data)?)
        },
        MessageType::ReviveStartRequest => ClientMessage::ReviveStartRequest(decode_payload(data)?),
        MessageType::ReviveAccept => ClientMessage::ReviveAccept(decode_payload(data)?),
        MessageType::PlayerDeath => ClientMessage::PlayerDeath(decode_payload(data)?),
        MessageType::PlayerRespawn => ClientMessage::PlayerRespawn(decode_payload(data)?),
        MessageType::UseHealthPotion => ClientMessage::UseHealthPotion(decode_payload(data)?),
        MessageType::InvincibilityToggle => {
            ClientMessage::InvincibilityToggle(decode_payload(data)?)
        },
        MessageType::InvisibilityToggle => ClientMessage::InvisibilityToggle(decode_payload(data)?),
        MessageType::SetEvilState => ClientMessage::SetEvilState(decode_payload(data)?),
        MessageType::ChestOpenRequest => ClientMessage::ChestOpenRequest(decode_payload(data)?),
        MessageType::InventoryDropRequest => {
            ClientMessage::InventoryDropRequest(decode_payload(data)?)
        },
        MessageType::InventoryPickupRequest => {
            ClientMessage::InventoryPickupRequest(decode_payload(data)?)
        },
        MessageType::ArtifactPickupRequest => {
            ClientMessage::ArtifactPickupRequest(decode_payload(data)?)
        },
        MessageType::ArtifactDropRequest => {
            ClientMessage::ArtifactDropRequest(decode_payload(data)?)
        },
        MessageType::BatteryPickupRequest => {
            ClientMessage::BatteryPickupRequest(decode_payload(data)?)
        },
        MessageType::BatteryDropRequest => {
            ClientMessage::BatteryDropRequest(decode_payload(data)?)
        },
        MessageType::BatteryPlaceRequest => {
            ClientMessage::BatteryPlaceRequest(decode_payload(data)?)
        },
        MessageType::RequestShopInventory => {
            ClientMessage::RequestShopInventory(decode_payload(data)?)
        },
        MessageType::PurchaseShopItem => ClientMessage::PurchaseShopItem(decode_payload(data)?),
        MessageType::QuartermasterRequisition => {
            ClientMessage::QuartermasterRequisition(decode_payload(data)?)
        },
        MessageType::DebugSpawnHorde => ClientMessage::DebugSpawnHorde(decode_payload(data)?),
        MessageType::DebugSetValue => ClientMessage::DebugSetValue(decode_payload(data)?),
        MessageType::VfxCreated => ClientMessage::VfxCreated(decode_payload(data)?),
        _ => return Err(ProtocolError::UnknownMessageType(data[0])),
    })
}

/// Decode raw wire data into a `ServerMessage`.
pub fn decode_server_message(data: &[u8]) -> Result<ServerMessage, ProtocolError> {
    let msg_type = decode_message_type(data)?;
    Ok(match msg_type {
        MessageType::JoinRoomResponse => ServerMessage::JoinRoomResponse(decode_payload(data)?),
        MessageType::RoomSnapshot => ServerMessage::RoomSnapshot(Box::new(decode_payload(data)?)),
        MessageType::PlayerList => ServerMessage::PlayerList(decode_payload(data)?),
        MessageType::PlayerStateUpdate => ServerMessage::PlayerStateUpdate(decode_payload(data)?),
        MessageType::PlayerHealthUpdate => ServerMessage::PlayerHealthUpdate(decode_payload(data)?),
        MessageType::DamageNumber => ServerMessage::DamageNumber(decode_payload(data)?),
        MessageType::PlayerDied => ServerMessage::PlayerDied(decode_payload(data)?),
        MessageType::PlayerRespawned => ServerMessage::PlayerRespawned(decode_payload(data)?),
        MessageType::ReviveBegin => ServerMessage::ReviveBegin(decode_payload(data)?),
        MessageType::ReviveCancel => ServerMessage::ReviveCancel(decode_payload(data)?),
        MessageType::ReviveReady => ServerMessage::ReviveReady(decode_payload(data)?),
        MessageType::ReviveComplete => ServerMessage::ReviveComplete(decode_payload(data)?),
        MessageType::StatusToggleResult => ServerMessage::StatusToggleResult(decode_payload(data)?),
        MessageType::NpcUpdate => ServerMessage::NpcUpdate(decode_payload(data)?),
        MessageType::NpcExplosion => ServerMessage::NpcExplosion(decode_payload(data)?),
        MessageType::NpcDied => ServerMessage::NpcDied(decode_payload(data)?),
        MessageType::EnemyUpdate => ServerMessage::EnemyUpdate(decode_payload(data)?),
        MessageType::EnemyDamaged => ServerMessage::EnemyDamaged(decode_payload(data)?),
        MessageType::EnemyKilled => ServerMessage::EnemyKilled(decode_payload(data)?),
        MessageType::ChestOpened => ServerMessage::ChestOpened(decode_payload(data)?),
        MessageType::ChestUpdate => ServerMessage::ChestUpdate(decode_payload(data)?),
        MessageType::GroundItemSpawned => ServerMessage::GroundItemSpawned(decode_payload(data)?),
        MessageType::GroundItemRemoved => ServerMessage::GroundItemRemoved(decode_payload(data)?),
        MessageType::ArtifactState => ServerMessage::ArtifactState(decode_payload(data)?),
        MessageType::BatteryState => ServerMessage::BatteryState(decode_payload(data)?),
        MessageType::ShopInventory => ServerMessage::ShopInventory(decode_payload(data)?),
        MessageType::PurchaseResult => ServerMessage::PurchaseResult(decode_payload(data)?),
        MessageType::QuartermasterResult => {
            ServerMessage::QuartermasterResult(decode_payload(data)?)
        },
        MessageType::ModeUpdate => ServerMessage::ModeUpdate(decode_payload(data)?),
        MessageType::ExtractionComplete => ServerMessage::ExtractionComplete(decode_payload(data)?),
        MessageType::BulletFiredRelay => ServerMessage::BulletFiredRelay(decode_payload(data)?),
        MessageType::HitscanHit => ServerMessage::HitscanHit(decode_payload(data)?),
        MessageType::VfxRelay => ServerMessage::VfxRelay(decode_payload(data)?),
        _ => return Err(ProtocolError::UnknownMessageType(data[0])),
    })
}

#[cfg(test)]
mod tests {
    use super::super::messages::*;
    use super::*;
    use crate::math::Vec2;
    use crate::npc::{NpcKind, NpcSnapshot, NpcState, PrisonerState};
    use crate::room::{LevelType, Scene};

    #[test]
    fn roundtrip_join_room() {
        let msg = ClientMessage::JoinRoom(JoinRoomMsg {
            room_id: "squad-1".to_string(),
            player_name: "Alice".to_string(),
            protocol_version: PROTOCOL_VERSION,
        });
        let encoded = encode_client_message(&msg).unwrap();
        let decoded = decode_client_message(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn roundtrip_player_input() {
        let msg = ClientMessage::PlayerInput(PlayerInputMsg {
            seq: 1042,
            move_x: -0.7,
            move_y: 0.7,
            aim_angle: 1.2,
            dash: true,
            dt: 1.0 / 60.0,
            claimed_pos: Vec2::new(12.5, -3.0),
        });
        let encoded = encode_client_message(&msg).unwrap();
        let decoded = decode_client_message(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn roundtrip_bullet_fired() {
        let msg = ClientMessage::BulletFired(BulletFiredMsg {
            bullet_id: 9,
            pos: Vec2::new(10.0, -4.0),
            velocity: Vec2::new(300.0, 0.0),
            damage: 12.0,
            radius: 4.0,
            life: 1.5,
            weapon: 2,
            is_cone: false,
            ignore_enemies: false,
            no_damage: false,
        });
        let encoded = encode_client_message(&msg).unwrap();
        let decoded = decode_client_message(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn hitscan_types_stay_distinct() {
        let payload = HitscanMsg {
            origin: Vec2::ZERO,
            angle: 0.5,
            enemy_hits: vec![3, 4],
            player_hits: vec![],
        };
        let w7 = encode_client_message(&ClientMessage::Weapon7Hitscan(payload.clone())).unwrap();
        let w8 = encode_client_message(&ClientMessage::Weapon8Hitscan(payload)).unwrap();
        assert_eq!(w7[0], MessageType::Weapon7Hitscan as u8);
        assert_eq!(w8[0], MessageType::Weapon8Hitscan as u8);
        assert!(matches!(
            decode_client_message(&w8).unwrap(),
            ClientMessage::Weapon8Hitscan(_)
        ));
    }

    #[test]
    fn roundtrip_npc_set_state() {
        let msg = ClientMessage::NpcSetState(NpcSetStateMsg {
            npc_id: 2,
            state: NpcState::Prisoner(PrisonerState::Follow),
        });
        let encoded = encode_client_message(&msg).unwrap();
        let decoded = decode_client_message(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn roundtrip_empty_payload_intents() {
        for msg in [
            ClientMessage::ReviveAccept(EmptyMsg {}),
            ClientMessage::UseHealthPotion(EmptyMsg {}),
            ClientMessage::ArtifactPickupRequest(EmptyMsg {}),
            ClientMessage::QuartermasterRequisition(EmptyMsg {}),
        ] {
            let encoded = encode_client_message(&msg).unwrap();
            let decoded = decode_client_message(&encoded).unwrap();
            assert_eq!(msg, decoded);
        }
    }

    #[test]
    fn roundtrip_room_snapshot() {
        let msg = ServerMessage::RoomSnapshot(Box::new(RoomSnapshotMsg {
            scene: Scene::Level,
            level_type: LevelType::Ruins,
            world_seed: 12345,
            players: vec![PlayerSnapshot {
                id: 7,
                pos: Vec2::new(1.0, 2.0),
                health: 80.0,
                health_max: 100.0,
                is_evil: false,
                invisible: false,
                downed: false,
            }],
            npcs: vec![NpcSnapshot {
                id: 1,
                kind: NpcKind::Prisoner,
                pos: Vec2::ZERO,
                state: NpcState::Prisoner(PrisonerState::Idle),
                alive: true,
                health: None,
                bark_line: 0,
            }],
            enemies: vec![],
            chests: vec![],
            ground_items: vec![],
            artifact: None,
            batteries: vec![],
            ready_timer_remaining: None,
            extraction_timer_remaining: Some(42.0),
        }));
        let encoded = encode_server_message(&msg).unwrap();
        let decoded = decode_server_message(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn roundtrip_player_state_update() {
        let msg = ServerMessage::PlayerStateUpdate(PlayerStateUpdateMsg {
            updates: vec![PlayerPosUpdate {
                id: 3,
                pos: Vec2::new(5.0, 6.0),
                last_input_seq: 991,
                needs_correction: true,
                forced: Some(ForcedReason::Knockback),
            }],
        });
        let encoded = encode_server_message(&msg).unwrap();
        let decoded = decode_server_message(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn roundtrip_revive_flow_messages() {
        for msg in [
            ServerMessage::ReviveBegin(ReviveBeginMsg {
                target: 1,
                by: 2,
                duration_secs: 4.0,
            }),
            ServerMessage::ReviveReady(ReviveReadyMsg {
                target: 1,
                from: 2,
                window_secs: 10.0,
            }),
            ServerMessage::ReviveComplete(ReviveCompleteMsg {
                target: 1,
                health: 30.0,
            }),
            ServerMessage::ReviveCancel(ReviveCancelMsg { target: 1 }),
        ] {
            let encoded = encode_server_message(&msg).unwrap();
            let decoded = decode_server_message(&encoded).unwrap();
            assert_eq!(msg, decoded);
        }
    }

    #[test]
    fn decode_empty_message_fails() {
        assert!(decode_message_type(&[]).is_err());
    }

    #[test]
    fn decode_unknown_type_fails() {
        assert!(decode_message_type(&[0xFF]).is_err());
    }

    #[test]
    fn decode_client_msg_with_server_type_fails() {
        let msg = ServerMessage::PlayerHealthUpdate(PlayerHealthUpdateMsg {
            id: 1,
            health: 50.0,
            health_max: 100.0,
        });
        let encoded = encode_server_message(&msg).unwrap();
        assert!(decode_client_message(&encoded).is_err());
    }

    #[test]
    fn decode_server_msg_with_client_type_fails() {
        let msg = ClientMessage::PlayerDeath(EmptyMsg {});
        let encoded = encode_client_message(&msg).unwrap();
        assert!(decode_server_message(&encoded).is_err());
    }

    #[test]
    fn message_type_byte_prefix() {
        let msg = ClientMessage::JoinRoom(JoinRoomMsg {
            room_id: "r".to_string(),
            player_name: "n".to_string(),
            protocol_version: PROTOCOL_VERSION,
        });
        let encoded = encode_client_message(&msg).unwrap();
        assert_eq!(encoded[0], MessageType::JoinRoom as u8);
    }

    #[test]
    fn truncated_payload_fails() {
        let msg = ClientMessage::ChestDamage(ChestDamageMsg {
            chest_id: "chest-gold-3".to_string(),
            damage: 25.0,
        });
        let encoded = encode_client_message(&msg).unwrap();
        let truncated = &encoded[..encoded.len() / 2];
        assert!(decode_client_message(truncated).is_err());
    }

    #[test]
    fn payload_too_large_rejected() {
        let msg = ClientMessage::DebugSetValue(DebugSetValueMsg {
            key: "x".repeat(MAX_MESSAGE_SIZE + 1),
            value: 0.0,
        });
        let result = encode_client_message(&msg);
        assert!(matches!(result, Err(ProtocolError::PayloadTooLarge(_))));
    }

    #[test]
    fn protocol_error_display() {
        assert_eq!(format!("{}", ProtocolError::EmptyMessage), "empty message");
        assert_eq!(
            format!("{}", ProtocolError::UnknownMessageType(0xFF)),
            "unknown message type: 0xff"
        );
        assert!(format!("{}", ProtocolError::PayloadTooLarge(99999)).contains("99999"));
    }
}
