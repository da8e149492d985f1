use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use trench_core::room::is_valid_room_id;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub rooms: usize,
    pub players: usize,
    pub timestamp: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let registry = state.registry.read().await;
    Json(StatusResponse {
        rooms: registry.room_count(),
        players: registry.player_count(),
        timestamp: trench_core::time::timestamp_now(),
    })
}

#[derive(Debug, Serialize)]
pub struct RoomInfo {
    pub room_id: String,
    pub players: usize,
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomInfo>, AppError> {
    if !is_valid_room_id(&room_id) {
        return Err(AppError::BadRequest("Invalid room id".to_string()));
    }
    let registry = state.registry.read().await;
    let players = registry
        .room_player_count(&room_id)
        .ok_or_else(|| AppError::NotFound(format!("Room {room_id} not found")))?;
    Ok(Json(RoomInfo { room_id, players }))
}
