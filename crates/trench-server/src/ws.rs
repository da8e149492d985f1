use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::ConnectInfo;
use axum::extract::FromRequest;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use trench_core::net::messages::{ClientMessage, JoinRoomMsg, JoinRoomResponseMsg, ServerMessage};
use trench_core::net::protocol::{
    MAX_MESSAGE_SIZE, PROTOCOL_VERSION, decode_client_message, encode_server_message,
};
use trench_core::player::PlayerId;

use crate::state::{AppState, ConnectionGuard, IpConnectionGuard};

pub async fn ws_handler(
    State(state): State<AppState>,
    request: axum::extract::Request,
) -> Result<axum::response::Response, StatusCode> {
    let max_ws = state.config.limits.max_ws_connections;
    let current = state.ws_connection_count.load(Ordering::Relaxed);
    if current >= max_ws {
        tracing::warn!(current, max = max_ws, "WS connection limit reached");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    // Per-IP connection limit
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
        .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
    let max_per_ip = state.config.limits.max_ws_per_ip;
    let ip_guard = IpConnectionGuard::try_acquire(ip, Arc::clone(&state.ws_per_ip), max_per_ip);
    let Some(ip_guard) = ip_guard else {
        tracing::warn!(%ip, max_per_ip, "Per-IP WS connection limit reached");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    };

    // Perform WebSocket upgrade manually
    let ws = WebSocketUpgrade::from_request(request, &state)
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state, ip_guard))
        .into_response())
}

async fn handle_socket(socket: WebSocket, state: AppState, _ip_guard: IpConnectionGuard) {
    let _guard = ConnectionGuard::new(Arc::clone(&state.ws_connection_count));
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Wait for the first message: must be a JoinRoom.
    let first_msg = match ws_receiver.next().await {
        Some(Ok(Message::Binary(data))) => data,
        _ => return,
    };

    let Ok(client_msg) = decode_client_message(&first_msg) else {
        return;
    };

    let join = match client_msg {
        ClientMessage::JoinRoom(j) => j,
        _ => return,
    };

    // Validate protocol version (0 means the client did not report one)
    if join.protocol_version != 0 && join.protocol_version != PROTOCOL_VERSION {
        send_join_error(
            &mut ws_sender,
            &format!(
                "Protocol version mismatch: client={}, server={}",
                join.protocol_version, PROTOCOL_VERSION
            ),
        )
        .await;
        return;
    }

    let player_id = match attempt_join(&join, &state, &mut ws_sender).await {
        Some((player_id, rx)) => {
            spawn_writer(ws_sender, rx);
            player_id
        },
        None => return,
    };

    // Read loop: relay incoming intents to the room task
    read_loop(&mut ws_receiver, &state, player_id).await;

    // Player disconnected — clean up
    let mut registry = state.registry.write().await;
    registry.leave(player_id);
    drop(registry);

    tracing::info!(player = player_id, "Player disconnected");
}

/// Validate the join request and register the player with the room registry.
/// Sends the failure response itself; the room task sends the success one.
async fn attempt_join(
    join: &JoinRoomMsg,
    state: &AppState,
    ws_sender: &mut futures::stream::SplitSink<WebSocket, Message>,
) -> Option<(PlayerId, mpsc::Receiver<Bytes>)> {
    let name = join.player_name.trim().to_string();
    if name.is_empty() || name.len() > 32 || name.chars().any(|c| c.is_control()) {
        send_join_error(ws_sender, "Invalid player name").await;
        return None;
    }

    let (tx, rx) = mpsc::channel::<Bytes>(state.config.limits.player_message_buffer);
    let mut registry = state.registry.write().await;
    match registry.join_or_create(&join.room_id, name, tx) {
        Ok(player_id) => {
            drop(registry);
            Some((player_id, rx))
        },
        Err(err) => {
            drop(registry);
            send_join_error(ws_sender, &err).await;
            None
        },
    }
}

async fn send_join_error(
    ws_sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    error: &str,
) {
    let msg = ServerMessage::JoinRoomResponse(JoinRoomResponseMsg {
        success: false,
        player_id: None,
        room_id: None,
        scene: None,
        error: Some(error.to_string()),
    });
    if let Ok(response) = encode_server_message(&msg)
        && let Err(e) = ws_sender.send(Message::Binary(response.into())).await
    {
        tracing::warn!(error = %e, "Failed to send join error response");
    }
}

fn spawn_writer(
    mut ws_sender: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Bytes>,
) {
    tokio::spawn(async move {
        while let Some(data) = rx.recv().await {
            if ws_sender.send(Message::Binary(data)).await.is_err() {
                break;
            }
        }
    });
}

/// Per-connection rate limiter (token bucket).
struct RateLimiter {
    tokens: f64,
    last_refill: tokio::time::Instant,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
}

impl RateLimiter {
    fn new(max_tokens: f64, refill_rate: f64) -> Self {
        Self {
            tokens: max_tokens,
            last_refill: tokio::time::Instant::now(),
            max_tokens,
            refill_rate,
        }
    }

    /// Returns true if the message is allowed; false if rate-limited.
    fn allow(&mut self) -> bool {
        let now = tokio::time::Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

async fn read_loop(
    ws_receiver: &mut futures::stream::SplitStream<WebSocket>,
    state: &AppState,
    player_id: PlayerId,
) {
    let rate = state.config.limits.ws_rate_limit_per_sec;
    let mut rate_limiter = RateLimiter::new(rate, rate);

    while let Some(Ok(msg)) = ws_receiver.next().await {
        let data = match msg {
            Message::Binary(d) => d,
            Message::Close(_) => break,
            _ => continue,
        };

        // Rate limit: drop messages that exceed per-connection rate
        if !rate_limiter.allow() {
            tracing::warn!(player = player_id, "Rate limited");
            continue;
        }

        if data.is_empty() || data.len() > MAX_MESSAGE_SIZE {
            continue;
        }

        // Server-only message types fail this decode and are dropped.
        let msg = match decode_client_message(&data) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(player = player_id, error = %e, "Dropping undecodable frame");
                continue;
            },
        };

        match msg {
            ClientMessage::JoinRoom(_) => {
                tracing::debug!(player = player_id, "Duplicate JoinRoom ignored");
            },
            ClientMessage::LeaveRoom(_) => break,
            other => {
                let registry = state.registry.read().await;
                if !registry.route_intent(player_id, other) {
                    // Room task is gone; nothing left to talk to.
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rate_limiter_caps_burst() {
        let mut limiter = RateLimiter::new(3.0, 3.0);
        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(!limiter.allow());
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limiter_refills_over_time() {
        let mut limiter = RateLimiter::new(1.0, 1.0);
        assert!(limiter.allow());
        assert!(!limiter.allow());
        tokio::time::advance(std::time::Duration::from_secs(2)).await;
        assert!(limiter.allow());
    }
}
