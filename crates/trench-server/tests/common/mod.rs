use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use trench_core::net::messages::{ClientMessage, JoinRoomMsg, JoinRoomResponseMsg, ServerMessage};
use trench_core::net::protocol::{
    PROTOCOL_VERSION, decode_server_message, encode_client_message,
};

use trench_server::build_app;
use trench_server::config::ServerConfig;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    pub addr: SocketAddr,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = build_app(config);

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _shutdown: handle,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

pub async fn ws_connect(url: &str) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    stream
}

pub async fn ws_send_client_msg(stream: &mut WsStream, msg: &ClientMessage) {
    let encoded = encode_client_message(msg).unwrap();
    stream.send(Message::Binary(encoded.into())).await.unwrap();
}

/// Read the next binary frame and decode it, panicking on timeout.
pub async fn ws_read_server_msg(stream: &mut WsStream) -> ServerMessage {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for server message")
            .expect("connection closed")
            .expect("websocket error");
        if let Message::Binary(data) = msg {
            return decode_server_message(&data).expect("server frame should decode");
        }
    }
}

/// Read server messages, skipping the periodic state broadcasts, until one
/// matches the predicate or the deadline passes.
pub async fn ws_read_until<F>(stream: &mut WsStream, mut pred: F) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        let msg = ws_read_server_msg(stream).await;
        if pred(&msg) {
            return msg;
        }
    }
    panic!("deadline passed without a matching server message");
}

/// Send a JoinRoom for `room_id` and return the JoinRoomResponse.
pub async fn ws_join(stream: &mut WsStream, room_id: &str, name: &str) -> JoinRoomResponseMsg {
    ws_join_with_version(stream, room_id, name, PROTOCOL_VERSION).await
}

pub async fn ws_join_with_version(
    stream: &mut WsStream,
    room_id: &str,
    name: &str,
    protocol_version: u8,
) -> JoinRoomResponseMsg {
    let msg = ClientMessage::JoinRoom(JoinRoomMsg {
        room_id: room_id.to_string(),
        player_name: name.to_string(),
        protocol_version,
    });
    ws_send_client_msg(stream, &msg).await;

    match ws_read_server_msg(stream).await {
        ServerMessage::JoinRoomResponse(resp) => resp,
        other => panic!("Expected JoinRoomResponse, got: {other:?}"),
    }
}
