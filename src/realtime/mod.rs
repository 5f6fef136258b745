// WebSocket fan-out for chat rooms and the live lobby

pub mod lobby;
pub mod rooms;

use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::SinkExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub use lobby::LobbyHub;
pub use rooms::RoomHub;

/// Outbound half of a connection; the socket's writer task drains it
pub type WsSender = mpsc::UnboundedSender<Message>;

const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Forward queued frames to the socket until either side closes
pub(crate) fn spawn_writer(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
    conn_id: String,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    })
}

/// Periodically ping every socket so dead peers are noticed
pub fn start_heartbeat(rooms: Arc<RoomHub>, lobby: Arc<LobbyHub>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let room_connections = rooms.connection_count().await;
            let lobby_connections = lobby.client_count().await;
            tracing::debug!(room_connections, lobby_connections, "WebSocket heartbeat ping");
            rooms.ping_all().await;
            lobby.ping_all().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_heartbeat_pings_room_and_lobby_sockets() {
        let rooms = Arc::new(RoomHub::new());
        let lobby = Arc::new(LobbyHub::new());
        let mut member = rooms.join("r1", "a").await;
        let mut client = lobby.connect("b").await;
        // Drop the connect-time user_count frame
        let _ = client.try_recv();

        let heartbeat = start_heartbeat(rooms.clone(), lobby.clone());

        let ping = tokio::time::timeout(Duration::from_secs(5), member.recv())
            .await
            .unwrap();
        assert!(matches!(ping, Some(Message::Ping(_))));
        let ping = tokio::time::timeout(Duration::from_secs(5), client.recv())
            .await
            .unwrap();
        assert!(matches!(ping, Some(Message::Ping(_))));

        heartbeat.abort();
    }
}
