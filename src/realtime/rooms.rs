// Per-room WebSocket broadcast for the health chat

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::StreamExt;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use super::{spawn_writer, WsSender};
use crate::models::chat::Message;
use crate::store::ChatStore;
use crate::utils::now_iso;

/// Inbound frame; either field may be omitted
#[derive(Debug, Deserialize)]
struct InboundMessage {
    #[serde(default = "anonymous")]
    sender: String,
    #[serde(default)]
    content: String,
}

fn anonymous() -> String {
    "Anonymous".to_string()
}

/// Connections grouped by room id
pub struct RoomHub {
    rooms: RwLock<HashMap<String, HashMap<String, WsSender>>>,
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomHub {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Add a connection to a room and return its outbound queue
    pub async fn join(&self, room_id: &str, conn_id: &str) -> mpsc::UnboundedReceiver<WsMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.rooms
            .write()
            .await
            .entry(room_id.to_string())
            .or_default()
            .insert(conn_id.to_string(), tx);
        rx
    }

    pub async fn leave(&self, room_id: &str, conn_id: &str) {
        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(room_id) {
            members.remove(conn_id);
            if members.is_empty() {
                rooms.remove(room_id);
            }
        }
    }

    /// Send a frame to every member of a room
    pub async fn broadcast(&self, room_id: &str, message: WsMessage) {
        let rooms = self.rooms.read().await;
        if let Some(members) = rooms.get(room_id) {
            for sender in members.values() {
                let _ = sender.send(message.clone());
            }
        }
    }

    /// Send a frame to one member only
    pub async fn send_to(&self, room_id: &str, conn_id: &str, message: WsMessage) {
        let rooms = self.rooms.read().await;
        if let Some(sender) = rooms.get(room_id).and_then(|m| m.get(conn_id)) {
            let _ = sender.send(message);
        }
    }

    pub async fn member_count(&self, room_id: &str) -> usize {
        self.rooms.read().await.get(room_id).map_or(0, HashMap::len)
    }

    pub async fn connection_count(&self) -> usize {
        self.rooms.read().await.values().map(HashMap::len).sum()
    }

    pub async fn ping_all(&self) {
        let rooms = self.rooms.read().await;
        for sender in rooms.values().flat_map(HashMap::values) {
            let _ = sender.send(WsMessage::Ping(Vec::new()));
        }
    }

    /// Close every connection, used on shutdown
    pub async fn shutdown_all(&self) {
        let mut rooms = self.rooms.write().await;
        let count: usize = rooms.values().map(HashMap::len).sum();
        for sender in rooms.values().flat_map(HashMap::values) {
            let _ = sender.send(WsMessage::Close(None));
        }
        rooms.clear();
        tracing::info!(count, "Closed all chat room connections");
    }

    /// Parse, store and fan out one text frame from a room member
    pub async fn handle_text(&self, store: &ChatStore, room_id: &str, conn_id: &str, text: &str) {
        let inbound = match serde_json::from_str::<InboundMessage>(text) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::error!(room_id = %room_id, error = %e, "Invalid JSON received: {}", text);
                let reply = serde_json::json!({"error": "Invalid message format"});
                self.send_to(room_id, conn_id, WsMessage::Text(reply.to_string()))
                    .await;
                return;
            }
        };

        let message = Message {
            sender: inbound.sender,
            content: inbound.content,
            timestamp: Some(now_iso()),
        };

        if let Err(e) = store.record_socket_message(room_id, message.clone()) {
            tracing::error!(room_id = %room_id, error = %e, "Failed to store chat message");
        }

        match serde_json::to_string(&message) {
            Ok(json) => self.broadcast(room_id, WsMessage::Text(json)).await,
            Err(e) => tracing::error!(error = %e, "Failed to encode chat message"),
        }
    }

    /// Drive one room connection until the peer disconnects
    pub async fn serve(self: Arc<Self>, socket: WebSocket, store: Arc<ChatStore>, room_id: String) {
        let conn_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(conn_id = %conn_id, room_id = %room_id, "Chat socket connected");

        let rx = self.join(&room_id, &conn_id).await;
        let (sink, mut stream) = socket.split();
        let writer = spawn_writer(sink, rx, conn_id.clone());

        while let Some(result) = stream.next().await {
            match result {
                Ok(WsMessage::Text(text)) => {
                    self.handle_text(&store, &room_id, &conn_id, &text).await;
                }
                Ok(WsMessage::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }

        writer.abort();
        self.leave_and_notify(&room_id, &conn_id).await;
    }

    /// Drop a member and tell the rest of the room
    pub async fn leave_and_notify(&self, room_id: &str, conn_id: &str) {
        self.leave(room_id, conn_id).await;

        let farewell = Message {
            sender: "system".to_string(),
            content: "A user has left the chat".to_string(),
            timestamp: Some(now_iso()),
        };
        if let Ok(json) = serde_json::to_string(&farewell) {
            self.broadcast(room_id, WsMessage::Text(json)).await;
        }
        tracing::info!(conn_id = %conn_id, room_id = %room_id, "Chat socket disconnected");
    }
}
