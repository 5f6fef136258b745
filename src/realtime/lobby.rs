// Live lobby: a single shared channel with usernames and message history
//
// Frames in both directions are JSON envelopes `{"event": ..., "data": ...}`.

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use super::{spawn_writer, WsSender};
use crate::utils::now_iso;

/// Lobby messages kept in memory; older ones are dropped first
const HISTORY_CAPACITY: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(event: &str, data: Value) -> Self {
        Self {
            event: event.to_string(),
            data,
        }
    }

    fn to_frame(&self) -> Option<WsMessage> {
        match serde_json::to_string(self) {
            Ok(json) => Some(WsMessage::Text(json)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode lobby event");
                None
            }
        }
    }
}

/// A message posted to the lobby
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LobbyMessage {
    pub user: String,
    pub message: String,
    pub timestamp: String,
}

struct LobbyClient {
    username: Option<String>,
    connected_at: String,
    sender: WsSender,
}

pub struct LobbyHub {
    clients: RwLock<HashMap<String, LobbyClient>>,
    history: RwLock<VecDeque<LobbyMessage>>,
}

impl Default for LobbyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LobbyHub {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            history: RwLock::new(VecDeque::with_capacity(HISTORY_CAPACITY)),
        }
    }

    /// Register a client and announce the new head count
    pub async fn connect(&self, conn_id: &str) -> mpsc::UnboundedReceiver<WsMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.write().await.insert(
            conn_id.to_string(),
            LobbyClient {
                username: None,
                connected_at: now_iso(),
                sender: tx,
            },
        );
        tracing::info!(conn_id = %conn_id, "Lobby client connected");
        self.broadcast_user_count().await;
        rx
    }

    pub async fn disconnect(&self, conn_id: &str) {
        let removed = self.clients.write().await.remove(conn_id);
        if let Some(client) = removed {
            tracing::info!(
                conn_id = %conn_id,
                connected_at = %client.connected_at,
                "Lobby client disconnected"
            );
            self.broadcast_user_count().await;
        }
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn history(&self) -> Vec<LobbyMessage> {
        self.history.read().await.iter().cloned().collect()
    }

    pub async fn broadcast(&self, envelope: &Envelope) {
        let Some(frame) = envelope.to_frame() else {
            return;
        };
        for client in self.clients.read().await.values() {
            let _ = client.sender.send(frame.clone());
        }
    }

    async fn send_to(&self, conn_id: &str, envelope: &Envelope) {
        let Some(frame) = envelope.to_frame() else {
            return;
        };
        if let Some(client) = self.clients.read().await.get(conn_id) {
            let _ = client.sender.send(frame);
        }
    }

    async fn broadcast_user_count(&self) {
        let count = self.client_count().await;
        self.broadcast(&Envelope::new("user_count", json!({ "count": count })))
            .await;
    }

    pub async fn set_username(&self, conn_id: &str, data: &Value) {
        let username = data
            .get("username")
            .and_then(Value::as_str)
            .unwrap_or("Anonymous")
            .to_string();

        if let Some(client) = self.clients.write().await.get_mut(conn_id) {
            client.username = Some(username.clone());
        }
        tracing::info!(conn_id = %conn_id, username = %username, "Lobby username set");

        self.broadcast(&Envelope::new("user_joined", json!({ "username": username })))
            .await;
    }

    pub async fn chat_message(&self, conn_id: &str, data: &Value) {
        let user = self
            .clients
            .read()
            .await
            .get(conn_id)
            .and_then(|c| c.username.clone())
            .unwrap_or_else(|| "Anonymous".to_string());

        let message = LobbyMessage {
            user,
            message: data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            timestamp: now_iso(),
        };
        {
            let mut history = self.history.write().await;
            if history.len() >= HISTORY_CAPACITY {
                history.pop_front();
            }
            history.push_back(message.clone());
        }

        match serde_json::to_value(&message) {
            Ok(value) => self.broadcast(&Envelope::new("chat_message", value)).await,
            Err(e) => tracing::error!(error = %e, "Failed to encode lobby message"),
        }
    }

    /// Dispatch one inbound text frame
    pub async fn handle_text(&self, conn_id: &str, text: &str) {
        let envelope = match serde_json::from_str::<Envelope>(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "Malformed lobby frame");
                self.send_to(
                    conn_id,
                    &Envelope::new("error", json!({ "message": "Invalid message format" })),
                )
                .await;
                return;
            }
        };

        match envelope.event.as_str() {
            "set_username" => self.set_username(conn_id, &envelope.data).await,
            "chat_message" => self.chat_message(conn_id, &envelope.data).await,
            other => tracing::debug!(conn_id = %conn_id, event = %other, "Ignoring unknown lobby event"),
        }
    }

    pub async fn ping_all(&self) {
        for client in self.clients.read().await.values() {
            let _ = client.sender.send(WsMessage::Ping(Vec::new()));
        }
    }

    pub async fn shutdown_all(&self) {
        let mut clients = self.clients.write().await;
        let count = clients.len();
        for client in clients.values() {
            let _ = client.sender.send(WsMessage::Close(None));
        }
        clients.clear();
        tracing::info!(count, "Closed all lobby connections");
    }

    /// Drive one lobby connection until the peer disconnects
    pub async fn serve(self: Arc<Self>, socket: WebSocket) {
        let conn_id = uuid::Uuid::new_v4().to_string();
        let rx = self.connect(&conn_id).await;
        let (sink, mut stream) = socket.split();
        let writer = spawn_writer(sink, rx, conn_id.clone());

        while let Some(result) = stream.next().await {
            match result {
                Ok(WsMessage::Text(text)) => self.handle_text(&conn_id, &text).await,
                Ok(WsMessage::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }

        self.disconnect(&conn_id).await;
        writer.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_of(message: WsMessage) -> Envelope {
        match message {
            WsMessage::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected text frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_broadcasts_user_count() {
        let hub = LobbyHub::new();
        let mut a = hub.connect("a").await;
        assert_eq!(envelope_of(a.try_recv().unwrap()).data["count"], 1);

        let _b = hub.connect("b").await;
        assert_eq!(envelope_of(a.try_recv().unwrap()).data["count"], 2);

        hub.disconnect("b").await;
        let update = envelope_of(a.try_recv().unwrap());
        assert_eq!(update.event, "user_count");
        assert_eq!(update.data["count"], 1);
    }

    #[tokio::test]
    async fn test_username_and_messages() {
        let hub = LobbyHub::new();
        let mut a = hub.connect("a").await;
        let _ = a.try_recv();

        hub.handle_text("a", r#"{"event":"chat_message","data":{"message":"first"}}"#)
            .await;
        let first = envelope_of(a.try_recv().unwrap());
        assert_eq!(first.data["user"], "Anonymous");

        hub.handle_text("a", r#"{"event":"set_username","data":{"username":"sara"}}"#)
            .await;
        let joined = envelope_of(a.try_recv().unwrap());
        assert_eq!(joined.event, "user_joined");
        assert_eq!(joined.data["username"], "sara");

        hub.handle_text("a", r#"{"event":"chat_message","data":{"message":"salam"}}"#)
            .await;
        let second = envelope_of(a.try_recv().unwrap());
        assert_eq!(second.event, "chat_message");
        assert_eq!(second.data["user"], "sara");
        assert_eq!(second.data["message"], "salam");

        let history = hub.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].message, "salam");
    }

    #[tokio::test]
    async fn test_default_username() {
        let hub = LobbyHub::new();
        let mut a = hub.connect("a").await;
        let _ = a.try_recv();

        hub.handle_text("a", r#"{"event":"set_username"}"#).await;
        assert_eq!(envelope_of(a.try_recv().unwrap()).data["username"], "Anonymous");
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_frames() {
        let hub = LobbyHub::new();
        let mut a = hub.connect("a").await;
        let mut b = hub.connect("b").await;
        while a.try_recv().is_ok() {}
        while b.try_recv().is_ok() {}

        hub.handle_text("a", "garbage").await;
        assert_eq!(envelope_of(a.try_recv().unwrap()).event, "error");
        assert!(b.try_recv().is_err());

        hub.handle_text("a", r#"{"event":"dance","data":{}}"#).await;
        assert!(a.try_recv().is_err());
        assert!(hub.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_history_is_capped() {
        let hub = LobbyHub::new();
        let _a = hub.connect("a").await;

        for i in 0..(HISTORY_CAPACITY + 5) {
            hub.chat_message("a", &json!({ "message": format!("m{}", i) }))
                .await;
        }

        let history = hub.history().await;
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history[0].message, "m5");
        assert_eq!(
            history[HISTORY_CAPACITY - 1].message,
            format!("m{}", HISTORY_CAPACITY + 4)
        );
    }
}
