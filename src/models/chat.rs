use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserLogin {
    pub email: String,
    pub password: String,
}

/// A chat message stored in a room log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub sender: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRoom {
    pub room_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Room as listed by the API, including its creation time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomInfo {
    pub room_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub email: String,
    pub username: String,
    pub logged_in_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogoutQuery {
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesQuery {
    #[serde(default = "default_message_limit")]
    pub limit: usize,
}

fn default_message_limit() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_timestamp_optional() {
        let message: Message =
            serde_json::from_value(json!({"sender": "sara", "content": "hi"})).unwrap();
        assert!(message.timestamp.is_none());
    }

    #[test]
    fn test_room_description_optional() {
        let room: ChatRoom =
            serde_json::from_value(json!({"room_id": "room1", "name": "General"})).unwrap();
        assert_eq!(room.description, None);
    }
}
