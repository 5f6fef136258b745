// Health chat accounts, sessions, rooms and message logs

use anyhow::{anyhow, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::error::ApiError;
use crate::models::chat::{ChatRoom, Message, RoomInfo, Session, User};
use crate::utils::now_iso;

struct Account {
    username: String,
    password_hash: String,
}

#[derive(Default)]
struct Rooms {
    /// Rooms in creation order
    list: Vec<RoomInfo>,
    messages: HashMap<String, Vec<Message>>,
}

/// Chat state, lost on restart
pub struct ChatStore {
    users: DashMap<String, Account>,
    sessions: DashMap<String, Session>,
    session_counter: AtomicU64,
    rooms: RwLock<Rooms>,
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            sessions: DashMap::new(),
            session_counter: AtomicU64::new(0),
            rooms: RwLock::new(Rooms::default()),
        }
    }

    /// Register a new account keyed by email
    pub fn register(&self, user: User) -> Result<String, ApiError> {
        match self.users.entry(user.email) {
            Entry::Occupied(_) => Err(ApiError::BadRequest("Email already registered".to_string())),
            Entry::Vacant(slot) => {
                let password_hash = hash_password(&user.password)?;
                slot.insert(Account {
                    username: user.username.clone(),
                    password_hash,
                });
                tracing::info!(username = %user.username, "Chat user registered");
                Ok(user.username)
            }
        }
    }

    /// Check credentials and open a session, returning `(session_id, username)`
    pub fn login(&self, email: &str, password: &str) -> Result<(String, String), ApiError> {
        let username = {
            let account = self
                .users
                .get(email)
                .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
            if !verify_password(password, &account.password_hash)? {
                return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
            }
            account.username.clone()
        };

        let n = self.session_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let session_id = format!("session_{}", n);
        self.sessions.insert(
            session_id.clone(),
            Session {
                email: email.to_string(),
                username: username.clone(),
                logged_in_at: now_iso(),
            },
        );

        tracing::debug!(session_id = %session_id, "Session opened");
        Ok((session_id, username))
    }

    /// Close a session, returning the username it belonged to
    pub fn logout(&self, session_id: &str) -> Result<String, ApiError> {
        self.sessions
            .remove(session_id)
            .map(|(_, session)| session.username)
            .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn create_room(&self, room: ChatRoom) -> Result<RoomInfo, ApiError> {
        let mut rooms = self.write_rooms()?;
        if rooms.list.iter().any(|r| r.room_id == room.room_id) {
            return Err(ApiError::BadRequest("Room ID already exists".to_string()));
        }

        let info = RoomInfo {
            room_id: room.room_id,
            name: room.name,
            description: room.description,
            created_at: now_iso(),
        };
        rooms.messages.insert(info.room_id.clone(), Vec::new());
        rooms.list.push(info.clone());
        Ok(info)
    }

    pub fn list_rooms(&self) -> Result<Vec<RoomInfo>, ApiError> {
        Ok(self.read_rooms()?.list.clone())
    }

    pub fn get_room(&self, room_id: &str) -> Result<RoomInfo, ApiError> {
        self.read_rooms()?
            .list
            .iter()
            .find(|r| r.room_id == room_id)
            .cloned()
            .ok_or_else(room_not_found)
    }

    /// Most recent `limit` messages of a room, oldest first
    pub fn recent_messages(&self, room_id: &str, limit: usize) -> Result<Vec<Message>, ApiError> {
        let rooms = self.read_rooms()?;
        if !rooms.list.iter().any(|r| r.room_id == room_id) {
            return Err(room_not_found());
        }
        let log = rooms.messages.get(room_id).map(Vec::as_slice).unwrap_or(&[]);
        let start = log.len().saturating_sub(limit);
        Ok(log[start..].to_vec())
    }

    /// Append a message to an existing room, stamping it when no timestamp was given
    pub fn post_message(&self, room_id: &str, mut message: Message) -> Result<(), ApiError> {
        let mut rooms = self.write_rooms()?;
        if !rooms.list.iter().any(|r| r.room_id == room_id) {
            return Err(room_not_found());
        }
        if message.timestamp.as_deref().map_or(true, str::is_empty) {
            message.timestamp = Some(now_iso());
        }
        rooms.messages.entry(room_id.to_string()).or_default().push(message);
        Ok(())
    }

    /// Log a message received over a room socket; the room need not be registered
    pub fn record_socket_message(&self, room_id: &str, message: Message) -> Result<(), ApiError> {
        self.write_rooms()?
            .messages
            .entry(room_id.to_string())
            .or_default()
            .push(message);
        Ok(())
    }

    fn read_rooms(&self) -> Result<std::sync::RwLockReadGuard<'_, Rooms>, ApiError> {
        self.rooms
            .read()
            .map_err(|_| ApiError::Internal(anyhow!("chat room lock poisoned")))
    }

    fn write_rooms(&self) -> Result<std::sync::RwLockWriteGuard<'_, Rooms>, ApiError> {
        self.rooms
            .write()
            .map_err(|_| ApiError::Internal(anyhow!("chat room lock poisoned")))
    }
}

fn room_not_found() -> ApiError {
    ApiError::NotFound("Room not found".to_string())
}

/// Argon2id hash in PHC string format
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("Stored hash is invalid: {}", e))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("Password verification failed: {}", e)),
    }
}
