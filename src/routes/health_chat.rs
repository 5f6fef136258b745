// Health chat: accounts, rooms, message logs and room sockets

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    middleware::from_fn_with_state,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use super::AppState;
use crate::error::Result;
use crate::middleware::socket_origin_guard;
use crate::models::chat::{ChatRoom, LogoutQuery, Message, MessagesQuery, RoomInfo, User, UserLogin};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/rooms", post(create_room_handler).get(list_rooms_handler))
        .route("/rooms/:room_id", get(get_room_handler))
        .route(
            "/rooms/:room_id/messages",
            get(get_messages_handler).post(send_message_handler),
        )
        .route(
            "/ws/:room_id",
            get(room_socket_handler)
                .route_layer(from_fn_with_state(state.clone(), socket_origin_guard)),
        )
}

/// POST /register
async fn register_handler(State(state): State<AppState>, Json(user): Json<User>) -> Result<Json<Value>> {
    let chat = state.chat.clone();
    // Argon2 is CPU bound; keep it off the async workers
    let username = tokio::task::spawn_blocking(move || chat.register(user))
        .await
        .map_err(anyhow::Error::from)??;

    Ok(Json(json!({
        "message": "User registered successfully",
        "username": username
    })))
}

/// POST /login
async fn login_handler(
    State(state): State<AppState>,
    Json(login): Json<UserLogin>,
) -> Result<Json<Value>> {
    let chat = state.chat.clone();
    let (session_id, username) =
        tokio::task::spawn_blocking(move || chat.login(&login.email, &login.password))
            .await
            .map_err(anyhow::Error::from)??;

    Ok(Json(json!({
        "message": "Login successful",
        "session_id": session_id,
        "username": username
    })))
}

/// POST /logout?session_id=...
async fn logout_handler(
    State(state): State<AppState>,
    Query(query): Query<LogoutQuery>,
) -> Result<Json<Value>> {
    let username = state.chat.logout(&query.session_id)?;
    Ok(Json(json!({
        "message": format!("User {} logged out successfully", username)
    })))
}

/// POST /rooms
async fn create_room_handler(
    State(state): State<AppState>,
    Json(room): Json<ChatRoom>,
) -> Result<Json<Value>> {
    let info = state.chat.create_room(room)?;
    tracing::info!(room_id = %info.room_id, "Chat room created");

    Ok(Json(json!({
        "message": "Chat room created",
        "room": {
            "room_id": info.room_id,
            "name": info.name,
            "description": info.description
        }
    })))
}

/// GET /rooms
async fn list_rooms_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    let rooms = state.chat.list_rooms()?;
    Ok(Json(json!({ "rooms": rooms })))
}

/// GET /rooms/:room_id
async fn get_room_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomInfo>> {
    Ok(Json(state.chat.get_room(&room_id)?))
}

/// GET /rooms/:room_id/messages?limit=50
async fn get_messages_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Value>> {
    let messages = state.chat.recent_messages(&room_id, query.limit)?;
    Ok(Json(json!({
        "room_id": room_id,
        "messages": messages
    })))
}

/// POST /rooms/:room_id/messages
async fn send_message_handler(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(message): Json<Message>,
) -> Result<Json<Value>> {
    state.chat.post_message(&room_id, message)?;
    Ok(Json(json!({
        "message": "Message sent",
        "room_id": room_id
    })))
}

/// GET /ws/:room_id - Room chat socket
async fn room_socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Response {
    let rooms = state.rooms.clone();
    let chat = state.chat.clone();
    ws.on_upgrade(move |socket| rooms.serve(socket, chat, room_id))
}
