use axum::{
    extract::{State, WebSocketUpgrade},
    middleware as axum_middleware,
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::internal_error_response;
use crate::http_client::OpenAiClient;
use crate::metrics::{MetricsSnapshot, RequestMetrics};
use crate::middleware;
use crate::realtime::{LobbyHub, RoomHub};
use crate::store::{AssessmentStore, ChatStore, PaperStore};
use crate::utils::now_iso;

pub mod health_chat;
pub mod health_exploration;
pub mod preventive;
pub mod risk_assessment;
pub mod search;
pub mod symptom_checker;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub openai: Arc<OpenAiClient>,
    pub chat: Arc<ChatStore>,
    pub papers: Arc<PaperStore>,
    pub assessments: Arc<AssessmentStore>,
    pub rooms: Arc<RoomHub>,
    pub lobby: Arc<LobbyHub>,
    pub metrics: Arc<RequestMetrics>,
}

impl AppState {
    /// Fresh state with empty stores
    pub fn new(config: Config, assessments: AssessmentStore) -> anyhow::Result<Self> {
        let openai = OpenAiClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            openai: Arc::new(openai),
            chat: Arc::new(ChatStore::new()),
            papers: Arc::new(PaperStore::new()),
            assessments: Arc::new(assessments),
            rooms: Arc::new(RoomHub::new()),
            lobby: Arc::new(LobbyHub::new()),
            metrics: Arc::new(RequestMetrics::new()),
        })
    }

    /// Close every open WebSocket
    pub async fn close_sockets(&self) {
        self.rooms.shutdown_all().await;
        self.lobby.shutdown_all().await;
    }
}

/// Build the application with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let prefix = state.config.api_prefix.clone();

    Router::new()
        .route("/", get(root_handler))
        .route(&format!("{}/health", prefix), get(health_handler))
        .route("/debug/config", get(debug_config_handler))
        .route("/debug/metrics", get(debug_metrics_handler))
        .route(
            "/ws/lobby",
            get(lobby_socket_handler).route_layer(axum_middleware::from_fn_with_state(
                state.clone(),
                middleware::socket_origin_guard,
            )),
        )
        .nest(&format!("{}/health-chat", prefix), health_chat::router(&state))
        .nest(&format!("{}/risk-assessment", prefix), risk_assessment::router())
        .nest(&format!("{}/preventive-featured", prefix), preventive::router())
        .nest(&format!("{}/symptom-checker", prefix), symptom_checker::router())
        .nest(&format!("{}/health-exploration", prefix), health_exploration::router())
        .merge(search::router(&format!("{}/search", prefix)))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_logging_middleware,
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer(&state.config))
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);
    internal_error_response()
}

/// GET / - Welcome banner
async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": format!("Welcome to {} - {}", state.config.app_name, state.config.app_description),
        "version": state.config.app_version,
        "status": "running"
    }))
}

/// GET {prefix}/health - Liveness plus configuration summary
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": now_iso(),
        "version": state.config.app_version,
        "openai_configured": state.config.has_valid_openai_key(),
        "cors_origins": state.config.cors_origins,
        "api_prefix": state.config.api_prefix
    }))
}

/// GET /debug/config - Effective configuration, without secrets
async fn debug_config_handler(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "frontend_url": config.frontend_url,
        "cors_origins": config.cors_origins,
        "has_openai_key": config.has_valid_openai_key(),
        "api_prefix": config.api_prefix,
        "port": config.server_port,
        "host": config.server_host
    }))
}

/// GET /debug/metrics - Request metrics snapshot
async fn debug_metrics_handler(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    state.metrics.cleanup_old_samples();
    Json(state.metrics.snapshot())
}

/// GET /ws/lobby - Live lobby socket
async fn lobby_socket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let lobby = state.lobby.clone();
    ws.on_upgrade(move |socket| lobby.serve(socket))
}
