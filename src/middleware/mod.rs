// CORS and request logging middleware

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Instant;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::routes::AppState;

/// Build the CORS layer from configuration
///
/// A `*` entry allows any origin without credentials. Otherwise only the listed
/// origins are accepted and methods/headers are mirrored from the preflight,
/// since wildcards cannot be combined with credentials.
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.cors_allow_credentials)
}

/// Whether a WebSocket handshake origin is acceptable
pub fn socket_origin_allowed(config: &Config, origin: Option<&str>) -> bool {
    if config.socket_cors_origins.iter().any(|o| o == "*") {
        return true;
    }
    // Non-browser clients send no Origin header
    match origin {
        None => true,
        Some(origin) => config.socket_cors_origins.iter().any(|o| o == origin),
    }
}

/// Metrics key for requests that matched no route
pub const UNMATCHED_ROUTE: &str = "<unmatched>";

/// Reject WebSocket handshakes from origins outside the socket allow-list
pub async fn socket_origin_guard(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    if socket_origin_allowed(&state.config, origin.as_deref()) {
        return next.run(request).await;
    }

    tracing::warn!("Rejected WebSocket handshake from origin {:?}", origin);
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "detail": "Origin not allowed" })),
    )
        .into_response()
}

/// Log each request and feed the metrics collector
pub async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

    state.metrics.record_request_start();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    let status = response.status();
    state
        .metrics
        .record_request_end(&route, status.as_u16(), latency_ms);

    if status.is_server_error() {
        tracing::error!("{} {} - {} ({:.1}ms)", method, path, status.as_u16(), latency_ms);
    } else if status.is_client_error() {
        tracing::warn!("{} {} - {} ({:.1}ms)", method, path, status.as_u16(), latency_ms);
    } else {
        tracing::info!("{} {} - {} ({:.1}ms)", method, path, status.as_u16(), latency_ms);
    }

    response
}
