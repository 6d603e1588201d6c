//! Backend for the menu add-on: remote configuration, a persisted friend graph,
//! and a WebSocket relay that forwards social messages between registered users.

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, routing::post, Router};
use tokio::sync::mpsc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod state;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use state::AppState;

/// Opaque, caller-supplied user identifier. Never validated beyond non-emptiness.
pub type UserId = String;
/// Random per-socket id, used to tell a stale close apart from a newer registration.
pub type ConnId = String;
pub type WebSocketSender = mpsc::UnboundedSender<axum::extract::ws::Message>;

pub type SharedState = Arc<AppState>;

/// Build the full router. The relay upgrade is served on both `/` and `/ws`
/// because the add-on connects to the bare host.
pub fn app(state: SharedState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::ws::ws_handler))
        .route("/ws", get(handlers::ws::ws_handler))
        .route("/serverdata", get(handlers::http::get_server_data))
        .route("/tts", post(handlers::http::tts))
        .route("/getfriends", get(handlers::friends::get_friends))
        .route("/frienduser", post(handlers::friends::friend_user))
        .route("/unfrienduser", post(handlers::friends::unfriend_user))
        .route("/api/status", get(handlers::http::get_status))
        .route("/health", get(|| async { "ok" }))
        .fallback(|| async { (StatusCode::NOT_FOUND, "Not found.") })
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(config::build_cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
