use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use log::warn;
use serde_json::Value;

use crate::state::documents::read_document;
use crate::SharedState;

// ---------- Status ----------

pub async fn get_status(State(state): State<SharedState>) -> impl IntoResponse {
    let connections = state.registry.len().await;
    Json(serde_json::json!({
        "connections": connections,
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "started_at_utc": state.started_at_utc,
    }))
}

// ---------- Remote configuration ----------

/// GET /serverdata — the configuration document, served verbatim.
pub async fn get_server_data(State(state): State<SharedState>) -> impl IntoResponse {
    match read_document::<Value>(&state.server_data_path) {
        Ok(Some(data)) => (StatusCode::OK, Json(data)).into_response(),
        Ok(None) => server_data_unavailable(),
        Err(e) => {
            warn!("Failed to read {}: {}", state.server_data_path.display(), e);
            server_data_unavailable()
        }
    }
}

fn server_data_unavailable() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Server data unavailable" })),
    )
        .into_response()
}

// ---------- TTS ----------

/// POST /tts — no speech provider is wired up.
pub async fn tts() -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(serde_json::json!({ "error": "TTS not configured on this server." })),
    )
}
