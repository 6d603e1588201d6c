//! Environment-driven server configuration.
//!
//! Everything is read once at startup. Unset or unparseable values fall back to
//! defaults so the server runs with no environment at all.

use std::env;
use std::path::PathBuf;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1_000_000;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen port on 0.0.0.0 (`PORT`).
    pub port: u16,
    /// Directory holding the JSON documents (`MENU_DATA_DIR`).
    pub data_dir: PathBuf,
    /// Comma-separated allowed CORS origins; unset or "*" = permissive (`MENU_CORS_ORIGINS`).
    pub cors_origins: Option<String>,
    /// Max request body size in bytes (`MENU_MAX_BODY_BYTES`).
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cors_origins: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_dir = env::var("MENU_DATA_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let max_body_bytes = env::var("MENU_MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        let cors_origins = env::var("MENU_CORS_ORIGINS").ok();

        Self {
            port,
            data_dir,
            cors_origins,
            max_body_bytes,
        }
    }

    /// Path of a document inside the data directory.
    pub fn document_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }
}

/// Unset or "*" => permissive; otherwise the listed origins only.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins = config
        .cors_origins
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "*");

    let Some(list) = origins else {
        return CorsLayer::permissive();
    };

    let allowed: Vec<HeaderValue> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::try_from(s).ok())
        .collect();

    if allowed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
    }
}
