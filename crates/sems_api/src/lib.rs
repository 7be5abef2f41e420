//! SEMS API Library
//!
//! HTTP and WebSocket endpoints for the live charging station service.

mod access;
pub mod config;
mod error;
mod live;
mod station;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json, Router,
    routing::{get, post},
};
use sems_engine::Engine;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use crate::config::{ConfigError, ServerConfig};
pub use crate::error::{ApiError, ErrorResponse};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(engine: Engine, config: ServerConfig) -> Self {
        Self {
            engine,
            config: Arc::new(config),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct Health {
    pub ok: bool,
    /// Unix time in seconds
    pub ts: f64,
}

/// Health check endpoint
pub async fn health_check() -> Json<Health> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default();
    Json(Health { ok: true, ts })
}

/// Create the application router with all endpoints
pub fn create_app(engine: Engine, config: ServerConfig) -> Router {
    let static_files = ServeDir::new(&config.static_dir);
    Router::new()
        .route("/health", get(health_check))
        .route("/login", post(access::login))
        .route("/rfid/check", post(access::rfid_check))
        .route(
            "/station/{station_id}/status",
            get(station::get_station_status),
        )
        .route(
            "/station/{station_id}/command",
            post(station::post_station_command),
        )
        .route("/ws/station/{station_id}", get(live::station_live))
        .nest_service("/static", static_files)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(engine, config))
}
