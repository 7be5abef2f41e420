use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use sems_core::{Action, StationSnapshot};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize, Deserialize)]
pub struct CommandRequest {
    pub action: String,
    #[serde(rename = "limit_kW", default, skip_serializing_if = "Option::is_none")]
    pub limit_kw: Option<f64>,
}

#[derive(Serialize, Deserialize)]
pub struct CommandResponse {
    pub ok: bool,
    pub status: StationSnapshot,
}

/// Get the current state of a station
pub async fn get_station_status(
    State(app_state): State<AppState>,
    Path(station_id): Path<String>,
) -> Json<StationSnapshot> {
    tracing::debug!("Getting status of station {}", station_id);
    Json(app_state.engine.status(&station_id))
}

/// Apply a start/stop command to a station
pub async fn post_station_command(
    State(app_state): State<AppState>,
    Path(station_id): Path<String>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let Json(request) = payload?;
    let action = Action::from(request.action.as_str());
    let status = app_state
        .engine
        .command(&station_id, &action, request.limit_kw);
    Ok(Json(CommandResponse { ok: true, status }))
}
