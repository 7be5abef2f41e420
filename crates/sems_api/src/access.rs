//! Login and RFID badge checks.
//!
//! Neither touches station state; the charging flow does not depend on
//! their outcome.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
}

#[derive(Serialize, Deserialize)]
pub struct RfidRequest {
    pub uid: String,
}

#[derive(Serialize, Deserialize)]
pub struct RfidResponse {
    pub allowed: bool,
    pub label: String,
}

/// Demo login: any non-empty email/password pair gets the admin token
pub async fn login(
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::InvalidCredentials);
    }
    tracing::info!("Login for {}", request.email);
    Ok(Json(LoginResponse {
        token: "demo-token".to_string(),
        role: "admin".to_string(),
    }))
}

/// Check a badge uid against the whitelist
pub async fn rfid_check(
    State(app_state): State<AppState>,
    payload: Result<Json<RfidRequest>, JsonRejection>,
) -> Result<Json<RfidResponse>, ApiError> {
    let Json(request) = payload?;
    let label = app_state.config.rfid_label(&request.uid);
    tracing::info!("RFID check for {}: allowed={}", request.uid, label.is_some());
    Ok(Json(RfidResponse {
        allowed: label.is_some(),
        label: label.unwrap_or_default().to_string(),
    }))
}
