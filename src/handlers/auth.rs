use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use super::AppError;
use crate::models::user::{LoginRequest, RegisterRequest};
use crate::services::AppState;

pub async fn register_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(request) = payload?;

    let user = state
        .users
        .register(
            request.username.as_deref(),
            request.email.as_deref(),
            request.password.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "User Added Successfully...", "user": user })),
    ))
}

/// Looks the user up by email and checks the password. No session or token
/// is issued.
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(request) = payload?;

    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !user.password_matches(request.password.as_deref().unwrap_or_default()) {
        tracing::info!(user = %user.id, "login rejected");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    tracing::info!(user = %user.id, "login succeeded");
    Ok((StatusCode::OK, Json(json!({ "message": "Login Success....." }))))
}

pub async fn logout() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "message": "Logged out successfully" })))
}
