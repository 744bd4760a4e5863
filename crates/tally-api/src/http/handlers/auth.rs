//! Registration, login, and logout handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use tally_types::user::{Credentials, IssuedKey};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/auth/register - Create an account and return its first API key.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<ApiResponse<IssuedKey>>), AppError> {
    let start = Instant::now();

    let issued = state.user_service.register(&body).await?;
    let resp = ApiResponse::success(issued, start).with_link("profile", "/api/v1/profile");

    Ok((StatusCode::CREATED, resp.json()))
}

/// POST /api/v1/auth/login - Exchange username and password for a new API key.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<ApiResponse<IssuedKey>>, AppError> {
    let start = Instant::now();

    let issued = state.user_service.login(&body).await?;

    Ok(ApiResponse::success(issued, start).json())
}

/// POST /api/v1/auth/logout - Revoke the key used for this request.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();

    state.user_service.logout(&auth.api_key).await?;

    Ok(ApiResponse::success(serde_json::json!({ "logged_out": true }), start).json())
}
