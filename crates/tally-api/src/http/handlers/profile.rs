//! Profile handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use tally_types::user::{UpdateProfileRequest, User, UserProfile};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Account details shown on the profile page.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub member_since: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileView {
    fn new(user: User, profile: UserProfile) -> Self {
        Self {
            username: user.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            member_since: user.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<ProfileView>>, AppError> {
    let start = Instant::now();

    let user = state.user_service.get_user(&auth.user_id).await?;
    let profile = state.user_service.get_profile(&auth.user_id).await?;

    Ok(ApiResponse::success(ProfileView::new(user, profile), start).json())
}

/// PUT /api/v1/profile - Partial update of name and email.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileView>>, AppError> {
    let start = Instant::now();

    let profile = state
        .user_service
        .update_profile(&auth.user_id, body)
        .await?;
    let user = state.user_service.get_user(&auth.user_id).await?;

    Ok(ApiResponse::success(ProfileView::new(user, profile), start).json())
}
