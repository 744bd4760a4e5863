//! Category listing handler.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use tally_types::expense::Category;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Category>>>, AppError> {
    let start = Instant::now();

    let categories = state.expense_service.list_categories().await?;

    Ok(ApiResponse::success(categories, start)
        .with_link("self", "/api/v1/categories")
        .json())
}
