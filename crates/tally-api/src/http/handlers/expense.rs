//! Expense CRUD, dashboard, and voice entry handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use tally_types::chat::Outcome;
use tally_types::error::ExpenseError;
use tally_types::expense::{
    CreateExpenseRequest, DashboardSummary, Expense, ExpenseId, UpdateExpenseRequest,
};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::query::ExpenseListQuery;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for voice entry. A missing `speech` field is treated as empty.
#[derive(Debug, Deserialize)]
pub struct VoiceRequest {
    #[serde(default)]
    pub speech: String,
}

/// An id that does not parse cannot name an existing expense.
fn parse_expense_id(id: &str) -> Result<ExpenseId, AppError> {
    id.parse().map_err(|_| AppError::Expense(ExpenseError::NotFound))
}

/// GET /api/v1/expenses - Filtered, sorted list of the caller's expenses.
pub async fn list_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ExpenseListQuery>,
) -> Result<Json<ApiResponse<Vec<Expense>>>, AppError> {
    let start = Instant::now();

    let filter = params.into_filter()?;
    let expenses = state.expense_service.list(&auth.user_id, &filter).await?;

    Ok(ApiResponse::success(expenses, start)
        .with_link("self", "/api/v1/expenses")
        .with_link("dashboard", "/api/v1/dashboard")
        .json())
}

/// POST /api/v1/expenses
pub async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Expense>>), AppError> {
    let start = Instant::now();

    let expense = state.expense_service.create(&auth.user_id, body).await?;
    let self_link = format!("/api/v1/expenses/{}", expense.id);

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(expense, start)
            .with_link("self", self_link)
            .json(),
    ))
}

/// GET /api/v1/expenses/{id}
pub async fn get_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let start = Instant::now();

    let expense_id = parse_expense_id(&id)?;
    let expense = state
        .expense_service
        .get(&auth.user_id, &expense_id)
        .await?;

    Ok(ApiResponse::success(expense, start)
        .with_link("self", format!("/api/v1/expenses/{expense_id}"))
        .json())
}

/// PUT /api/v1/expenses/{id} - Partial update.
pub async fn update_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateExpenseRequest>,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let start = Instant::now();

    let expense_id = parse_expense_id(&id)?;
    let expense = state
        .expense_service
        .update(&auth.user_id, &expense_id, body)
        .await?;

    Ok(ApiResponse::success(expense, start)
        .with_link("self", format!("/api/v1/expenses/{expense_id}"))
        .json())
}

/// DELETE /api/v1/expenses/{id}
pub async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();

    let expense_id = parse_expense_id(&id)?;
    state
        .expense_service
        .delete(&auth.user_id, &expense_id)
        .await?;

    Ok(ApiResponse::success(
        serde_json::json!({ "deleted": expense_id.to_string() }),
        start,
    )
    .with_link("expenses", "/api/v1/expenses")
    .json())
}

/// GET /api/v1/dashboard - Totals over the same filters as the list.
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ExpenseListQuery>,
) -> Result<Json<ApiResponse<DashboardSummary>>, AppError> {
    let start = Instant::now();

    let filter = params.into_filter()?;
    let summary = state
        .expense_service
        .dashboard(&auth.user_id, &filter)
        .await?;

    Ok(ApiResponse::success(summary, start)
        .with_link("expenses", "/api/v1/expenses")
        .json())
}

/// POST /api/v1/expenses/voice - Record an expense from a spoken sentence.
pub async fn voice_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<VoiceRequest>,
) -> Result<Json<Outcome>, AppError> {
    let outcome = state
        .expense_service
        .add_from_speech(&auth.user_id, &body.speech)
        .await?;
    Ok(Json(outcome))
}
