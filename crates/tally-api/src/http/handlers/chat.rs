//! Assistant chat and memory reset handlers.
//!
//! These return bare JSON bodies rather than the API envelope: the chat
//! boundary never fails, it always produces a reply.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use tally_core::chat::memory::MEMORY_CLEARED_MSG;
use tally_types::chat::{ChatReply, ChatRequest, Outcome};

use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/ai/chat
///
/// An unreadable body still gets a `{reply}` answer carrying the error.
pub async fn chat(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Json<ChatReply> {
    let reply = match body {
        Ok(Json(request)) => state.memory.respond(&auth.user_id, &request.message).await,
        Err(rejection) => {
            tracing::warn!(user_id = %auth.user_id, error = %rejection, "unreadable chat request");
            format!("⚠️ Error: {}", rejection.body_text())
        }
    };
    Json(ChatReply { reply })
}

/// POST /api/v1/ai/reset - Forget the caller's turns and summary.
pub async fn reset(State(state): State<AppState>, auth: AuthUser) -> Json<Outcome> {
    match state.memory.reset_memory(&auth.user_id).await {
        Ok(()) => Json(Outcome::ok(MEMORY_CLEARED_MSG)),
        Err(e) => {
            tracing::warn!(user_id = %auth.user_id, error = %e, "memory reset failed");
            Json(Outcome::failed(format!("⚠️ Error: {e}")))
        }
    }
}
