//! Health check handler (no auth required).

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /api/v1/health
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match sqlx::query("SELECT 1").execute(&state.db_pool.reader).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "health check database probe failed");
            "unavailable"
        }
    };

    Json(json!({
        "status": if database == "ok" { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "completion_provider": state.provider.name(),
    }))
}
