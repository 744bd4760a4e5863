//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Accounts
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route(
            "/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        // Expenses
        .route("/categories", get(handlers::category::list_categories))
        .route(
            "/expenses",
            get(handlers::expense::list_expenses).post(handlers::expense::create_expense),
        )
        .route("/expenses/voice", post(handlers::expense::voice_expense))
        .route(
            "/expenses/{id}",
            get(handlers::expense::get_expense)
                .put(handlers::expense::update_expense)
                .delete(handlers::expense::delete_expense),
        )
        .route("/dashboard", get(handlers::expense::dashboard))
        // Assistant
        .route("/ai/chat", post(handlers::chat::chat))
        .route("/ai/reset", post(handlers::chat::reset))
        .route("/health", get(handlers::health::health_check));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
