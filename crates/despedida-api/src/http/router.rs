//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, request tracing.
//! `/health` and the public session/message endpoints are unauthenticated;
//! everything under `/api/v1/admin` (except login) requires a bearer token.

use axum::Router;
use axum::routing::{delete, get, post};
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
        // Public: fixed-session bootstrap, session views, message submission
        .route("/session", post(handlers::session::bootstrap_session))
        .route("/sessions/{id}", get(handlers::session::get_session))
        .route(
            "/sessions/{id}/messages",
            get(handlers::session::list_messages),
        )
        .route("/messages", post(handlers::message::submit_message))
        // Admin
        .route("/admin/login", post(handlers::admin::login))
        .route(
            "/admin/sessions",
            get(handlers::admin::list_sessions)
                .post(handlers::admin::create_session)
                .put(handlers::admin::update_session),
        )
        .route(
            "/admin/sessions/{id}",
            delete(handlers::admin::deactivate_session),
        )
        .route(
            "/admin/messages/{id}",
            delete(handlers::message::delete_message),
        )
        .route("/admin/stats", get(handlers::stats::get_stats));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
