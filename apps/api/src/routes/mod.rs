pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

/// Resume PDFs are small; anything larger is rejected before parsing.
const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/evaluations",
            post(handlers::handle_evaluate_upload).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route(
            "/api/v1/evaluations/text",
            post(handlers::handle_evaluate_text),
        )
        .route("/api/v1/retrieve", post(handlers::handle_retrieve))
        .with_state(state)
}
