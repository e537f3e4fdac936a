pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::documents::handlers as documents;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document extraction
        .route(
            "/api/file/parse",
            post(documents::handle_parse_file)
                .get(documents::handle_supported_formats)
                .layer(DefaultBodyLimit::max(documents::UPLOAD_BODY_LIMIT)),
        )
        // Model server
        .route("/api/ollama/connection", get(analysis::handle_connection))
        // Analysis
        .route("/api/resume/grade", post(analysis::handle_grade))
        .route("/api/resume/optimize", post(analysis::handle_optimize))
        .route("/api/resume/match", post(analysis::handle_match))
        .route("/api/job/parse", post(analysis::handle_parse_job))
        .with_state(state)
}
