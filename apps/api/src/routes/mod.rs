pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommendation::handlers as recommendation;
use crate::sow::handlers as sow;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendation API
        .route(
            "/api/recommendations",
            post(recommendation::handle_recommendations),
        )
        .route(
            "/api/debug-recommendations",
            post(recommendation::handle_debug_recommendations),
        )
        // SOW API
        .route("/api/generate-sow-link", get(sow::handle_generate_sow_link))
        .route("/api/generate-sow", post(sow::handle_generate_sow))
        .with_state(state)
}
