//! Axum route handlers for the Recommendation API.

use axum::{extract::State, Json};

use crate::errors::{AppError, AppJson};
use crate::models::catalog::RecommendationRequest;
use crate::recommendation::service::{Mode, RecommendationOutcome};
use crate::state::AppState;

/// POST /api/recommendations
///
/// Formats the posted catalog into a prompt, calls the provider once, and
/// returns the raw markdown plus the playbooks parsed out of it.
pub async fn handle_recommendations(
    State(state): State<AppState>,
    AppJson(request): AppJson<RecommendationRequest>,
) -> Result<Json<RecommendationOutcome>, AppError> {
    let outcome = state.recommender.run(&request, Mode::Live).await?;
    Ok(Json(outcome))
}

/// POST /api/debug-recommendations
///
/// Same preparation as the live endpoint, but reports counts and samples
/// instead of calling the provider. Needs no credential.
pub async fn handle_debug_recommendations(
    State(state): State<AppState>,
    AppJson(request): AppJson<RecommendationRequest>,
) -> Result<Json<RecommendationOutcome>, AppError> {
    let outcome = state.recommender.run(&request, Mode::Debug).await?;
    Ok(Json(outcome))
}
