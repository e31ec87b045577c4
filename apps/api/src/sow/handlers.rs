//! Axum route handlers for the SOW API.

use axum::{extract::State, response::Redirect, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::{AppError, AppJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSowResponse {
    pub success: bool,
    pub sow_id: String,
    pub message: String,
    pub recommendations: Vec<Value>,
}

/// GET /api/generate-sow-link
///
/// Stateless redirect to the client-side SOW builder.
pub async fn handle_generate_sow_link(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.config.sow_client_route)
}

/// POST /api/generate-sow
///
/// Body: `{ "recommendations": [...] }`. Rejects anything but an array.
pub async fn handle_generate_sow(
    AppJson(body): AppJson<Value>,
) -> Result<Json<GenerateSowResponse>, AppError> {
    let recommendations = match body.get("recommendations") {
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            return Err(AppError::Validation(
                "recommendations must be an array".to_string(),
            ))
        }
        None => {
            return Err(AppError::Validation(
                "recommendations is required".to_string(),
            ))
        }
    };

    let sow_id = Utc::now().timestamp_millis().to_string();
    info!("Generated SOW {sow_id} with {} items", recommendations.len());

    Ok(Json(GenerateSowResponse {
        success: true,
        sow_id,
        message: "SOW generated successfully".to_string(),
        recommendations,
    }))
}
