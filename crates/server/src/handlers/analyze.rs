//! # Analysis Handlers
//!
//! `POST /api/analyze` takes JSON, `POST /analyze_reviews` takes a browser form.
//! Both run one pipeline invocation and answer with the same report body.

use super::{AnalyzeRequest, AnalyzeResponse, AppError, AppState};
use axum::{extract::State, Form, Json};
use tracing::info;
use uuid::Uuid;

/// The handler for the JSON `/api/analyze` endpoint.
pub async fn analyze_json_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    analyze(&app_state, payload).await
}

/// The handler for the form-encoded `/analyze_reviews` endpoint.
pub async fn analyze_form_handler(
    State(app_state): State<AppState>,
    Form(payload): Form<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    analyze(&app_state, payload).await
}

async fn analyze(
    app_state: &AppState,
    payload: AnalyzeRequest,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let product_url = payload
        .product_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::BadRequest("No product_url provided".to_string()))?;

    let analysis_id = Uuid::new_v4();
    info!(%analysis_id, "Received analysis request for URL: {}", product_url);

    let report = app_state
        .analyzer
        .run_with_id(analysis_id, &product_url)
        .await?;

    Ok(Json(AnalyzeResponse {
        analysis_id,
        report,
    }))
}
