use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reviewlens::{ExtractionError, PipelineError};
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// Each variant maps to an HTTP status and a JSON body of the form
/// `{"error": ..., "details": ...}`.
#[derive(Debug)]
pub enum AppError {
    /// A failed pipeline run.
    Pipeline(PipelineError),
    /// The request itself was unusable.
    BadRequest(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::Pipeline(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message, details) = match self {
            AppError::Pipeline(err) => {
                error!("PipelineError: {:?}", err);
                let (status, message) = match &err {
                    PipelineError::Extraction(ExtractionError::EmptyUrl) => {
                        (StatusCode::BAD_REQUEST, "No product_url provided")
                    }
                    PipelineError::Extraction(ExtractionError::NothingExtracted(_)) => (
                        StatusCode::NOT_FOUND,
                        "Could not extract product information or reviews",
                    ),
                    PipelineError::Extraction(_) => {
                        (StatusCode::BAD_GATEWAY, "Failed to retrieve the product page")
                    }
                    PipelineError::TimedOut(_) => {
                        (StatusCode::GATEWAY_TIMEOUT, "Analysis timed out")
                    }
                    PipelineError::MissingExtractor
                    | PipelineError::MissingAiProvider
                    | PipelineError::InvalidCap => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly.",
                    ),
                };
                (status, message.to_string(), Some(err.to_string()))
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                    None,
                )
            }
        };

        let body = match details {
            Some(details) => json!({ "error": error_message, "details": details }),
            None => json!({ "error": error_message }),
        };

        (status_code, Json(body)).into_response()
    }
}
