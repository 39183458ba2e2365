//! HTTP error mapping for the web front end.
//!
//! Policy (matching the pipeline's error design): failures that the user can
//! act on come back as 4xx with actionable text; analysis-provider failures
//! never reach this type at all (they are folded into error-flagged results);
//! only genuinely unexpected conditions become 500s, and those log the detail
//! server-side while the response stays generic.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::GuardError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file selected")]
    NoFileProvided,

    #[error("File type not allowed. Please upload PDF, DOCX, XLSX, XLS, or CSV files.")]
    ExtensionNotAllowed,

    #[error("File too large. Please upload a smaller file.")]
    UploadTooLarge,

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error("AI components not initialized. Please check the remote model configuration.")]
    AnalyzersUnavailable,

    #[error("Report file not found: {0}")]
    ReportNotFound(String),

    #[error(transparent)]
    Pipeline(#[from] GuardError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NoFileProvided => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::ExtensionNotAllowed => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::UploadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            ApiError::MalformedUpload(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::AnalyzersUnavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            ApiError::ReportNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Pipeline(GuardError::UnsupportedFormat { .. }) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Pipeline(GuardError::ExtractionFailed { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            ApiError::Pipeline(e) => {
                tracing::error!("pipeline error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_maps_to_bad_request() {
        let err = ApiError::Pipeline(GuardError::UnsupportedFormat {
            extension: "txt".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_report_maps_to_not_found() {
        let response = ApiError::ReportNotFound("x.pdf".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let response = ApiError::Internal("secret database path".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body is generic; the detail goes to the log only.
    }
}
