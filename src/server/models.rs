//! JSON response bodies for the HTTP API.

use crate::analysis::AnalysisResult;
use serde::Serialize;

/// Body of a successful `POST /upload`.
///
/// `report_error` is set (and `report_path` absent) when analysis succeeded
/// but report rendering failed — the analysis results are still returned.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_error: Option<String>,
    pub compliance_results: AnalysisResult,
    pub fraud_results: AnalysisResult,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub ai_ready: bool,
    pub config_loaded: bool,
}

/// Body of `GET /config-status`.
#[derive(Debug, Serialize)]
pub struct ConfigStatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_configured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}
