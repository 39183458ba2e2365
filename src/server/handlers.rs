//! HTTP handlers: upload → extract → analyze → report → respond, plus the
//! download and status endpoints.
//!
//! The upload handler enforces the request-stage ordering the error policy
//! depends on: extension screening happens before anything touches the file
//! contents, analysis availability is checked before extraction, and a
//! report-rendering failure still returns the analysis results. The uploaded
//! file is deleted only after fully successful processing; failures leave it
//! behind for inspection.

use axum::{
    extract::{Multipart, Path as UrlPath, State},
    http::{header, StatusCode},
    Json,
};
use chrono::{Local, Utc};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::extract::extract_text;
use crate::report::render_report;
use crate::server::error::ApiError;
use crate::server::models::{ConfigStatusResponse, HealthResponse, UploadResponse};
use crate::server::AppState;
use crate::{analysis, config};

/// `POST /upload` — multipart form with a single `file` field.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    // ── Locate the file field ────────────────────────────────────────────
    let mut file: Option<(String, axum::body::Bytes)> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().ok_or(ApiError::NoFileProvided)?.to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        file = Some((original_name, bytes));
        break;
    }
    let (original_name, bytes) = file.ok_or(ApiError::NoFileProvided)?;

    let filename = sanitize_filename(&original_name).ok_or(ApiError::NoFileProvided)?;

    // ── Screen the extension before touching the contents ───────────────
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_string())
        .ok_or(ApiError::ExtensionNotAllowed)?;
    if !state.extension_allowed(&extension) {
        return Err(ApiError::ExtensionNotAllowed);
    }

    // ── Analysis must be available before we do any work ─────────────────
    let analyzers = state
        .analyzers
        .clone()
        .ok_or(ApiError::AnalyzersUnavailable)?;

    // ── Persist the upload under a timestamp-qualified safe name ─────────
    // The upload directory is created on first use so that merely
    // constructing the server leaves the filesystem alone.
    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to create upload directory: {e}")))?;
    let stored_name = format!("{}_{filename}", Local::now().format("%Y%m%d_%H%M%S"));
    let stored_path = state.upload_dir.join(&stored_name);
    tokio::fs::write(&stored_path, &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to save upload: {e}")))?;
    info!(file = %stored_name, bytes = bytes.len(), "file uploaded");

    // ── Extract (CPU-bound format parsing off the async runtime) ─────────
    let extract_path = stored_path.clone();
    let extract_ext = extension.clone();
    let document_text =
        tokio::task::spawn_blocking(move || extract_text(&extract_path, &extract_ext))
            .await
            .map_err(|e| ApiError::Internal(format!("extraction task panicked: {e}")))??;
    info!(chars = document_text.len(), "document text extracted");

    // ── Analyze (two concurrent calls over the same text) ────────────────
    let (compliance_results, fraud_results) =
        analysis::analyze_both(&analyzers.compliance, &analyzers.fraud, &document_text).await;

    // ── Render the report; its failure must not discard the analysis ─────
    let report_dir = state.report_dir.clone();
    let report_name = filename.clone();
    let (c, f) = (compliance_results.clone(), fraud_results.clone());
    let report = tokio::task::spawn_blocking(move || render_report(&report_name, &c, &f, &report_dir))
        .await
        .map_err(|e| ApiError::Internal(format!("report task panicked: {e}")))?;

    match report {
        Ok(report) => {
            if let Err(e) = tokio::fs::remove_file(&stored_path).await {
                warn!("could not remove processed upload {}: {e}", stored_path.display());
            }
            let report_file = report
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Json(UploadResponse {
                success: true,
                message: "Analysis completed successfully".to_string(),
                report_path: Some(report_file),
                report_type: Some(report.format.as_str().to_string()),
                report_error: None,
                compliance_results,
                fraud_results,
            }))
        }
        Err(e) => {
            warn!("report generation failed: {e}");
            Ok(Json(UploadResponse {
                success: true,
                message: "Analysis completed successfully (report generation failed)".to_string(),
                report_path: None,
                report_type: None,
                report_error: Some(e.to_string()),
                compliance_results,
                fraud_results,
            }))
        }
    }
}

/// `GET /download/{filename}` — stream a previously generated report.
pub async fn download(
    State(state): State<Arc<AppState>>,
    UrlPath(filename): UrlPath<String>,
) -> Result<(StatusCode, [(header::HeaderName, String); 2], Vec<u8>), ApiError> {
    // Reports are addressed by bare file name only.
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(ApiError::ReportNotFound(filename));
    }

    let path = state.report_dir.join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::ReportNotFound(filename.clone()))?;

    let content_type = match Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
    {
        "pdf" => "application/pdf",
        "html" => "text/html; charset=utf-8",
        _ => "application/octet-stream",
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        ai_ready: state.ai_ready(),
        config_loaded: state.config.is_some(),
    })
}

/// `GET /config-status`
pub async fn config_status(State(state): State<Arc<AppState>>) -> Json<ConfigStatusResponse> {
    match &state.config {
        None => Json(ConfigStatusResponse {
            status: "error",
            message: Some("Configuration file not found or invalid".to_string()),
            credentials_configured: None,
            model_id: None,
            endpoint_url: None,
        }),
        Some(cfg) => {
            let configured = cfg.credentials_configured();
            Json(ConfigStatusResponse {
                status: if configured { "ok" } else { "warning" },
                message: (!configured).then(|| {
                    format!(
                        "Replace the placeholder credentials ('{}' / '{}') in the configuration file",
                        config::PLACEHOLDER_API_KEY,
                        config::PLACEHOLDER_PROJECT_ID,
                    )
                }),
                credentials_configured: Some(configured),
                model_id: Some(cfg.model.model_id.clone()),
                endpoint_url: Some(cfg.watsonx.url.clone()),
            })
        }
    }
}

/// Map a multipart read error, distinguishing the size limit.
fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::UploadTooLarge
    } else {
        ApiError::MalformedUpload(e.body_text())
    }
}

/// Reduce an uploaded file name to a safe bare name.
///
/// Keeps the final path component and replaces anything outside
/// `[A-Za-z0-9._-]` with `_`. Returns `None` when nothing usable remains.
fn sanitize_filename(name: &str) -> Option<String> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim()
        .trim_start_matches('.');

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_' || c == '.') {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories_and_odd_chars() {
        assert_eq!(
            sanitize_filename("../../etc/passwd.pdf").as_deref(),
            Some("passwd.pdf")
        );
        assert_eq!(
            sanitize_filename("q4 report (final).xlsx").as_deref(),
            Some("q4_report__final_.xlsx")
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\invoice.csv").as_deref(),
            Some("invoice.csv")
        );
    }

    #[test]
    fn sanitize_rejects_empty_and_dotfiles() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("..."), None);
        assert_eq!(sanitize_filename("///"), None);
    }

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(
            sanitize_filename("ledger_2025.csv").as_deref(),
            Some("ledger_2025.csv")
        );
    }
}
