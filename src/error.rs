//! Error types for the docguard library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`GuardError`] — **Fatal for the request**: the pipeline stage cannot
//!   proceed (unsupported format, unreadable file, report directory not
//!   writable). Returned as `Err(GuardError)` from extraction and reporting.
//!
//! * [`ProviderError`] — **Absorbed at the analysis boundary**: a failed call
//!   to the remote model is converted into an error-flagged
//!   [`crate::analysis::AnalysisResult`] by [`crate::analysis::analyze`] and
//!   never propagates. One broken model call must not take down a request
//!   that could still report extraction results.
//!
//! Configuration problems (`ConfigMissing`, `ConfigInvalid`,
//! `CredentialsNotConfigured`) are deliberately survivable: the server keeps
//! running with analysis disabled and surfaces the problem through
//! `/config-status` instead of crashing at startup.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docguard library.
///
/// Remote-analysis failures use [`ProviderError`] and are recorded inside
/// [`crate::analysis::AnalysisResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum GuardError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// No configuration file at the expected path.
    #[error("Configuration file not found: '{path}'\nCopy config/config.example.yaml to that path and fill it in.")]
    ConfigMissing { path: PathBuf },

    /// The configuration file exists but is not parseable YAML.
    #[error("Failed to parse configuration '{path}': {detail}")]
    ConfigInvalid { path: PathBuf, detail: String },

    /// Credentials are still the shipped placeholder values.
    #[error("Remote model credentials are not configured.\nReplace the placeholder api_key/project_id in the configuration file.")]
    CredentialsNotConfigured,

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The declared extension is not one of pdf/xlsx/xls/docx/csv.
    #[error("Unsupported file format: '.{extension}'\nSupported formats: .pdf, .docx, .xlsx, .xls, .csv")]
    UnsupportedFormat { extension: String },

    /// The file could not be opened or decoded by the format library.
    #[error("Failed to extract text from '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    // ── Report errors ─────────────────────────────────────────────────────
    /// Could not create or write the report file.
    #[error("Failed to write report '{path}': {source}")]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failed call to the hosted text-generation endpoint.
///
/// Absorbed by [`crate::analysis::analyze`]: the message ends up as the sole
/// finding of an error-flagged result so the caller still gets a response.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// IAM token exchange failed (bad API key, IAM outage).
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The generation request failed at the transport level.
    #[error("request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success HTTP status.
    #[error("endpoint returned HTTP {status}: {body}")]
    Endpoint { status: u16, body: String },

    /// The response body did not contain generated text.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
