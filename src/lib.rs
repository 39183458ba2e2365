//! # docguard
//!
//! AI-assisted compliance and fraud screening for uploaded business
//! documents. A document goes in, a rendered screening report comes out:
//!
//! ```text
//! upload (.pdf/.docx/.xlsx/.xls/.csv)
//!  │
//!  ├─ 1. Extract   concatenate text via format libraries (no OCR)
//!  ├─ 2. Analyze   two concurrent prompts against a hosted model
//!  │               (compliance check, fraud check) with degenerate-response
//!  │               normalisation; failures become error-flagged results
//!  ├─ 3. Report    fixed HTML template, rasterized to PDF by wkhtmltopdf
//!  │               when available, served as HTML otherwise
//!  └─ 4. Respond   JSON with both result sets + report download name
//! ```
//!
//! The pipeline is strictly forward: nothing is persisted beyond the upload
//! and report directories, and nothing is shared between requests.
//!
//! ## Library vs server
//!
//! Every stage is a plain library function usable on its own; the `server`
//! feature (on by default) adds the axum front end and the `docguard`
//! binary. Disable it when embedding only the pipeline:
//!
//! ```toml
//! docguard = { version = "0.1", default-features = false }
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use docguard::analysis::{self, AnalysisProvider, CannedAnalyzer};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let text = docguard::extract::extract_text(Path::new("invoice.csv"), "csv")?;
//!     // Offline double; swap in WatsonxProvider::new(&config)? for real calls.
//!     let provider: Arc<dyn AnalysisProvider> = Arc::new(CannedAnalyzer::new());
//!     let (compliance, fraud) = analysis::analyze_both(&provider, &provider, &text).await;
//!     let report = docguard::report::render_report(
//!         "invoice.csv", &compliance, &fraud, Path::new("reports"))?;
//!     println!("report written to {}", report.path.display());
//!     Ok(())
//! }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analysis;
pub mod config;
pub mod error;
pub mod extract;
pub mod prompts;
pub mod report;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analysis::{analyze, analyze_both, AnalysisKind, AnalysisProvider, AnalysisResult};
pub use config::AppConfig;
pub use error::{GuardError, ProviderError};
pub use extract::extract_text;
pub use report::{render_report, RenderedReport, ReportFormat};
#[cfg(feature = "server")]
pub use server::{router, serve, AppState};
