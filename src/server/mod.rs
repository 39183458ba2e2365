//! Web front end: application state, router construction, and serving.
//!
//! All per-process state lives in one [`AppState`] constructed at startup
//! and handed to handlers through `axum::extract::State` — no globals. A
//! server with missing or placeholder configuration still starts: analysis
//! is simply disabled and `/health` / `/config-status` say so.

mod error;
mod handlers;
mod models;

pub use error::ApiError;
pub use models::{ConfigStatusResponse, HealthResponse, UploadResponse};

use crate::analysis::{AnalysisProvider, CannedAnalyzer, WatsonxProvider};
use crate::config::AppConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Fallback upload cap when no configuration file is present (16 MB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// The two analysis dependents, constructed once at startup.
///
/// Both currently share one provider, but the seams are kept separate so the
/// compliance and fraud paths can diverge (different models, different
/// endpoints) without touching handler code.
#[derive(Clone)]
pub struct Analyzers {
    pub compliance: Arc<dyn AnalysisProvider>,
    pub fraud: Arc<dyn AnalysisProvider>,
}

/// Per-process application state.
pub struct AppState {
    pub config: Option<AppConfig>,
    pub analyzers: Option<Analyzers>,
    pub upload_dir: PathBuf,
    pub report_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build state from an optional loaded configuration.
    ///
    /// `demo` forces the canned offline analyzer regardless of credentials.
    /// With real config and real credentials the watsonx provider is shared
    /// by both analysis seams; placeholder credentials leave analysis
    /// disabled (warn, don't crash).
    ///
    /// Construction touches nothing on disk: the upload and report
    /// directories are created on first use, not here.
    pub fn new(config: Option<AppConfig>, demo: bool) -> Self {
        let analyzers = if demo {
            info!("demo mode: using canned analyzer, no remote calls will be made");
            let canned: Arc<dyn AnalysisProvider> = Arc::new(CannedAnalyzer::new());
            Some(Analyzers {
                compliance: Arc::clone(&canned),
                fraud: canned,
            })
        } else {
            match &config {
                Some(cfg) if cfg.credentials_configured() => match WatsonxProvider::new(cfg) {
                    Ok(provider) => {
                        let provider: Arc<dyn AnalysisProvider> = Arc::new(provider);
                        Some(Analyzers {
                            compliance: Arc::clone(&provider),
                            fraud: provider,
                        })
                    }
                    Err(e) => {
                        warn!("failed to initialize analysis provider: {e}");
                        None
                    }
                },
                Some(_) => {
                    warn!("remote model credentials not configured; analysis disabled");
                    None
                }
                None => {
                    warn!("no configuration loaded; analysis disabled");
                    None
                }
            }
        };

        let (upload_dir, report_dir, max_upload_bytes) = match &config {
            Some(cfg) => (
                cfg.app.upload_folder.clone(),
                cfg.app.report_folder.clone(),
                cfg.max_upload_bytes(),
            ),
            None => (
                PathBuf::from("uploads"),
                PathBuf::from("reports"),
                DEFAULT_MAX_UPLOAD_BYTES,
            ),
        };

        Self {
            config,
            analyzers,
            upload_dir,
            report_dir,
            max_upload_bytes,
        }
    }

    /// Whether both analysis dependents are initialized.
    pub fn ai_ready(&self) -> bool {
        self.analyzers.is_some()
    }

    /// Whether `extension` passes the configured allow-list (defaults apply
    /// when no configuration is loaded).
    pub fn extension_allowed(&self, extension: &str) -> bool {
        match &self.config {
            Some(cfg) => cfg.extension_allowed(extension),
            None => matches!(
                extension.to_ascii_lowercase().as_str(),
                "pdf" | "docx" | "xlsx" | "xls" | "csv"
            ),
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/download/:filename", get(handlers::download))
        .route("/health", get(handlers::health))
        .route("/config-status", get(handlers::config_status))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>) -> std::io::Result<()> {
    let (host, port) = match &state.config {
        Some(cfg) => (cfg.app.host.clone(), cfg.app.port),
        None => ("0.0.0.0".to_string(), 5000),
    };

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{e}")))?;

    let app = router(state);
    info!("starting docguard on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_without_config_has_analysis_disabled() {
        let state = AppState::new(None, false);
        assert!(!state.ai_ready());
        assert_eq!(state.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(state.extension_allowed("pdf"));
        assert!(!state.extension_allowed("txt"));
    }

    #[test]
    fn constructing_state_touches_no_directories() {
        let existed_before = (
            std::path::Path::new("uploads").exists(),
            std::path::Path::new("reports").exists(),
        );
        let _state = AppState::new(None, false);
        assert_eq!(std::path::Path::new("uploads").exists(), existed_before.0);
        assert_eq!(std::path::Path::new("reports").exists(), existed_before.1);
    }

    #[test]
    fn demo_state_is_ready_without_config() {
        let state = AppState::new(None, true);
        assert!(state.ai_ready());
        let analyzers = state.analyzers.as_ref().unwrap();
        assert_eq!(analyzers.compliance.model_id(), "demo/canned-analyzer");
    }
}
