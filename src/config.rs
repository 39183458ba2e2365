//! Application configuration loaded from a YAML file.
//!
//! One struct holds every knob — server binding, upload limits, directories,
//! and the remote model credentials — so the whole runtime configuration can
//! be constructed once at startup and passed around explicitly. There is no
//! process-global config.
//!
//! A missing or unparseable file is an error the *caller* decides how to
//! handle: the server treats it as "run with analysis disabled", the CLI
//! treats it as fatal for `serve` without `--demo`.

use crate::error::GuardError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Shipped placeholder for `watsonx.api_key`; analysis stays disabled until replaced.
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";
/// Shipped placeholder for `watsonx.project_id`.
pub const PLACEHOLDER_PROJECT_ID: &str = "your_project_id_here";

/// Top-level application configuration.
///
/// Mirrors the YAML layout:
///
/// ```yaml
/// app:
///   host: 0.0.0.0
///   port: 5000
///   debug: false
///   max_file_size: 16        # MB
///   allowed_extensions: [.pdf, .docx, .xlsx, .xls, .csv]
///   upload_folder: uploads
///   report_folder: reports
/// watsonx:
///   url: https://us-south.ml.cloud.ibm.com
///   api_key: your_api_key_here
///   project_id: your_project_id_here
/// model:
///   model_id: ibm/granite-3-8b-instruct
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub watsonx: WatsonxSettings,
    pub model: ModelSettings,
}

/// Web front-end settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub debug: bool,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Accepted upload extensions, with or without a leading dot.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_upload_folder")]
    pub upload_folder: PathBuf,
    #[serde(default = "default_report_folder")]
    pub report_folder: PathBuf,
}

/// Remote endpoint credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct WatsonxSettings {
    pub url: String,
    pub api_key: String,
    pub project_id: String,
}

/// Model selection.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    pub model_id: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_max_file_size() -> u64 {
    16
}
fn default_allowed_extensions() -> Vec<String> {
    [".pdf", ".docx", ".xlsx", ".xls", ".csv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_upload_folder() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_report_folder() -> PathBuf {
    PathBuf::from("reports")
}

impl AppConfig {
    /// Load and parse the configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GuardError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GuardError::ConfigMissing {
                    path: path.to_path_buf(),
                }
            } else {
                GuardError::ConfigInvalid {
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                }
            }
        })?;

        serde_yaml::from_str(&raw).map_err(|e| GuardError::ConfigInvalid {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Whether the shipped placeholder credentials have been replaced.
    ///
    /// Placeholders keep the server runnable out of the box: analysis is
    /// disabled and `/config-status` reports a warning instead of the
    /// process refusing to start.
    pub fn credentials_configured(&self) -> bool {
        self.watsonx.api_key != PLACEHOLDER_API_KEY
            && self.watsonx.project_id != PLACEHOLDER_PROJECT_ID
    }

    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        (self.app.max_file_size as usize) * 1024 * 1024
    }

    /// Whether `extension` (no leading dot, any case) is on the allow-list.
    pub fn extension_allowed(&self, extension: &str) -> bool {
        let ext = extension.to_ascii_lowercase();
        self.app
            .allowed_extensions
            .iter()
            .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }

    /// Create the upload and report directories if they do not exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.app.upload_folder)?;
        std::fs::create_dir_all(&self.app.report_folder)
    }
}
