//! CLI binary for docguard.
//!
//! A thin shim over the library crate: `serve` runs the HTTP front end,
//! `demo` runs the whole pipeline once over a built-in sample document
//! with the canned analyzer (no credentials, no network).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docguard::analysis::{self, AnalysisProvider, AnalysisResult, CannedAnalyzer};
use docguard::report::render_report;
use docguard::server::AppState;
use docguard::AppConfig;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve with a real configuration
  docguard serve --config config/config.yaml

  # Serve without credentials (upload/analysis use the canned analyzer)
  docguard serve --demo

  # Run the full pipeline once, offline, over a built-in sample document
  docguard demo

ENDPOINTS (serve mode):
  POST /upload               multipart form, "file" field (.pdf .docx .xlsx .xls .csv)
  GET  /download/<filename>  fetch a generated report
  GET  /health               liveness + analyzer readiness
  GET  /config-status        credential/configuration state

SETUP:
  1. Copy config/config.example.yaml to config/config.yaml
  2. Replace the placeholder api_key and project_id with real credentials
  3. docguard serve

  wkhtmltopdf on PATH enables PDF reports; without it reports are HTML.
"#;

/// Screen business documents for compliance and fraud signals.
#[derive(Parser, Debug)]
#[command(
    name = "docguard",
    version,
    about = "AI-assisted compliance and fraud screening for business documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCGUARD_VERBOSE")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server.
    Serve {
        /// Path to the YAML configuration file.
        #[arg(short, long, env = "DOCGUARD_CONFIG", default_value = "config/config.yaml")]
        config: PathBuf,

        /// Use the offline canned analyzer instead of the remote model.
        #[arg(long)]
        demo: bool,
    },

    /// Analyze a built-in sample document offline and write a report.
    Demo {
        /// Directory to write the report into.
        #[arg(short, long, default_value = "reports")]
        output: PathBuf,
    },
}

/// Sample document for the offline demo: deliberately trips most of the
/// canned analyzer's rules.
const SAMPLE_DOCUMENT: &str = "\
CONFIDENTIAL BUSINESS DOCUMENT

Financial Report - Q4 2024

This document contains sensitive financial information including:
- Revenue projections
- Cost analysis
- Strategic planning data

URGENT: Payment Processing

We require immediate wire transfer to account number 1234567890
Routing number: 987654321
Amount: $50,000

This is a confidential business transaction that requires urgent attention.
Please process this payment immediately to avoid delays.

Personal Data Notice:
This document may contain personal identifiable information (PII)
of employees and customers. Handle with appropriate care.

Contract Amendment:
The existing service agreement is hereby amended to include
additional terms and conditions as outlined below.

This is a duplicate invoice for services rendered.
Please review and process accordingly.

End of Document
";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve { config, demo } => serve(config, demo).await,
        Command::Demo { output } => run_demo(output).await,
    }
}

async fn serve(config_path: PathBuf, demo: bool) -> Result<()> {
    // A missing or broken config is not fatal: the server starts with
    // analysis disabled and reports the problem on /config-status.
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            if let Err(e) = cfg.ensure_directories() {
                eprintln!("{} could not create working directories: {e}", yellow("⚠"));
            }
            Some(cfg)
        }
        Err(e) => {
            eprintln!("{} {e}", yellow("⚠"));
            None
        }
    };

    let state = Arc::new(AppState::new(config, demo));
    docguard::server::serve(state)
        .await
        .context("Server terminated abnormally")
}

async fn run_demo(output: PathBuf) -> Result<()> {
    println!("{}", bold("docguard — offline demo"));
    println!("{}", dim("analyzing built-in sample document, no network calls"));
    println!();

    let provider: Arc<dyn AnalysisProvider> = Arc::new(CannedAnalyzer::new());
    let (compliance, fraud) =
        analysis::analyze_both(&provider, &provider, SAMPLE_DOCUMENT).await;

    print_results(&compliance);
    print_results(&fraud);

    let report = render_report("sample_document.txt", &compliance, &fraud, &output)
        .context("Failed to write demo report")?;
    println!(
        "{} report written: {} ({})",
        green("✔"),
        bold(&report.path.display().to_string()),
        report.format.as_str(),
    );

    Ok(())
}

fn print_results(result: &AnalysisResult) {
    println!("{}", bold(&result.analysis_type));
    for finding in &result.findings {
        for line in finding.lines() {
            println!("  {line}");
        }
    }
    println!();
}
