//! Report rendering: HTML first, PDF if the external rasteriser is present.
//!
//! The HTML document is always built and is the single source of truth for
//! report content. PDF output is a best-effort extra: we look for a
//! `wkhtmltopdf` binary (fixed install paths on Windows, `PATH` elsewhere)
//! and shell out to it; if the binary is missing or the subprocess fails for
//! any reason, the HTML file is written verbatim and its path returned.
//! Report generation therefore degrades, it does not fail, as long as the
//! output directory is writable.

use crate::analysis::AnalysisResult;
use crate::error::GuardError;
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

/// Which artifact ended up on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Html,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "PDF",
            ReportFormat::Html => "HTML",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Html => "html",
        }
    }
}

/// A report written once to the report directory; never mutated afterwards.
#[derive(Debug)]
pub struct RenderedReport {
    pub path: PathBuf,
    pub format: ReportFormat,
}

/// Render the analysis results for `document_name` into `output_dir`.
///
/// Tries PDF via the discovered renderer binary, falls back to HTML. The
/// file name is `Compliance_Report_<document_name>_<timestamp>.<ext>` with a
/// `%Y%m%d_%H%M%S` timestamp — unique per run at one-second resolution only.
pub fn render_report(
    document_name: &str,
    compliance: &AnalysisResult,
    fraud: &AnalysisResult,
    output_dir: &Path,
) -> Result<RenderedReport, GuardError> {
    render_report_with(
        wkhtmltopdf_path().as_deref(),
        document_name,
        compliance,
        fraud,
        output_dir,
    )
}

/// Like [`render_report`] but with an explicit renderer binary (or `None` to
/// skip PDF entirely). Split out so tests can exercise the fallback without
/// depending on what happens to be installed.
pub fn render_report_with(
    renderer: Option<&Path>,
    document_name: &str,
    compliance: &AnalysisResult,
    fraud: &AnalysisResult,
    output_dir: &Path,
) -> Result<RenderedReport, GuardError> {
    std::fs::create_dir_all(output_dir).map_err(|e| GuardError::ReportWriteFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let stem = format!("Compliance_Report_{document_name}_{timestamp}");
    let html = build_html(document_name, compliance, fraud);

    if let Some(renderer) = renderer {
        let pdf_path = output_dir.join(format!("{stem}.{}", ReportFormat::Pdf.extension()));
        match rasterize_pdf(renderer, &html, &pdf_path) {
            Ok(()) => {
                info!(path = %pdf_path.display(), "PDF report generated");
                return Ok(RenderedReport {
                    path: pdf_path,
                    format: ReportFormat::Pdf,
                });
            }
            Err(e) => {
                warn!("PDF generation failed, falling back to HTML: {e}");
            }
        }
    }

    let html_path = output_dir.join(format!("{stem}.{}", ReportFormat::Html.extension()));
    std::fs::write(&html_path, &html).map_err(|e| GuardError::ReportWriteFailed {
        path: html_path.clone(),
        source: e,
    })?;
    info!(path = %html_path.display(), "HTML report generated");
    Ok(RenderedReport {
        path: html_path,
        format: ReportFormat::Html,
    })
}

/// Locate the wkhtmltopdf binary.
///
/// Windows installers use two fixed locations; elsewhere the binary is
/// expected on `PATH` and its absence is discovered at spawn time (handled
/// by the fallback in [`render_report_with`]).
fn wkhtmltopdf_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        const GUESSES: [&str; 2] = [
            r"C:\Program Files\wkhtmltopdf\bin\wkhtmltopdf.exe",
            r"C:\Program Files (x86)\wkhtmltopdf\bin\wkhtmltopdf.exe",
        ];
        GUESSES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }
    #[cfg(not(windows))]
    {
        Some(PathBuf::from("wkhtmltopdf"))
    }
}

/// Shell out to the rasteriser: HTML goes in via a temp file, PDF comes out
/// at `pdf_path`. Any spawn/exit-status problem is an `Err` the caller turns
/// into the HTML fallback.
fn rasterize_pdf(renderer: &Path, html: &str, pdf_path: &Path) -> std::io::Result<()> {
    let mut html_file = tempfile::Builder::new().suffix(".html").tempfile()?;
    html_file.write_all(html.as_bytes())?;
    html_file.flush()?;

    let status = Command::new(renderer)
        .arg("--encoding")
        .arg("UTF-8")
        .arg("--quiet")
        .args(["--margin-top", "15mm", "--margin-bottom", "15mm"])
        .args(["--margin-left", "15mm", "--margin-right", "15mm"])
        .arg(html_file.path())
        .arg(pdf_path)
        .status()?;

    if !status.success() {
        return Err(std::io::Error::other(format!(
            "wkhtmltopdf exited with {status}"
        )));
    }
    Ok(())
}

/// Build the full report HTML. Fixed template: header, two labeled sections,
/// one `<div>` per finding, footer.
fn build_html(document_name: &str, compliance: &AnalysisResult, fraud: &AnalysisResult) -> String {
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Compliance Report - {document_name}</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; margin: 0; padding: 20px; }}
        .header {{ text-align: center; border-bottom: 2px solid #3498db; padding-bottom: 10px; }}
        h1 {{ color: #2c3e50; }}
        h2 {{ color: #3498db; border-bottom: 1px solid #eee; padding-bottom: 5px; }}
        .finding {{ margin-bottom: 15px; padding: 10px; border-left: 4px solid #3498db; }}
        .severity-high {{ border-left-color: #e74c3c; background-color: #fadbd8; }}
        .severity-medium {{ border-left-color: #f39c12; background-color: #fdebd0; }}
        .severity-low {{ border-left-color: #2ecc71; background-color: #d5f5e3; }}
        .timestamp {{ color: #7f8c8d; font-size: 0.9em; text-align: right; }}
        .footer {{ font-size: 0.8em; text-align: center; color: #7f8c8d; margin-top: 30px; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>Document Screening Report</h1>
        <p>Document: <strong>{document_name}</strong></p>
        <p class="timestamp">Generated on {generated}</p>
    </div>

    <h2>Compliance Findings</h2>
{compliance_findings}
    <h2>Fraud Indicators</h2>
{fraud_findings}
    <div class="footer">
        <p>Confidential - Generated by docguard | model: {model_id}</p>
    </div>
</body>
</html>
"#,
        compliance_findings = format_findings(&compliance.findings),
        fraud_findings = format_findings(&fraud.findings),
        model_id = compliance.model_id,
    )
}

/// Render a finding list as one styled `<div>` each.
fn format_findings(findings: &[String]) -> String {
    if findings.is_empty() {
        return "    <p>No issues detected.</p>\n".to_string();
    }
    findings
        .iter()
        .map(|finding| {
            format!(
                "    <div class=\"finding {}\">{}</div>\n",
                severity_class(finding),
                escape_html(finding).replace('\n', "<br>"),
            )
        })
        .collect()
}

/// Cosmetic severity styling from a substring match on the finding text.
///
/// This styles the report only — it is not a risk model and nothing else in
/// the pipeline consumes it.
fn severity_class(finding: &str) -> &'static str {
    let lower = finding.to_lowercase();
    if lower.contains("high") {
        "severity-high"
    } else if lower.contains("low") {
        "severity-low"
    } else {
        "severity-medium"
    }
}

/// Minimal HTML escaping for finding text interpolated into the template.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisKind, AnalysisResult};

    fn result(kind: AnalysisKind, findings: &[&str]) -> AnalysisResult {
        AnalysisResult {
            kind,
            findings: findings.iter().map(|s| s.to_string()).collect(),
            model_id: "test/model".into(),
            analysis_type: kind.analysis_type().into(),
            timestamp: "2025-01-01T00:00:00Z".into(),
            error: false,
        }
    }

    #[test]
    fn severity_class_substring_rules() {
        assert_eq!(severity_class("HIGH RISK: wire fraud"), "severity-high");
        assert_eq!(severity_class("low risk only"), "severity-low");
        assert_eq!(severity_class("something else"), "severity-medium");
        // "high" wins when both words appear
        assert_eq!(severity_class("high and low"), "severity-high");
    }

    #[test]
    fn html_contains_both_sections_and_findings() {
        let c = result(AnalysisKind::Compliance, &["GDPR exposure in section 2"]);
        let f = result(AnalysisKind::Fraud, &["duplicate invoice pattern"]);
        let html = build_html("q4_report.pdf", &c, &f);
        assert!(html.contains("Compliance Findings"));
        assert!(html.contains("Fraud Indicators"));
        assert!(html.contains("GDPR exposure in section 2"));
        assert!(html.contains("duplicate invoice pattern"));
        assert!(html.contains("q4_report.pdf"));
    }

    #[test]
    fn finding_text_is_escaped_and_newlines_become_breaks() {
        let c = result(AnalysisKind::Compliance, &["a < b\nsecond line"]);
        let f = result(AnalysisKind::Fraud, &[]);
        let html = build_html("doc", &c, &f);
        assert!(html.contains("a &lt; b<br>second line"));
        assert!(html.contains("<p>No issues detected.</p>"));
    }

    #[test]
    fn absent_renderer_falls_back_to_html() {
        let dir = tempfile::tempdir().unwrap();
        let c = result(AnalysisKind::Compliance, &["finding one"]);
        let f = result(AnalysisKind::Fraud, &["finding two"]);

        let report = render_report_with(
            Some(Path::new("/definitely/not/wkhtmltopdf")),
            "sample.csv",
            &c,
            &f,
            dir.path(),
        )
        .unwrap();

        assert_eq!(report.format, ReportFormat::Html);
        let contents = std::fs::read_to_string(&report.path).unwrap();
        assert!(contents.contains("finding one"));
        let name = report.path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("Compliance_Report_sample.csv_"));
        assert!(name.ends_with(".html"));
    }

    #[test]
    fn no_renderer_at_all_writes_html() {
        let dir = tempfile::tempdir().unwrap();
        let c = result(AnalysisKind::Compliance, &["x"]);
        let f = result(AnalysisKind::Fraud, &["y"]);
        let report = render_report_with(None, "doc", &c, &f, dir.path()).unwrap();
        assert_eq!(report.format, ReportFormat::Html);
        assert!(report.path.exists());
    }

    #[test]
    fn unwritable_output_dir_is_report_write_failed() {
        let c = result(AnalysisKind::Compliance, &["x"]);
        let f = result(AnalysisKind::Fraud, &["y"]);
        let err = render_report_with(
            None,
            "doc",
            &c,
            &f,
            Path::new("/proc/definitely-not-writable/reports"),
        )
        .unwrap_err();
        assert!(matches!(err, GuardError::ReportWriteFailed { .. }));
    }
}
