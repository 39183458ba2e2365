//! Analysis orchestration: prompt building, the provider call, and response
//! normalisation.
//!
//! [`analyze`] is the only entry point and it **never fails**: a provider
//! error becomes an error-flagged [`AnalysisResult`] whose sole finding is
//! the error text. The upload handler can therefore always return both
//! result sets to the client, which is the whole point of the pipeline —
//! a flaky model call must not turn into a 500.
//!
//! ## Normalisation
//!
//! Hosted models answer the "nothing found" case inconsistently: an empty
//! string, the exact sentinel the prompt asked for, a canned one-liner, or a
//! fragment too short to mean anything. [`normalize_response`] folds all of
//! those into two fixed messages so the report reads the same regardless of
//! which degenerate shape the model picked.

pub mod demo;
pub mod provider;
pub mod remote;

pub use demo::CannedAnalyzer;
pub use provider::AnalysisProvider;
pub use remote::WatsonxProvider;

use crate::prompts;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

/// Which of the two fixed prompts to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Compliance,
    Fraud,
}

impl AnalysisKind {
    /// Human-readable label recorded in results and report headings.
    pub fn analysis_type(&self) -> &'static str {
        match self {
            AnalysisKind::Compliance => "Compliance Check",
            AnalysisKind::Fraud => "Fraud Detection",
        }
    }
}

/// Outcome of one analysis call. Owned by the request that produced it;
/// never persisted beyond the rendered report.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub kind: AnalysisKind,
    /// Ordered findings; currently always a single entry (the normalised
    /// model response or an error message).
    pub findings: Vec<String>,
    /// Model identifier for audit display.
    pub model_id: String,
    /// Label such as "Compliance Check".
    pub analysis_type: String,
    /// RFC 3339 timestamp of when the analysis completed.
    pub timestamp: String,
    /// True when the provider call failed and `findings` holds the error text.
    pub error: bool,
}

/// Run one analysis kind over `document_text`.
///
/// The text is truncated to [`prompts::MAX_PROMPT_DOCUMENT_CHARS`] before the
/// prompt is built. Returns a result in every case — see the module docs.
pub async fn analyze(
    provider: &Arc<dyn AnalysisProvider>,
    document_text: &str,
    kind: AnalysisKind,
) -> AnalysisResult {
    let truncated = prompts::truncate_for_prompt(document_text);
    let prompt = match kind {
        AnalysisKind::Compliance => prompts::compliance_prompt(truncated),
        AnalysisKind::Fraud => prompts::fraud_prompt(truncated),
    };

    match provider.generate(kind, &prompt).await {
        Ok(raw) => {
            debug!(kind = ?kind, raw_len = raw.len(), "raw model output received");
            let finding = normalize_response(kind, &raw);
            AnalysisResult {
                kind,
                findings: vec![finding],
                model_id: provider.model_id().to_string(),
                analysis_type: kind.analysis_type().to_string(),
                timestamp: Utc::now().to_rfc3339(),
                error: false,
            }
        }
        Err(e) => {
            error!(kind = ?kind, "analysis call failed: {e}");
            AnalysisResult {
                kind,
                findings: vec![format!("Error during analysis: {e}")],
                model_id: provider.model_id().to_string(),
                analysis_type: kind.analysis_type().to_string(),
                timestamp: Utc::now().to_rfc3339(),
                error: true,
            }
        }
    }
}

/// Run the compliance and fraud analyses concurrently over the same text.
///
/// Both calls share one extracted-text instance within one request; there is
/// no cross-request state.
pub async fn analyze_both(
    compliance: &Arc<dyn AnalysisProvider>,
    fraud: &Arc<dyn AnalysisProvider>,
    document_text: &str,
) -> (AnalysisResult, AnalysisResult) {
    tokio::join!(
        analyze(compliance, document_text, AnalysisKind::Compliance),
        analyze(fraud, document_text, AnalysisKind::Fraud),
    )
}

/// Fold degenerate model responses into fixed messages.
fn normalize_response(kind: AnalysisKind, raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return prompts::NO_SUBSTANTIVE_ANALYSIS.to_string();
    }

    match kind {
        AnalysisKind::Compliance => {
            if trimmed.eq_ignore_ascii_case(prompts::COMPLIANCE_SENTINEL)
                || trimmed.eq_ignore_ascii_case(&format!("{}.", prompts::COMPLIANCE_SENTINEL))
            {
                return prompts::COMPLIANCE_CLEAN.to_string();
            }
        }
        AnalysisKind::Fraud => {
            let canned = prompts::FRAUD_NEGATIVE_PHRASES
                .iter()
                .any(|p| trimmed.eq_ignore_ascii_case(p));
            if canned || trimmed.chars().count() < prompts::MIN_FRAUD_RESPONSE_CHARS {
                return prompts::NO_SUBSTANTIVE_ANALYSIS.to_string();
            }
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use async_trait::async_trait;

    /// Scripted provider: returns a fixed response or a fixed error.
    struct Scripted {
        response: Result<String, ()>,
    }

    #[async_trait]
    impl AnalysisProvider for Scripted {
        async fn generate(
            &self,
            _kind: AnalysisKind,
            _prompt: &str,
        ) -> Result<String, ProviderError> {
            self.response
                .clone()
                .map_err(|_| ProviderError::Request("connection refused".into()))
        }

        fn model_id(&self) -> &str {
            "test/scripted"
        }
    }

    fn scripted(response: Result<&str, ()>) -> Arc<dyn AnalysisProvider> {
        Arc::new(Scripted {
            response: response.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn sentinel_response_becomes_positive_confirmation() {
        let provider = scripted(Ok("no compliance issues found"));
        let result = analyze(&provider, "ledger", AnalysisKind::Compliance).await;
        assert_eq!(result.findings, vec![prompts::COMPLIANCE_CLEAN.to_string()]);
        assert!(!result.error);
    }

    #[tokio::test]
    async fn sentinel_with_trailing_period_also_normalized() {
        // The prompt instruction itself punctuates the sentinel, so models
        // routinely echo it with a final period.
        let provider = scripted(Ok("No compliance issues found."));
        let result = analyze(&provider, "ledger", AnalysisKind::Compliance).await;
        assert_eq!(result.findings, vec![prompts::COMPLIANCE_CLEAN.to_string()]);
    }

    #[tokio::test]
    async fn short_fraud_response_is_replaced() {
        let provider = scripted(Ok("Looks fine."));
        let result = analyze(&provider, "ledger", AnalysisKind::Fraud).await;
        assert_eq!(
            result.findings,
            vec![prompts::NO_SUBSTANTIVE_ANALYSIS.to_string()]
        );
    }

    #[tokio::test]
    async fn canned_negative_fraud_phrase_is_replaced_case_insensitively() {
        let provider = scripted(Ok("No Fraud Indicators Detected."));
        let result = analyze(&provider, "ledger", AnalysisKind::Fraud).await;
        assert_eq!(
            result.findings,
            vec![prompts::NO_SUBSTANTIVE_ANALYSIS.to_string()]
        );
    }

    #[tokio::test]
    async fn substantive_response_is_kept_verbatim() {
        let long = "Several invoices reference the same PO number with differing amounts, \
                    which is a classic duplicate-billing pattern.";
        let provider = scripted(Ok(long));
        let result = analyze(&provider, "ledger", AnalysisKind::Fraud).await;
        assert_eq!(result.findings, vec![long.to_string()]);
        assert_eq!(result.model_id, "test/scripted");
        assert!(!result.timestamp.is_empty());
    }

    #[tokio::test]
    async fn empty_response_is_replaced_for_both_kinds() {
        for kind in [AnalysisKind::Compliance, AnalysisKind::Fraud] {
            let provider = scripted(Ok("   \n  "));
            let result = analyze(&provider, "ledger", kind).await;
            assert_eq!(
                result.findings,
                vec![prompts::NO_SUBSTANTIVE_ANALYSIS.to_string()]
            );
        }
    }

    #[tokio::test]
    async fn provider_failure_never_propagates() {
        let provider = scripted(Err(()));
        let result = analyze(&provider, "ledger", AnalysisKind::Compliance).await;
        assert!(result.error);
        assert_eq!(result.findings.len(), 1);
        assert!(result.findings[0].starts_with("Error during analysis:"));
        assert!(result.findings[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn oversized_document_is_truncated_before_prompting() {
        /// Captures the prompt it was handed.
        struct Capturing(std::sync::Mutex<usize>);

        #[async_trait]
        impl AnalysisProvider for Capturing {
            async fn generate(
                &self,
                _kind: AnalysisKind,
                prompt: &str,
            ) -> Result<String, ProviderError> {
                *self.0.lock().unwrap() = prompt.len();
                Ok("long enough response to survive the fraud length check".into())
            }
            fn model_id(&self) -> &str {
                "test/capturing"
            }
        }

        let capturing = Arc::new(Capturing(std::sync::Mutex::new(0)));
        let provider: Arc<dyn AnalysisProvider> = capturing.clone();
        let huge = "x".repeat(prompts::MAX_PROMPT_DOCUMENT_CHARS * 3);
        analyze(&provider, &huge, AnalysisKind::Fraud).await;

        let prompt_len = *capturing.0.lock().unwrap();
        // Prompt = template + at most MAX_PROMPT_DOCUMENT_CHARS of document.
        assert!(prompt_len < prompts::MAX_PROMPT_DOCUMENT_CHARS + 500);
    }

    #[tokio::test]
    async fn analyze_both_pairs_kinds_correctly() {
        let provider = scripted(Ok(
            "A sufficiently long substantive response for either analysis kind.",
        ));
        let (c, f) = analyze_both(&provider, &provider, "ledger").await;
        assert_eq!(c.kind, AnalysisKind::Compliance);
        assert_eq!(f.kind, AnalysisKind::Fraud);
        assert_eq!(c.analysis_type, "Compliance Check");
        assert_eq!(f.analysis_type, "Fraud Detection");
    }
}
