//! Offline demo double for the analysis provider.
//!
//! `CannedAnalyzer` simulates model responses with a small keyword table so
//! the whole upload-to-report flow can be exercised without credentials.
//! It is a **placeholder double**, not business logic: the keyword rules are
//! intentionally confined to this module and reachable only when the caller
//! explicitly wires the demo provider in (`docguard serve --demo`).

use crate::analysis::provider::AnalysisProvider;
use crate::analysis::AnalysisKind;
use crate::error::ProviderError;
use async_trait::async_trait;

/// Model id reported by the demo double, so reports and `/config-status`
/// make the offline mode obvious.
pub const DEMO_MODEL_ID: &str = "demo/canned-analyzer";

/// Keyword-triggered canned responses, one table per analysis kind.
///
/// Each entry fires when *all* its needles appear (case-insensitively) in
/// the document portion of the prompt.
const COMPLIANCE_RULES: &[(&[&str], &str)] = &[
    (
        &["confidential", "public"],
        "MEDIUM RISK: Potential disclosure of confidential information in public context. \
         Review document for proper classification and access controls.",
    ),
    (
        &["financial", "unauthorized"],
        "HIGH RISK: Unauthorized financial transactions detected. \
         Immediate review required for SOX compliance and fraud prevention.",
    ),
    (
        &["personal data"],
        "HIGH RISK: Personal Identifiable Information (PII) found. \
         Ensure GDPR/CCPA compliance and proper data handling procedures.",
    ),
    (
        &["pii"],
        "HIGH RISK: Personal Identifiable Information (PII) found. \
         Ensure GDPR/CCPA compliance and proper data handling procedures.",
    ),
    (
        &["contract", "amendment"],
        "MEDIUM RISK: Contract amendment detected. \
         Verify proper approval workflow and legal review processes.",
    ),
];

const FRAUD_RULES: &[(&[&str], &str)] = &[
    (
        &["urgent", "payment"],
        "HIGH RISK: Urgent payment request detected. \
         Verify authenticity and follow proper verification procedures.",
    ),
    (
        &["wire transfer", "immediate"],
        "MEDIUM RISK: Immediate wire transfer request. \
         Review for potential business email compromise (BEC) fraud.",
    ),
    (
        &["account number", "routing"],
        "MEDIUM RISK: Banking information in document. \
         Ensure proper security controls and access restrictions.",
    ),
    (
        &["invoice", "duplicate"],
        "LOW RISK: Potential duplicate invoice detected. \
         Review for billing accuracy and prevent overpayment.",
    ),
];

const ALL_CLEAR: &str = "LOW RISK: No significant issues detected. \
                         Document appears to follow standard business practices.";

/// Infallible [`AnalysisProvider`] that answers from the keyword tables.
#[derive(Debug, Default)]
pub struct CannedAnalyzer;

impl CannedAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn respond(kind: AnalysisKind, document: &str) -> String {
        let haystack = document.to_lowercase();
        let rules = match kind {
            AnalysisKind::Compliance => COMPLIANCE_RULES,
            AnalysisKind::Fraud => FRAUD_RULES,
        };

        let mut hits: Vec<&str> = rules
            .iter()
            .filter(|(needles, _)| needles.iter().all(|n| haystack.contains(n)))
            .map(|(_, response)| *response)
            .collect();
        hits.dedup();

        if hits.is_empty() {
            ALL_CLEAR.to_string()
        } else {
            hits.join("\n")
        }
    }
}

#[async_trait]
impl AnalysisProvider for CannedAnalyzer {
    async fn generate(&self, kind: AnalysisKind, prompt: &str) -> Result<String, ProviderError> {
        // Match only against the document portion of the prompt, not the
        // instruction template (which mentions words like "financial").
        // The first "Document:" is the template's marker; the document text
        // may contain the same string and must stay intact past it.
        let document = prompt
            .split_once("Document:")
            .map(|(_, doc)| doc)
            .unwrap_or(prompt);
        Ok(Self::respond(kind, document))
    }

    fn model_id(&self) -> &str {
        DEMO_MODEL_ID
    }
}
