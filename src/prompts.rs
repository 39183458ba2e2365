//! Prompt templates and sentinel phrases for the two analysis kinds.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the sentinel phrase the compliance prompt
//!    instructs the model to emit and the phrase the normaliser matches
//!    against are the same constant, so they cannot drift apart.
//!
//! 2. **Testability** — unit tests can inspect prompts and normalisation
//!    messages directly without calling a real model.

/// Hard cap on how much document text is embedded in a prompt.
///
/// Applied before template substitution; not configurable per call.
pub const MAX_PROMPT_DOCUMENT_CHARS: usize = 4000;

/// Exact phrase the compliance prompt asks the model to return when it finds
/// nothing. Matched case-insensitively during normalisation.
pub const COMPLIANCE_SENTINEL: &str = "NO COMPLIANCE ISSUES FOUND";

/// Canned negative phrases some models emit for the fraud prompt.
/// Matched case-insensitively; treated the same as an empty response.
pub const FRAUD_NEGATIVE_PHRASES: [&str; 2] =
    ["no fraud indicators detected.", "no issues detected."];

/// Fraud responses shorter than this are considered degenerate.
pub const MIN_FRAUD_RESPONSE_CHARS: usize = 40;

/// Replacement for an empty or degenerate model response.
pub const NO_SUBSTANTIVE_ANALYSIS: &str =
    "No substantive analysis returned by the model. Try a simpler document or a different model.";

/// Replacement for a compliance response that equals the sentinel.
pub const COMPLIANCE_CLEAN: &str = "✅ No compliance issues found in this document.";

/// Build the compliance-check prompt around the (already truncated) document text.
pub fn compliance_prompt(document_text: &str) -> String {
    format!(
        r#"You are a financial compliance expert. Carefully review the following document for any compliance or regulatory violations (such as SOX, GDPR, CCPA, etc.).

If you find any issues, list each violation with:
- The regulation or law potentially violated
- The specific text or data from the document that is problematic
- A brief explanation of why it is a violation

If the document is fully compliant and you find no issues, reply exactly with: {COMPLIANCE_SENTINEL}.

Do NOT copy large sections of the document. Only summarize findings or state '{COMPLIANCE_SENTINEL}'.

Document:
{document_text}"#
    )
}

/// Build the fraud-check prompt around the (already truncated) document text.
pub fn fraud_prompt(document_text: &str) -> String {
    format!(
        "Analyze the following financial document for signs of fraud or suspicious activity. \
         Summarize any findings.\n\nDocument:\n{document_text}"
    )
}

/// Truncate `text` to [`MAX_PROMPT_DOCUMENT_CHARS`] characters.
///
/// Counted in `char`s, not bytes, so multi-byte input never splits a
/// character at the cut point.
pub fn truncate_for_prompt(text: &str) -> &str {
    match text.char_indices().nth(MAX_PROMPT_DOCUMENT_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compliance_prompt_embeds_sentinel_and_document() {
        let p = compliance_prompt("quarterly ledger");
        assert!(p.contains(COMPLIANCE_SENTINEL));
        assert!(p.ends_with("quarterly ledger"));
    }

    #[test]
    fn fraud_prompt_is_single_instruction() {
        let p = fraud_prompt("invoice 42");
        assert!(p.starts_with("Analyze the following financial document"));
        assert!(p.ends_with("invoice 42"));
    }

    #[test]
    fn truncation_is_char_boundary_safe() {
        let text = "é".repeat(MAX_PROMPT_DOCUMENT_CHARS + 100);
        let cut = truncate_for_prompt(&text);
        assert_eq!(cut.chars().count(), MAX_PROMPT_DOCUMENT_CHARS);
    }

    #[test]
    fn short_text_passes_through_untouched() {
        assert_eq!(truncate_for_prompt("short"), "short");
    }
}
