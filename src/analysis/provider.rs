//! The `AnalysisProvider` trait — the seam between the analysis pipeline and
//! whatever produces model text.
//!
//! Two implementations exist: [`crate::analysis::remote::WatsonxProvider`]
//! (the real hosted endpoint) and [`crate::analysis::demo::CannedAnalyzer`]
//! (an offline double for demos and tests). Keeping the double behind the
//! same trait keeps its keyword heuristics out of the real call path.

use crate::analysis::AnalysisKind;
use crate::error::ProviderError;
use async_trait::async_trait;

/// Produces free-form model text for an analysis prompt.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Generate a response for `prompt`. `kind` is advisory — the remote
    /// provider ignores it (the prompt already differs per kind), the canned
    /// double uses it to pick its response table.
    async fn generate(&self, kind: AnalysisKind, prompt: &str) -> Result<String, ProviderError>;

    /// Identifier recorded in every [`crate::analysis::AnalysisResult`] for
    /// audit display.
    fn model_id(&self) -> &str;
}
