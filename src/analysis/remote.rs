//! Remote provider for IBM watsonx.ai text generation.
//!
//! Two HTTP round-trips are involved:
//!
//! 1. **IAM token exchange** — the configured API key is traded for a bearer
//!    token at the IBM Cloud identity service. Tokens are valid for about an
//!    hour; we cache one and refresh a minute before expiry so concurrent
//!    requests do not each pay the exchange.
//! 2. **Generation call** — `POST {url}/ml/v1/text/generation` with the
//!    model id, project id, and prompt; the generated text comes back in
//!    `results[0].generated_text`.
//!
//! Both failure modes surface as [`ProviderError`]; the caller
//! ([`crate::analysis::analyze`]) converts them into error-flagged results
//! rather than propagating.

use crate::analysis::provider::AnalysisProvider;
use crate::analysis::AnalysisKind;
use crate::config::AppConfig;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// IBM Cloud identity endpoint used for the API-key-to-token exchange.
const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// watsonx.ai REST API version pin.
const API_VERSION: &str = "2023-05-29";

/// Upper bound on generated tokens per analysis call.
const MAX_NEW_TOKENS: u32 = 500;

/// Refresh the cached IAM token this long before its reported expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// [`AnalysisProvider`] backed by the hosted watsonx.ai generation endpoint.
pub struct WatsonxProvider {
    client: reqwest::Client,
    endpoint_url: String,
    api_key: String,
    project_id: String,
    model_id: String,
    token: Mutex<Option<CachedToken>>,
}

impl WatsonxProvider {
    /// Build a provider from the loaded configuration.
    ///
    /// Fails only on client construction; credentials are not validated
    /// until the first call (the caller already screened placeholders).
    pub fn new(config: &AppConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        info!(
            model_id = %config.model.model_id,
            endpoint = %config.watsonx.url,
            "initialized watsonx provider"
        );

        Ok(Self {
            client,
            endpoint_url: config.watsonx.url.trim_end_matches('/').to_string(),
            api_key: config.watsonx.api_key.clone(),
            project_id: config.watsonx.project_id.clone(),
            model_id: config.model.model_id.clone(),
            token: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, exchanging the API key if the cached one
    /// is missing or close to expiry.
    async fn bearer_token(&self) -> Result<String, ProviderError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(cached.token.clone());
            }
        }

        debug!("exchanging API key for IAM token");
        let response = self
            .client
            .post(IAM_TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::TokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::TokenExchange(format!(
                "HTTP {status}: {body}"
            )));
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: u64,
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::TokenExchange(e.to_string()))?;

        let token = parsed.access_token.clone();
        *guard = Some(CachedToken {
            token: parsed.access_token,
            expires_at: Instant::now() + Duration::from_secs(parsed.expires_in),
        });
        Ok(token)
    }
}

#[async_trait]
impl AnalysisProvider for WatsonxProvider {
    async fn generate(&self, _kind: AnalysisKind, prompt: &str) -> Result<String, ProviderError> {
        let token = self.bearer_token().await?;
        let url = format!(
            "{}/ml/v1/text/generation?version={API_VERSION}",
            self.endpoint_url
        );

        let body = serde_json::json!({
            "model_id": self.model_id,
            "project_id": self.project_id,
            "input": prompt,
            "parameters": {
                "decoding_method": "greedy",
                "max_new_tokens": MAX_NEW_TOKENS,
            },
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Endpoint { status, body });
        }

        #[derive(Deserialize)]
        struct GenerationResponse {
            results: Vec<GenerationResult>,
        }
        #[derive(Deserialize)]
        struct GenerationResult {
            generated_text: String,
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        parsed
            .results
            .into_iter()
            .next()
            .map(|r| r.generated_text)
            .ok_or_else(|| ProviderError::MalformedResponse("empty results array".into()))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
