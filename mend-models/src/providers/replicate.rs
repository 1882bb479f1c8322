//! Replicate-hosted model provider.
//!
//! Runs predictions against Replicate's HTTP API in blocking mode
//! (`Prefer: wait`), so a single request returns the finished output. Both
//! the cheap and the smart tier are instances of this provider pointed at
//! different models.
//!
//! # Example
//!
//! ```ignore
//! use mend_models::providers::ReplicateProvider;
//!
//! let cheap = ReplicateProvider::from_env(ReplicateProvider::CHEAP_MODEL)?;
//! let smart = ReplicateProvider::from_env(ReplicateProvider::SMART_MODEL)?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionProvider, CompletionStream};
use crate::{CompletionRequest, CompletionResponse, Error, Result, StreamChunk};

/// Default Replicate API base URL.
const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";

/// Environment variable holding the API token.
const TOKEN_ENV: &str = "REPLICATE_API_TOKEN";

/// Per-request timeout. A prediction that takes longer counts as a failure
/// and advances the fallback chain.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ────────────────────────────────────────────────────────────────────────────
// Replicate API Request/Response Types
// ────────────────────────────────────────────────────────────────────────────

/// Input block of a prediction request.
#[derive(Debug, Serialize)]
struct PredictionInput {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Request body for the predictions endpoint.
#[derive(Debug, Serialize)]
struct PredictionRequest {
    input: PredictionInput,
}

/// Prediction output: either a single string or a list of text chunks that
/// concatenate into the full response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictionOutput {
    Text(String),
    Chunks(Vec<String>),
}

impl PredictionOutput {
    fn chunks(self) -> Vec<String> {
        match self {
            Self::Text(s) => vec![s],
            Self::Chunks(chunks) => chunks,
        }
    }
}

/// Response from the predictions endpoint.
#[derive(Debug, Deserialize)]
struct PredictionResponse {
    status: String,
    #[serde(default)]
    output: Option<PredictionOutput>,
    #[serde(default)]
    error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// ReplicateProvider
// ────────────────────────────────────────────────────────────────────────────

/// Replicate model provider.
#[derive(Debug)]
pub struct ReplicateProvider {
    base_url: String,
    model: String,
    api_token: String,
    client: reqwest::Client,
}

impl ReplicateProvider {
    /// Model id used for the cheap tier by default.
    pub const CHEAP_MODEL: &'static str = "deepseek-ai/deepseek-v3";

    /// Model id used for the smart tier by default.
    pub const SMART_MODEL: &'static str = "anthropic/claude-3.5-sonnet";

    /// Create a provider for a model, reading the token from
    /// `REPLICATE_API_TOKEN`.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let token = std::env::var(TOKEN_ENV)
            .map_err(|_| Error::CredentialsNotFound("replicate".to_string()))?;
        Ok(Self::new(token, model))
    }

    /// Create a provider with an explicit API token.
    pub fn new(api_token: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_token, model)
    }

    /// Create a provider with a custom base URL (used by tests).
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_token: api_token.into(),
            client,
        }
    }

    /// The model this provider runs.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run a prediction and return the raw output chunks.
    async fn predict(&self, request: &CompletionRequest) -> Result<Vec<String>> {
        let url = format!("{}/models/{}/predictions", self.base_url, self.model);
        let body = PredictionRequest {
            input: PredictionInput {
                prompt: request.prompt.clone(),
                max_tokens: request.max_output_tokens,
                temperature: request.temperature,
            },
        };

        debug!(model = %self.model, "running prediction");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::ProviderApi(format!(
                "Replicate API returned status {}",
                response.status()
            )));
        }

        let prediction: PredictionResponse = response
            .json()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        match prediction.status.as_str() {
            "succeeded" => {
                let output = prediction.output.ok_or_else(|| {
                    Error::ProviderApi("prediction succeeded without output".to_string())
                })?;
                Ok(output.chunks())
            }
            status => Err(Error::ProviderApi(format!(
                "prediction {}: {}",
                status,
                prediction.error.unwrap_or_else(|| "no error detail".to_string())
            ))),
        }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for ReplicateProvider {
    fn name(&self) -> &str {
        "replicate"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let chunks = self.predict(&request).await?;
        Ok(CompletionResponse::text(chunks.concat()))
    }

    /// Streams the prediction's output chunks one at a time.
    ///
    /// Blocking-mode predictions return the whole output array at once, so
    /// the stream replays the chunks the API delivered rather than arriving
    /// token by token.
    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        let chunks = self.predict(&request).await?;
        let mut items: Vec<Result<StreamChunk>> =
            chunks.into_iter().map(|c| Ok(StreamChunk::delta(c))).collect();
        items.push(Ok(StreamChunk::done(None)));
        Ok(Box::pin(tokio_stream::iter(items)))
    }
}
