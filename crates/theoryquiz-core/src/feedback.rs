//! The feedback service: turns an answer into a prompt, asks the provider,
//! and maps every failure onto a fixed user-facing message.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::ProviderError;
use crate::prompt::{build_prompt, FeedbackRequest};
use crate::traits::{GenerateRequest, LlmProvider};

/// Message shown to the user whenever feedback could not be generated.
pub const FALLBACK_MESSAGE: &str = "Sorry, there was a problem generating feedback.";

/// Settings for [`FeedbackService`].
#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
    /// Upper bound on a single provider call.
    pub timeout: Duration,
    /// Attach raw error detail to fallback results (development only).
    pub expose_error_detail: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            max_tokens: 300,
            temperature: 0.7,
            system_prompt: None,
            timeout: Duration::from_secs(30),
            expose_error_detail: false,
        }
    }
}

/// Outcome of a feedback request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedbackResult {
    /// Text produced by the provider, verbatim.
    Generated { text: String },
    /// The provider failed; the user sees [`FALLBACK_MESSAGE`].
    Fallback {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl FeedbackResult {
    /// The text to show the user.
    pub fn text(&self) -> &str {
        match self {
            FeedbackResult::Generated { text } => text,
            FeedbackResult::Fallback { .. } => FALLBACK_MESSAGE,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FeedbackResult::Fallback { .. })
    }

    /// Diagnostic detail, present only when exposure is enabled.
    pub fn detail(&self) -> Option<&str> {
        match self {
            FeedbackResult::Fallback { detail } => detail.as_deref(),
            FeedbackResult::Generated { .. } => None,
        }
    }
}

/// Asks a text-generation provider to explain an answer.
pub struct FeedbackService {
    provider: Arc<dyn LlmProvider>,
    config: FeedbackConfig,
}

impl FeedbackService {
    pub fn new(provider: Arc<dyn LlmProvider>, config: FeedbackConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &FeedbackConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Request feedback for an answer.
    ///
    /// Never fails: provider errors, timeouts, and empty responses are logged
    /// and turned into [`FeedbackResult::Fallback`].
    #[instrument(
        skip(self, request),
        fields(provider = %self.provider.name(), model = %self.config.model, correct = request.is_correct())
    )]
    pub async fn request_feedback(&self, request: &FeedbackRequest) -> FeedbackResult {
        let start = Instant::now();
        match self.generate(request).await {
            Ok(text) => {
                info!(elapsed_ms = start.elapsed().as_millis() as u64, "feedback generated");
                FeedbackResult::Generated { text }
            }
            Err(e) => {
                let kind = e
                    .downcast_ref::<ProviderError>()
                    .map(ProviderError::kind)
                    .unwrap_or("other");
                warn!(error = %format!("{e:#}"), kind, "feedback generation failed");
                FeedbackResult::Fallback {
                    detail: self.config.expose_error_detail.then(|| format!("{e:#}")),
                }
            }
        }
    }

    async fn generate(&self, request: &FeedbackRequest) -> anyhow::Result<String> {
        let generate_request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_prompt(request),
            system_prompt: self.config.system_prompt.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = tokio::time::timeout(
            self.config.timeout,
            self.provider.generate(&generate_request),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.config.timeout))??;

        if response.content.trim().is_empty() {
            return Err(ProviderError::MalformedResponse("empty completion".into()).into());
        }
        Ok(response.content)
    }
}
