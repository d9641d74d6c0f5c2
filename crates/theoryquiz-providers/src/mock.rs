//! Mock provider for tests and offline play.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use theoryquiz_core::error::ProviderError;
use theoryquiz_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, TokenUsage};

/// A scriptable provider that never touches the network.
///
/// Either answers every prompt with the same text or fails every call with an
/// API error. An optional delay lets callers exercise timeouts.
pub struct MockProvider {
    /// Reply text, or the failure message when failing.
    reply: Result<String, String>,
    /// Artificial latency before answering.
    delay: Duration,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            reply: Ok(response.to_string()),
            delay: Duration::ZERO,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock whose every call fails with an HTTP 500 API error.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::with_fixed_response("")
        }
    }

    /// Delay every response by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let content = match &self.reply {
            Ok(text) => text.clone(),
            Err(message) => {
                return Err(ProviderError::ApiError {
                    status: 500,
                    message: message.clone(),
                }
                .into())
            }
        };

        // Rough estimate, four characters per token.
        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: self.delay.as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock-model".into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("Bowlby studied attachment.");

        let response = provider.generate(&request("anything")).await.unwrap();
        assert_eq!(response.content, "Bowlby studied attachment.");
        assert_eq!(response.model, "mock-model");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn failing_mock_returns_api_error() {
        let provider = MockProvider::failing("quota exceeded");

        let err = provider.generate(&request("x")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::ApiError { status: 500, .. })
        ));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied() {
        let provider = MockProvider::with_fixed_response("slow").with_delay(Duration::from_secs(3));
        let start = tokio::time::Instant::now();

        provider.generate(&request("x")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
