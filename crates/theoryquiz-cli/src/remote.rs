//! Client for a running theoryquiz server.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use theoryquiz_core::feedback::FeedbackResult;
use theoryquiz_core::prompt::FeedbackRequest;
use theoryquiz_server::{ErrorResponse, FeedbackResponse};

/// Failures reaching the feedback endpoint itself.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not reach {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response (HTTP {status})")]
    UnexpectedResponse { status: u16 },
}

pub struct RemoteClient {
    url: String,
    client: reqwest::Client,
}

impl RemoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: format!("{}/api/feedback", base_url.trim_end_matches('/')),
            client,
        })
    }

    /// POST the request to `/api/feedback`.
    ///
    /// A 500 carrying the fallback body is a normal [`FeedbackResult::Fallback`];
    /// only failures to get a usable answer are transport errors.
    pub async fn feedback(&self, request: &FeedbackRequest) -> Result<FeedbackResult, TransportError> {
        let unreachable = |source: reqwest::Error| TransportError::Unreachable {
            url: self.url.clone(),
            source,
        };

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(unreachable)?;

        let status = response.status();
        if status.is_client_error() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_default();
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<FeedbackResponse>()
            .await
            .map_err(|_| TransportError::UnexpectedResponse {
                status: status.as_u16(),
            })?;

        match status {
            StatusCode::OK => Ok(FeedbackResult::Generated {
                text: body.feedback,
            }),
            StatusCode::INTERNAL_SERVER_ERROR => Ok(FeedbackResult::Fallback {
                detail: body.detail,
            }),
            other => Err(TransportError::UnexpectedResponse {
                status: other.as_u16(),
            }),
        }
    }
}
