//! Error types shared across theoryquiz.
//!
//! `QuizError` covers knowledge-base configuration problems and rejected
//! feedback requests. `ProviderError` represents failures when talking to a
//! text-generation backend; it lives here so the feedback service can
//! classify failures without string matching.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while building a knowledge base or validating a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// Fewer theories than options per question.
    #[error("knowledge base needs at least {required} theories, found {found}")]
    TooFewTheories { required: usize, found: usize },

    /// A theory without any terms.
    #[error("theory '{0}' has no terms")]
    EmptyTheory(String),

    /// A theory whose name is empty or whitespace.
    #[error("theory name must not be blank")]
    BlankTheoryName,

    /// A term that is empty or whitespace.
    #[error("theory '{0}' contains a blank term")]
    BlankTerm(String),

    /// Two theories share a name.
    #[error("duplicate theory name: {0}")]
    DuplicateTheory(String),

    /// A required request field is missing or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A request names a theory the knowledge base does not know.
    #[error("unknown theory: {0}")]
    UnknownTheory(String),

    /// A request claims a term belongs to a theory that does not own it.
    #[error("term '{term}' is not associated with '{theory}'")]
    TermNotInTheory { term: String, theory: String },
}

impl QuizError {
    /// Returns `true` for errors caused by the caller's request rather than
    /// by the knowledge base itself.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            QuizError::MissingField(_)
                | QuizError::UnknownTheory(_)
                | QuizError::TermNotInTheory { .. }
        )
    }
}

/// Errors raised by [`crate::session::QuizSession`] when a front end drives a
/// round out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no question is active; start a round first")]
    NoActiveRound,

    #[error("a feedback request is already pending for this round")]
    RequestPending,

    #[error("this round has already been answered")]
    AlreadyAnswered,

    #[error("'{0}' is not one of the options")]
    NotAnOption(String),
}

/// Errors that can occur when interacting with a text-generation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response could not be parsed or carried no text.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Short label used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::RateLimited { .. } => "rate_limited",
            ProviderError::AuthenticationFailed(_) => "auth",
            ProviderError::ModelNotFound(_) => "model_not_found",
            ProviderError::ApiError { .. } => "api",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::NetworkError(_) => "network",
            ProviderError::MalformedResponse(_) => "malformed",
        }
    }
}
