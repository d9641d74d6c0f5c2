//! JSON bodies returned by the HTTP surface.

use serde::{Deserialize, Serialize};

/// Body of every `/api/feedback` response that reached the feedback service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    /// Generated explanation, or the fixed fallback message.
    pub feedback: String,
    /// Raw failure detail, only present in development.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Body of a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub theories: usize,
    pub terms: usize,
}
