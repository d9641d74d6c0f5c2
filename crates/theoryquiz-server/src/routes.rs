//! Router and request handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use theoryquiz_core::error::QuizError;
use theoryquiz_core::feedback::FeedbackService;
use theoryquiz_core::knowledge::KnowledgeBase;
use theoryquiz_core::prompt::FeedbackRequest;
use theoryquiz_core::question::{Question, QuestionGenerator};

use crate::api::{ErrorResponse, FeedbackResponse, HealthResponse};

/// Shared, read-only state handed to every handler.
pub struct AppState {
    generator: QuestionGenerator,
    feedback: FeedbackService,
}

impl AppState {
    pub fn new(knowledge: Arc<KnowledgeBase>, feedback: FeedbackService) -> Self {
        Self {
            generator: QuestionGenerator::new(knowledge),
            feedback,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        self.generator.knowledge()
    }
}

/// Errors turned into a 4xx response before the feedback service is called.
#[derive(Debug)]
enum ApiError {
    BadBody(JsonRejection),
    Invalid(QuizError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadBody(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::Invalid(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/feedback", post(feedback))
        .route("/api/question", get(question))
        .route("/health", get(health))
        .with_state(state)
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn feedback(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected feedback body");
        ApiError::BadBody(rejection)
    })?;

    state.knowledge().check_request(&request).map_err(|e| {
        warn!(error = %e, "invalid feedback request");
        ApiError::Invalid(e)
    })?;

    let result = state.feedback.request_feedback(&request).await;
    let status = if result.is_fallback() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    info!(status = status.as_u16(), correct = request.is_correct(), "feedback served");

    Ok((
        status,
        Json(FeedbackResponse {
            feedback: result.text().to_string(),
            detail: result.detail().map(str::to_string),
        }),
    ))
}

async fn question(State(state): State<Arc<AppState>>) -> Json<Question> {
    Json(state.generator.generate())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let knowledge = state.knowledge();
    Json(HealthResponse {
        status: "ok".to_string(),
        theories: knowledge.len(),
        terms: knowledge.term_count(),
    })
}
