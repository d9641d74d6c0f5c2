//! HTTP tests against a real listener on an ephemeral port.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;

use theoryquiz_core::feedback::{FeedbackConfig, FeedbackService, FALLBACK_MESSAGE};
use theoryquiz_core::knowledge::KnowledgeBase;
use theoryquiz_core::question::Question;
use theoryquiz_core::traits::LlmProvider;
use theoryquiz_providers::mock::MockProvider;
use theoryquiz_providers::openai::OpenAiProvider;
use theoryquiz_server::{serve_with_shutdown, AppState, ErrorResponse, FeedbackResponse, HealthResponse};

const CBT: &str = "Cognitive Behavioral Therapy (CBT)";

async fn spawn_server(provider: Arc<dyn LlmProvider>, config: FeedbackConfig) -> String {
    let knowledge = Arc::new(KnowledgeBase::builtin().unwrap());
    let state = Arc::new(AppState::new(knowledge, FeedbackService::new(provider, config)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(serve_with_shutdown(listener, state, std::future::pending()));
    base
}

async fn post_feedback(base: &str, body: serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/api/feedback"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn correct_answer_returns_feedback() {
    let mock = Arc::new(MockProvider::with_fixed_response(
        "Aaron Beck developed cognitive therapy, the root of CBT.",
    ));
    let base = spawn_server(mock.clone(), FeedbackConfig::default()).await;

    let response = post_feedback(
        &base,
        json!({"term": "Aaron Beck", "selectedTheory": CBT, "correctTheory": CBT}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: FeedbackResponse = response.json().await.unwrap();
    assert_eq!(
        body.feedback,
        "Aaron Beck developed cognitive therapy, the root of CBT."
    );
    assert_eq!(body.detail, None);

    let sent = mock.last_request().unwrap();
    assert_eq!(
        sent.prompt,
        "Explain why the term \"Aaron Beck\" is associated with Cognitive Behavioral Therapy (CBT). Keep it short, friendly, and helpful."
    );
    assert_eq!(sent.model, "gpt-4");
}

#[tokio::test]
async fn incorrect_answer_prompt_names_both_theories() {
    let mock = Arc::new(MockProvider::with_fixed_response("Bowlby is attachment."));
    let base = spawn_server(mock.clone(), FeedbackConfig::default()).await;

    let response = post_feedback(
        &base,
        json!({
            "term": "John Bowlby",
            "selectedTheory": "Psychoanalytic Theory",
            "correctTheory": "Attachment Theory"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let prompt = mock.last_request().unwrap().prompt;
    assert!(prompt.contains("NOT related to Psychoanalytic Theory"));
    assert!(prompt.contains("but it is associated with Attachment Theory"));
}

#[tokio::test]
async fn provider_failure_returns_fallback() {
    let mock = Arc::new(MockProvider::failing("sk-live-should-not-leak"));
    let base = spawn_server(mock.clone(), FeedbackConfig::default()).await;

    let response = post_feedback(
        &base,
        json!({"term": "schemas", "selectedTheory": "Attachment Theory", "correctTheory": CBT}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = response.text().await.unwrap();
    assert!(!text.contains("sk-live-should-not-leak"));
    let body: FeedbackResponse = serde_json::from_str(&text).unwrap();
    assert_eq!(body.feedback, FALLBACK_MESSAGE);
    assert_eq!(body.detail, None);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn development_mode_includes_detail() {
    let mock = Arc::new(MockProvider::failing("model overloaded"));
    let config = FeedbackConfig {
        expose_error_detail: true,
        ..Default::default()
    };
    let base = spawn_server(mock, config).await;

    let response = post_feedback(
        &base,
        json!({"term": "Freud", "selectedTheory": "Psychoanalytic Theory", "correctTheory": "Psychoanalytic Theory"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: FeedbackResponse = response.json().await.unwrap();
    assert_eq!(body.feedback, FALLBACK_MESSAGE);
    assert!(body.detail.unwrap().contains("model overloaded"));
}

#[tokio::test]
async fn slow_provider_times_out_into_fallback() {
    let mock = Arc::new(
        MockProvider::with_fixed_response("too late").with_delay(Duration::from_secs(10)),
    );
    let config = FeedbackConfig {
        timeout: Duration::from_millis(200),
        expose_error_detail: true,
        ..Default::default()
    };
    let base = spawn_server(mock, config).await;

    let response = post_feedback(
        &base,
        json!({"term": "genograms", "selectedTheory": "Family Systems Theory", "correctTheory": "Family Systems Theory"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: FeedbackResponse = response.json().await.unwrap();
    assert_eq!(body.feedback, FALLBACK_MESSAGE);
    let detail = body.detail.unwrap();
    assert!(detail.contains("timed out after 200ms"), "got: {detail}");
}

#[tokio::test]
async fn get_on_feedback_is_method_not_allowed() {
    let mock = Arc::new(MockProvider::with_fixed_response("unused"));
    let base = spawn_server(mock.clone(), FeedbackConfig::default()).await;

    let response = reqwest::get(format!("{base}/api/feedback")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn missing_field_is_rejected_before_provider() {
    let mock = Arc::new(MockProvider::with_fixed_response("unused"));
    let base = spawn_server(mock.clone(), FeedbackConfig::default()).await;

    let response = post_feedback(&base, json!({"term": "Freud", "selectedTheory": "Psychoanalytic Theory"})).await;

    assert!(response.status().is_client_error(), "got {}", response.status());
    let body: ErrorResponse = response.json().await.unwrap();
    assert!(body.error.contains("correctTheory"), "got: {}", body.error);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let mock = Arc::new(MockProvider::with_fixed_response("unused"));
    let base = spawn_server(mock.clone(), FeedbackConfig::default()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/feedback"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn inconsistent_requests_are_bad_requests() {
    let mock = Arc::new(MockProvider::with_fixed_response("unused"));
    let base = spawn_server(mock.clone(), FeedbackConfig::default()).await;

    let cases = [
        json!({"term": "  ", "selectedTheory": CBT, "correctTheory": CBT}),
        json!({"term": "Freud", "selectedTheory": "Astrology", "correctTheory": "Psychoanalytic Theory"}),
        json!({"term": "Freud", "selectedTheory": CBT, "correctTheory": CBT}),
    ];
    for body in cases {
        let response = post_feedback(&base, body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let error: ErrorResponse = response.json().await.unwrap();
        assert!(!error.error.is_empty());
    }
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn question_endpoint_returns_valid_questions() {
    let base = spawn_server(
        Arc::new(MockProvider::with_fixed_response("unused")),
        FeedbackConfig::default(),
    )
    .await;
    let knowledge = KnowledgeBase::builtin().unwrap();

    for _ in 0..20 {
        let question: Question = reqwest::get(format!("{base}/api/question"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(question.options.len(), 3);
        let unique: HashSet<_> = question.options.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(question.has_option(&question.correct_theory));
        assert!(knowledge.owns_term(&question.correct_theory, &question.term));
    }
}

#[tokio::test]
async fn health_reports_knowledge_base_size() {
    let base = spawn_server(
        Arc::new(MockProvider::with_fixed_response("unused")),
        FeedbackConfig::default(),
    )
    .await;
    let knowledge = KnowledgeBase::builtin().unwrap();

    let health: HealthResponse = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.theories, knowledge.len());
    assert_eq!(health.terms, knowledge.term_count());
}

#[tokio::test]
async fn end_to_end_through_openai_provider() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Triangulation is a Bowen concept."}, "index": 0}],
            "model": "gpt-4",
            "usage": {"prompt_tokens": 30, "completion_tokens": 8, "total_tokens": 38}
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let provider = Arc::new(OpenAiProvider::new("sk-test", Some(upstream.uri()), None).unwrap());
    let base = spawn_server(provider, FeedbackConfig::default()).await;

    let response = post_feedback(
        &base,
        json!({"term": "triangulation", "selectedTheory": "Family Systems Theory", "correctTheory": "Family Systems Theory"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: FeedbackResponse = response.json().await.unwrap();
    assert_eq!(body.feedback, "Triangulation is a Bowen concept.");
}
