//! The `theoryquiz serve` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use theoryquiz_core::feedback::FeedbackService;
use theoryquiz_core::knowledge::KnowledgeBase;
use theoryquiz_providers::config::load_config_from;
use theoryquiz_providers::create_provider;
use theoryquiz_server::AppState;

pub async fn execute(config_path: Option<PathBuf>, bind: Option<String>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let knowledge = Arc::new(KnowledgeBase::builtin().context("invalid knowledge base")?);
    let provider = create_provider(&config)?;

    tracing::info!(
        provider = provider.name(),
        model = %config.model,
        environment = ?config.environment,
        "feedback provider ready"
    );

    let feedback = FeedbackService::new(provider, config.feedback_config());
    let state = Arc::new(AppState::new(knowledge, feedback));

    let addr = bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    eprintln!("theoryquiz listening on http://{}", listener.local_addr()?);
    theoryquiz_server::serve(listener, state).await
}
