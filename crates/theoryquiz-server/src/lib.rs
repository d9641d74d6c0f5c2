//! theoryquiz-server: HTTP surface for the quiz.
//!
//! Exposes `POST /api/feedback`, `GET /api/question` and `GET /health` on top
//! of the core question generator and feedback service.

pub mod api;
pub mod routes;

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use api::{ErrorResponse, FeedbackResponse, HealthResponse};
pub use routes::{router, AppState};

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    serve_with_shutdown(listener, state, ctrl_c()).await
}

/// Serve until `shutdown` resolves, letting in-flight requests finish.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    info!(%addr, theories = state.knowledge().len(), "theoryquiz server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
