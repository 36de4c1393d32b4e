//! Local diagnostics endpoint.
//!
//! Enabled with `--diagnostics`. Serves:
//! - `GET /healthz`: `ok`
//! - `GET /pollers`: per-region [`PollerSnapshot`](crate::PollerSnapshot) list
//! - `GET /pipeline`: merge point occupancy and active poller count
//!
//! Read-only: handlers only look at the latest published snapshots.

use crate::status::{PipelineSnapshot, PollerSnapshot, StatusBoard};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn router(board: StatusBoard) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/pollers", get(pollers))
        .route("/pipeline", get(pipeline))
        .with_state(board)
}

/// Bind `addr` and serve until `stop` is cancelled.
pub async fn serve(
    addr: SocketAddr,
    board: StatusBoard,
    stop: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "diagnostics endpoint listening");
    axum::serve(listener, router(board))
        .with_graceful_shutdown(async move { stop.cancelled().await })
        .await
}

async fn healthz() -> &'static str {
    "ok"
}

async fn pollers(State(board): State<StatusBoard>) -> Json<Vec<PollerSnapshot>> {
    Json(board.pollers())
}

async fn pipeline(State(board): State<StatusBoard>) -> Json<PipelineSnapshot> {
    Json(board.pipeline())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
