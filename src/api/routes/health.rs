//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (output directory usable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// 503 when generated files could not be written.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if output_dir_ok(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let output_ok = output_dir_ok(&state).await;

    Json(HealthResponse {
        status: if output_ok { "healthy" } else { "degraded" }.to_string(),
        output_dir: if output_ok { "ok" } else { "error" }.to_string(),
        websocket_connections: state.ws_connection_count().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn output_dir_ok(state: &AppState) -> bool {
    match tokio::fs::create_dir_all(state.output_dir()).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(dir = %state.output_dir().display(), error = %e, "Output directory unavailable");
            false
        }
    }
}
