use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;

use chessclub_core::health::Ping;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn ping(State(state): State<AppState>) -> Ping {
    Ping::available(&state.environment, env!("CARGO_PKG_VERSION"), Utc::now())
}

/// Readiness: the database answers a ping within the deadline.
pub async fn readyz(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    tokio::time::timeout(state.db_timeout, state.db.ping())
        .await
        .map_err(|_| anyhow::anyhow!("database ping timed out"))?
        .map_err(|e| anyhow::Error::new(e).context("database ping"))?;
    Ok(StatusCode::OK)
}
