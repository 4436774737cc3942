use axum::{Json, extract::State};

use chessclub_domain::leaderboard::Rankings;

use crate::error::ApiError;
use crate::state::AppState;

// ── GET /lichess/leaderboard ─────────────────────────────────────────────────

pub async fn get_leaderboard(State(state): State<AppState>) -> Result<Json<Rankings>, ApiError> {
    let snapshot = state.leaderboard.get().await?;
    Ok(Json(snapshot.rankings.clone()))
}
