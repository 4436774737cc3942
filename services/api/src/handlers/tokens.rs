use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::domain::types::Identifier;
use crate::error::ApiError;
use crate::handlers::TokenResponse;
use crate::state::AppState;
use crate::usecase::token::{LoginInput, LoginUseCase, LogoutUseCase};

// ── POST /login ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub phone_number: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Json<TokenResponse>, ApiError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
    };
    let issued = usecase
        .execute(LoginInput {
            identifier: Identifier::from_parts(body.phone_number, body.username),
            password: body.password,
        })
        .await?;
    Ok(Json(issued.into()))
}

// ── DELETE /auth/tokens ──────────────────────────────────────────────────────

pub async fn logout(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let usecase = LogoutUseCase {
        tokens: state.token_repo(),
    };
    usecase.execute(&auth.token_hash).await?;
    Ok(StatusCode::NO_CONTENT)
}
