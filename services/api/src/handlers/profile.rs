use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::UserResponse;
use crate::state::AppState;
use crate::usecase::profile::{ShowProfileUseCase, UpdateProfileInput, UpdateProfileUseCase};

// ── GET /auth/users/me ───────────────────────────────────────────────────────

pub async fn show_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let usecase = ShowProfileUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(auth.user.id).await?;
    Ok(Json(user.into()))
}

// ── PUT /auth/users/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(alias = "fullname")]
    pub full_name: Option<String>,
    pub lichess_username: Option<String>,
    pub chesscom_username: Option<String>,
    pub photo: Option<String>,
    pub password: Option<String>,
}

pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateProfileRequest>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(
            &auth.user,
            id,
            UpdateProfileInput {
                full_name: body.full_name,
                lichess_username: body.lichess_username,
                chesscom_username: body.chesscom_username,
                photo: body.photo,
                password: body.password,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
