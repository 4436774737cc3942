use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{TeamMember, TelegramUser};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::bot::{
    AddTeamMemberInput, AddTeamMemberUseCase, InsertTelegramUserUseCase,
    ListActiveTelegramUsersUseCase, ListTeamMembersUseCase, UpdateTelegramUserUseCase,
};

// ── GET /bot/lichess/members ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TeamMemberResponse {
    pub lichess_id: String,
    pub username: String,
    #[serde(serialize_with = "chessclub_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<TeamMember> for TeamMemberResponse {
    fn from(member: TeamMember) -> Self {
        Self {
            lichess_id: member.lichess_id,
            username: member.username,
            created_at: member.created_at,
        }
    }
}

pub async fn list_team_members(
    State(state): State<AppState>,
) -> Result<Json<Vec<TeamMemberResponse>>, ApiError> {
    let usecase = ListTeamMembersUseCase {
        members: state.team_member_repo(),
    };
    let members = usecase.execute().await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

// ── POST /bot/lichess/members ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddTeamMemberRequest {
    pub lichess_id: String,
    pub username: String,
}

pub async fn add_team_member(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<AddTeamMemberRequest>, ApiError>,
) -> Result<(StatusCode, Json<TeamMemberResponse>), ApiError> {
    let usecase = AddTeamMemberUseCase {
        members: state.team_member_repo(),
        leaderboard: state.leaderboard.clone(),
    };
    let member = usecase
        .execute(AddTeamMemberInput {
            lichess_id: body.lichess_id,
            username: body.username,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

// ── /bot/telegram/users ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TelegramUserRequest {
    pub id: i64,
    #[serde(alias = "isactive")]
    pub is_active: bool,
}

impl From<TelegramUserRequest> for TelegramUser {
    fn from(req: TelegramUserRequest) -> Self {
        Self {
            id: req.id,
            is_active: req.is_active,
        }
    }
}

pub async fn insert_telegram_user(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<TelegramUserRequest>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let usecase = InsertTelegramUserUseCase {
        users: state.telegram_user_repo(),
    };
    usecase.execute(body.into()).await?;
    Ok(StatusCode::CREATED)
}

pub async fn update_telegram_user(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<TelegramUserRequest>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let usecase = UpdateTelegramUserUseCase {
        users: state.telegram_user_repo(),
    };
    usecase.execute(body.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /bot/telegram/users/active ───────────────────────────────────────────

pub async fn list_active_telegram_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<i64>>, ApiError> {
    let usecase = ListActiveTelegramUsersUseCase {
        users: state.telegram_user_repo(),
    };
    Ok(Json(usecase.execute().await?))
}
