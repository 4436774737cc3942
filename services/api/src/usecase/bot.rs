use std::sync::Arc;

use chrono::Utc;

use chessclub_core::validate::FieldErrors;

use crate::domain::repository::{LeaderboardSource, TeamMemberRepository, TelegramUserRepository};
use crate::domain::types::{TeamMember, TelegramUser};
use crate::error::ApiError;
use crate::usecase::leaderboard::LeaderboardCache;

// ── TeamMembers ──────────────────────────────────────────────────────────────

pub struct ListTeamMembersUseCase<M: TeamMemberRepository> {
    pub members: M,
}

impl<M: TeamMemberRepository> ListTeamMembersUseCase<M> {
    pub async fn execute(&self) -> Result<Vec<TeamMember>, ApiError> {
        self.members.list().await
    }
}

pub struct AddTeamMemberInput {
    pub lichess_id: String,
    pub username: String,
}

/// Adding a member changes the ranked population, so the leaderboard is
/// invalidated once the row is written.
pub struct AddTeamMemberUseCase<M: TeamMemberRepository, S: LeaderboardSource> {
    pub members: M,
    pub leaderboard: Arc<LeaderboardCache<S>>,
}

impl<M: TeamMemberRepository, S: LeaderboardSource> AddTeamMemberUseCase<M, S> {
    /// Lichess ids are the lowercase form of the username.
    pub async fn execute(&self, input: AddTeamMemberInput) -> Result<TeamMember, ApiError> {
        let mut errors = FieldErrors::new();
        errors.check(
            !input.lichess_id.trim().is_empty(),
            "lichess_id",
            "must not be empty",
        );
        errors.check(
            !input.username.trim().is_empty(),
            "username",
            "must not be empty",
        );
        errors.into_result()?;

        let member = TeamMember {
            lichess_id: input.lichess_id.trim().to_lowercase(),
            username: input.username.trim().to_owned(),
            created_at: Utc::now(),
        };
        self.members.upsert(&member).await?;
        self.leaderboard.invalidate().await;
        Ok(member)
    }
}

// ── TelegramUsers ────────────────────────────────────────────────────────────

pub struct InsertTelegramUserUseCase<T: TelegramUserRepository> {
    pub users: T,
}

impl<T: TelegramUserRepository> InsertTelegramUserUseCase<T> {
    pub async fn execute(&self, user: TelegramUser) -> Result<(), ApiError> {
        self.users.insert(&user).await
    }
}

pub struct UpdateTelegramUserUseCase<T: TelegramUserRepository> {
    pub users: T,
}

impl<T: TelegramUserRepository> UpdateTelegramUserUseCase<T> {
    pub async fn execute(&self, user: TelegramUser) -> Result<(), ApiError> {
        if !self.users.update(&user).await? {
            return Err(ApiError::TelegramUserNotFound);
        }
        Ok(())
    }
}

pub struct ListActiveTelegramUsersUseCase<T: TelegramUserRepository> {
    pub users: T,
}

impl<T: TelegramUserRepository> ListActiveTelegramUsersUseCase<T> {
    pub async fn execute(&self) -> Result<Vec<i64>, ApiError> {
        self.users.active_ids().await
    }
}
