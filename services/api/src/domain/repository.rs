#![allow(async_fn_in_trait)]

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use chessclub_credentials::Digest;
use chessclub_credentials::token::Scope;
use chessclub_domain::leaderboard::MemberPerformance;

use crate::domain::types::{
    Identifier, NewUser, ProfileUpdate, TeamMember, TelegramUser, TokenRecord, User,
};
use crate::error::ApiError;

/// Repository for member accounts.
pub trait UserRepository: Send + Sync {
    /// Insert a new account. A unique violation surfaces as `ApiError::Conflict`.
    async fn create(&self, user: &NewUser) -> Result<User, ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    async fn find_by_identifier(&self, identifier: &Identifier)
    -> Result<Option<User>, ApiError>;

    /// Store a fresh passcode hash, replacing any outstanding one.
    async fn set_passcode(
        &self,
        id: Uuid,
        hash: &Digest,
        expires_at: DateTime<Utc>,
    ) -> Result<(), ApiError>;

    /// In one write: clear the passcode and set `activated`/`enabled`, only if
    /// the stored passcode still equals `expected`. Returns `true` when this
    /// call performed the write.
    async fn activate_with_passcode(&self, id: Uuid, expected: &[u8]) -> Result<bool, ApiError>;

    /// In one write: clear the passcode and replace the password hash, only if
    /// the stored passcode still equals `expected`.
    async fn reset_password(
        &self,
        id: Uuid,
        expected: &[u8],
        password_hash: &str,
    ) -> Result<bool, ApiError>;

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<(), ApiError>;
}

/// Repository for issued bearer tokens (hash only).
pub trait TokenRepository: Send + Sync {
    async fn create(&self, token: &TokenRecord) -> Result<(), ApiError>;

    /// Owner of the token with `hash`, provided scope matches and `expiry > now`.
    async fn find_user(
        &self,
        hash: &Digest,
        scope: Scope,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, ApiError>;

    /// Delete a token. Returns `true` if a row was removed.
    async fn delete(&self, hash: &Digest) -> Result<bool, ApiError>;
}

/// Repository for lichess team members feeding the leaderboard.
pub trait TeamMemberRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<TeamMember>, ApiError>;

    async fn ids(&self) -> Result<Vec<String>, ApiError>;

    /// Insert or rename a member.
    async fn upsert(&self, member: &TeamMember) -> Result<(), ApiError>;
}

/// Repository for telegram bot subscribers.
pub trait TelegramUserRepository: Send + Sync {
    /// Insert a subscriber; an existing id is left untouched.
    async fn insert(&self, user: &TelegramUser) -> Result<(), ApiError>;

    /// Returns `false` when no subscriber has this id.
    async fn update(&self, user: &TelegramUser) -> Result<bool, ApiError>;

    async fn active_ids(&self) -> Result<Vec<i64>, ApiError>;
}

/// Outbound SMS delivery. Futures must be `Send` so delivery can run detached.
pub trait SmsSender: Clone + Send + Sync + 'static {
    fn send(
        &self,
        message: &str,
        phone_number: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Slow external fetch behind the leaderboard cache.
pub trait LeaderboardSource: Send + Sync {
    async fn fetch_members(&self) -> Result<Vec<MemberPerformance>, ApiError>;
}
