pub mod bot;
pub mod health;
pub mod leaderboard;
pub mod profile;
pub mod tokens;
pub mod users;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::types::User;
use crate::usecase::token::IssuedToken;

/// Public view of an account. Hashes never leave the service.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub phone_number: String,
    pub lichess_username: String,
    pub chesscom_username: String,
    pub photo: String,
    pub activated: bool,
    #[serde(serialize_with = "chessclub_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "chessclub_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            full_name: user.full_name,
            phone_number: user.phone_number,
            lichess_username: user.lichess_username,
            chesscom_username: user.chesscom_username,
            photo: user.photo,
            activated: user.activated,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(serialize_with = "chessclub_core::serde::to_unix_seconds")]
    pub expiry: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.plaintext,
            expiry: issued.expiry,
        }
    }
}
