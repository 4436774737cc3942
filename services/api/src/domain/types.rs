use chrono::{DateTime, Utc};
use uuid::Uuid;

use chessclub_credentials::Digest;
use chessclub_credentials::passcode;
use chessclub_credentials::token::Scope;
use chessclub_domain::leaderboard::Rankings;

/// Club member account as stored.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub phone_number: String,
    pub lichess_username: String,
    pub chesscom_username: String,
    pub photo: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// SHA-256 of the outstanding passcode; `None` once consumed.
    pub passcode: Option<Vec<u8>>,
    pub passcode_expires_at: Option<DateTime<Utc>>,
    pub activated: bool,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.activated && self.enabled
    }

    /// Whether `candidate` matches the outstanding, unexpired passcode.
    pub fn passcode_matches(&self, candidate: &str, now: DateTime<Utc>) -> bool {
        match (&self.passcode, self.passcode_expires_at) {
            (Some(stored), Some(expires_at)) if expires_at > now => {
                passcode::verify(candidate, stored)
            }
            _ => false,
        }
    }
}

/// Account row to insert at registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub phone_number: String,
    pub lichess_username: String,
    pub chesscom_username: String,
    pub photo: String,
    pub password_hash: String,
    pub passcode: Digest,
    pub passcode_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    /// The stored form right after insert: inactive, passcode outstanding.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            full_name: self.full_name,
            phone_number: self.phone_number,
            lichess_username: self.lichess_username,
            chesscom_username: self.chesscom_username,
            photo: self.photo,
            password_hash: self.password_hash,
            passcode: Some(self.passcode.to_vec()),
            passcode_expires_at: Some(self.passcode_expires_at),
            activated: false,
            enabled: false,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Account column guarded by a unique constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    PhoneNumber,
}

impl UniqueField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::PhoneNumber => "phone_number",
        }
    }

    pub fn conflict_message(self) -> &'static str {
        match self {
            Self::Username => "a user with this username already exists",
            Self::PhoneNumber => "a user with this phone number already exists",
        }
    }

    /// Map a violated constraint name to the column it guards.
    pub fn from_constraint(name: &str) -> Option<Self> {
        match name {
            chessclub_api_migration::USERS_USERNAME_KEY => Some(Self::Username),
            chessclub_api_migration::USERS_PHONE_NUMBER_KEY => Some(Self::PhoneNumber),
            _ => None,
        }
    }
}

/// How a client names an existing account. A phone number wins when both are given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    PhoneNumber(String),
    Username(String),
}

impl Identifier {
    pub fn from_parts(phone_number: Option<String>, username: Option<String>) -> Option<Self> {
        let present = |v: Option<String>| v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());
        present(phone_number)
            .map(Self::PhoneNumber)
            .or_else(|| present(username).map(Self::Username))
    }

    pub fn matches(&self, user: &User) -> bool {
        match self {
            Self::PhoneNumber(phone) => user.phone_number == *phone,
            Self::Username(username) => user.username == *username,
        }
    }
}

/// Owner-editable profile columns; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub lichess_username: Option<String>,
    pub chesscom_username: Option<String>,
    pub photo: Option<String>,
    pub password_hash: Option<String>,
}

/// Persisted form of an issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub hash: Digest,
    pub user_id: Uuid,
    pub scope: Scope,
    pub expiry: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    pub lichess_id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelegramUser {
    pub id: i64,
    pub is_active: bool,
}

/// One immutable ranking set. Replaced wholesale on refresh.
#[derive(Debug, Clone)]
pub struct LeaderboardSnapshot {
    pub rankings: Rankings,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl LeaderboardSnapshot {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
