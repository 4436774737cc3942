use chrono::{DateTime, Utc};
use uuid::Uuid;

use chessclub_credentials::Digest;
use chessclub_credentials::token::{self, Scope};

use crate::domain::repository::{TokenRepository, UserRepository};
use crate::domain::types::{Identifier, TokenRecord, User};
use crate::error::ApiError;
use crate::usecase::account::{require_identifier, verify_password};

/// Plaintext token handed to the client once, with its absolute expiry.
#[derive(Clone)]
pub struct IssuedToken {
    pub plaintext: String,
    pub expiry: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

/// Generate a token for `user_id`, persist its hash and return the plaintext.
/// Nothing is returned before the store confirms the write.
pub async fn issue_token<T: TokenRepository>(
    tokens: &T,
    user_id: Uuid,
    scope: Scope,
    now: DateTime<Utc>,
) -> Result<IssuedToken, ApiError> {
    let generated = token::generate()?;
    let record = TokenRecord {
        hash: generated.hash,
        user_id,
        scope,
        expiry: now + scope.ttl(),
    };
    tokens.create(&record).await?;
    Ok(IssuedToken {
        plaintext: generated.plaintext,
        expiry: record.expiry,
    })
}

// ── VerifyToken ──────────────────────────────────────────────────────────────

/// Owner of a verified token plus the hash it was found under.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub user: User,
    pub hash: Digest,
}

pub struct VerifyTokenUseCase<T: TokenRepository> {
    pub tokens: T,
}

impl<T: TokenRepository> VerifyTokenUseCase<T> {
    pub async fn execute(&self, presented: &str, scope: Scope) -> Result<VerifiedToken, ApiError> {
        self.execute_at(presented, scope, Utc::now()).await
    }

    /// Unknown, expired and wrong-scope tokens are indistinguishable to the caller.
    pub async fn execute_at(
        &self,
        presented: &str,
        scope: Scope,
        now: DateTime<Utc>,
    ) -> Result<VerifiedToken, ApiError> {
        let presented = token::parse(presented)?;
        let hash = token::hash(presented);
        let user = self
            .tokens
            .find_user(&hash, scope, now)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        Ok(VerifiedToken { user, hash })
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub identifier: Option<Identifier>,
    pub password: String,
}

pub struct LoginUseCase<U: UserRepository, T: TokenRepository> {
    pub users: U,
    pub tokens: T,
}

impl<U: UserRepository, T: TokenRepository> LoginUseCase<U, T> {
    pub async fn execute(&self, input: LoginInput) -> Result<IssuedToken, ApiError> {
        let identifier = require_identifier(input.identifier)?;
        let user = self
            .users
            .find_by_identifier(&identifier)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !verify_password(input.password, user.password_hash.clone()).await? {
            return Err(ApiError::InvalidCredentials);
        }
        if !user.is_active() {
            return Err(ApiError::InvalidCredentials);
        }

        issue_token(&self.tokens, user.id, Scope::Authentication, Utc::now()).await
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<T: TokenRepository> {
    pub tokens: T,
}

impl<T: TokenRepository> LogoutUseCase<T> {
    pub async fn execute(&self, hash: &Digest) -> Result<(), ApiError> {
        self.tokens.delete(hash).await?;
        Ok(())
    }
}
