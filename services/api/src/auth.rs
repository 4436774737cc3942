//! Request authentication: bearer tokens for members, basic auth for bots.

use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::{Basic, Bearer};
use sha2::{Digest as _, Sha256};

use chessclub_credentials::Digest;
use chessclub_credentials::token::Scope;

use crate::config::BotCredentials;
use crate::domain::types::User;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::token::VerifyTokenUseCase;

/// Account behind a valid `authentication` bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// Hash of the presented token, for logout.
    pub token_hash: Digest,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        let usecase = VerifyTokenUseCase {
            tokens: state.token_repo(),
        };
        let verified = usecase
            .execute(bearer.token(), Scope::Authentication)
            .await?;
        // Disabled after the token was issued.
        if !verified.user.is_active() {
            return Err(ApiError::Unauthorized);
        }
        Ok(Self {
            user: verified.user,
            token_hash: verified.hash,
        })
    }
}

/// Digests of the configured bot credentials.
#[derive(Clone)]
pub struct BotGuard {
    username: Digest,
    password: Digest,
}

fn digest(value: &str) -> Digest {
    Sha256::digest(value.as_bytes()).into()
}

impl BotGuard {
    pub fn new(credentials: &BotCredentials) -> Self {
        Self {
            username: digest(&credentials.username),
            password: digest(&credentials.password),
        }
    }

    /// Compares fixed-size digests; both halves are always evaluated.
    pub fn accepts(&self, username: &str, password: &str) -> bool {
        let username_ok = digest(username) == self.username;
        let password_ok = digest(password) == self.password;
        username_ok & password_ok
    }
}

/// Guard for `/bot` routes.
pub struct BotAuth;

impl FromRequestParts<AppState> for BotAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let TypedHeader(Authorization(basic)) = parts
            .extract::<TypedHeader<Authorization<Basic>>>()
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        if !state.bot.accepts(basic.username(), basic.password()) {
            tracing::warn!("rejected bot credentials");
            return Err(ApiError::Unauthorized);
        }
        Ok(Self)
    }
}
