use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use chessclub_core::validate::FieldErrors;
use chessclub_credentials::password::PasswordError;
use chessclub_credentials::random::RandomSourceError;
use chessclub_credentials::token::InvalidFormat;

use crate::domain::types::UniqueField;

/// API service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("{} is already taken", .0.as_str())]
    Conflict(UniqueField),
    #[error("invalid or missing authentication token")]
    Unauthorized,
    #[error("invalid passcode")]
    InvalidPasscode,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is not active")]
    AccountInactive,
    #[error("account is already active")]
    AccountAlreadyActive,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("telegram user not found")]
    TelegramUserNotFound,
    #[error(transparent)]
    RandomSource(#[from] RandomSourceError),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Conflict(_) => "VALIDATION",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidPasscode => "INVALID_PASSCODE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::AccountAlreadyActive => "ACCOUNT_ALREADY_ACTIVE",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::TelegramUserNotFound => "TELEGRAM_USER_NOT_FOUND",
            Self::RandomSource(_) | Self::Internal(_) => "INTERNAL",
        }
    }

    /// Per-field messages for 400 responses.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors.clone()),
            Self::Conflict(field) => Some(FieldErrors::single(
                field.as_str(),
                field.conflict_message(),
            )),
            _ => None,
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Unreadable request bodies are reported like any other validation failure.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(FieldErrors::single("body", &rejection.body_text()))
    }
}

impl From<InvalidFormat> for ApiError {
    fn from(_: InvalidFormat) -> Self {
        Self::Unauthorized
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Random(e) => Self::RandomSource(e),
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_)
            | Self::Conflict(_)
            | Self::AccountInactive
            | Self::AccountAlreadyActive => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidPasscode | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound | Self::TelegramUserNotFound => StatusCode::NOT_FOUND,
            Self::RandomSource(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client errors and stay out of the error log.
        let message = match &self {
            Self::RandomSource(e) => {
                tracing::error!(error = %e, kind = "RANDOM_SOURCE", "secure random source failed");
                "internal error".to_owned()
            }
            Self::Internal(e) => {
                let chain = format!("{e:#}");
                tracing::error!(error = %chain, kind = "INTERNAL", "internal error");
                "internal error".to_owned()
            }
            other => other.to_string(),
        };
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": message,
        });
        if let Some(errors) = self.field_errors() {
            body["errors"] = serde_json::to_value(&errors).unwrap_or_default();
        }
        (status, axum::Json(body)).into_response()
    }
}
