use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::Value;

use chessclub_core::validate::FieldErrors;

use crate::domain::types::Identifier;
use crate::error::ApiError;
use crate::handlers::{TokenResponse, UserResponse};
use crate::state::AppState;
use crate::usecase::account::{
    ActivateUseCase, ChangePasswordInput, ChangePasswordUseCase, ForgotPasswordUseCase,
    PasscodeInput, RegisterInput, RegisterUseCase, ResendActivationUseCase,
};

/// Account lookup fields shared by the passcode flows.
#[derive(Deserialize)]
pub struct IdentifierFields {
    pub phone_number: Option<String>,
    pub username: Option<String>,
}

impl IdentifierFields {
    fn into_identifier(self) -> Option<Identifier> {
        Identifier::from_parts(self.phone_number, self.username)
    }
}

/// Accepts the passcode as a JSON number or a digit string.
fn parse_passcode(raw: Option<Value>) -> Result<u32, ApiError> {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| FieldErrors::single("passcode", "must be a 6-digit code").into())
}

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(alias = "fullname")]
    pub full_name: String,
    pub phone_number: String,
    pub lichess_username: Option<String>,
    pub chesscom_username: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        sms: state.sms.clone(),
        tasks: state.tasks.clone(),
        default_photo: state.default_photo_url.clone(),
    };
    let user = usecase
        .execute(RegisterInput {
            username: body.username,
            full_name: body.full_name,
            phone_number: body.phone_number,
            password: body.password,
            lichess_username: body.lichess_username,
            chesscom_username: body.chesscom_username,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── POST /users/activate ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PasscodeRequest {
    #[serde(flatten)]
    pub identifier: IdentifierFields,
    #[serde(default)]
    pub passcode: Option<Value>,
}

pub async fn activate(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<PasscodeRequest>, ApiError>,
) -> Result<Json<TokenResponse>, ApiError> {
    let usecase = ActivateUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
    };
    let output = usecase
        .execute(PasscodeInput {
            identifier: body.identifier.into_identifier(),
            passcode: parse_passcode(body.passcode)?,
        })
        .await?;
    Ok(Json(output.token.into()))
}

// ── POST /users/resend/activation ────────────────────────────────────────────

pub async fn resend_activation(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<IdentifierFields>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let usecase = ResendActivationUseCase {
        users: state.user_repo(),
        sms: state.sms.clone(),
        tasks: state.tasks.clone(),
    };
    usecase.execute(body.into_identifier()).await?;
    Ok(StatusCode::ACCEPTED)
}

// ── POST /users/forgot-password ──────────────────────────────────────────────

pub async fn forgot_password(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<IdentifierFields>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let usecase = ForgotPasswordUseCase {
        users: state.user_repo(),
        sms: state.sms.clone(),
        tasks: state.tasks.clone(),
    };
    usecase.execute(body.into_identifier()).await?;
    Ok(StatusCode::ACCEPTED)
}

// ── POST /users/change-password ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(flatten)]
    pub identifier: IdentifierFields,
    #[serde(default)]
    pub passcode: Option<Value>,
    pub password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<ChangePasswordRequest>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
        sms: state.sms.clone(),
        tasks: state.tasks.clone(),
    };
    usecase
        .execute(ChangePasswordInput {
            identifier: body.identifier.into_identifier(),
            passcode: parse_passcode(body.passcode)?,
            password: body.password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
