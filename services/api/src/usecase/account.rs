use anyhow::Context as _;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use chessclub_core::validate::{FieldErrors, chars_between, min_chars};
use chessclub_credentials::passcode::{self, passcode_ttl};
use chessclub_credentials::password;
use chessclub_credentials::Digest;
use chessclub_credentials::token::{self, Scope};

use crate::domain::repository::{SmsSender, TokenRepository, UserRepository};
use crate::domain::types::{Identifier, NewUser, User};
use crate::error::ApiError;
use crate::tasks::BackgroundTasks;
use crate::usecase::token::{IssuedToken, issue_token};

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MIN_FULL_NAME_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Argon2 is CPU-bound; keep it off the async workers.
pub(crate) async fn hash_password(plaintext: String) -> Result<String, ApiError> {
    let hashed = tokio::task::spawn_blocking(move || password::hash_password(&plaintext))
        .await
        .context("join password hashing task")??;
    Ok(hashed)
}

pub(crate) async fn verify_password(plaintext: String, stored: String) -> Result<bool, ApiError> {
    let matches = tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &stored))
        .await
        .context("join password verification task")??;
    Ok(matches)
}

pub(crate) fn require_identifier(identifier: Option<Identifier>) -> Result<Identifier, ApiError> {
    identifier.ok_or_else(|| {
        ApiError::Validation(FieldErrors::single(
            "username",
            "a phone number or username is required",
        ))
    })
}

pub(crate) fn check_password(errors: &mut FieldErrors, password: &str) {
    errors.check(
        min_chars(password, MIN_PASSWORD_CHARS),
        "password",
        "must be at least 6 characters",
    );
}

/// Hand `message` to the SMS sender on a detached task; failures are only logged.
fn deliver<S: SmsSender>(tasks: &BackgroundTasks, sms: &S, phone_number: &str, message: String) {
    let sms = sms.clone();
    let phone_number = phone_number.to_owned();
    tasks.spawn("sms", async move {
        if let Err(e) = sms.send(&message, &phone_number).await {
            tracing::error!(error = %e, "sms delivery failed");
        }
    });
}

pub(crate) fn check_passcode_shape(errors: &mut FieldErrors, candidate: u32) {
    errors.check(
        passcode::is_well_formed(candidate),
        "passcode",
        "must be a 6-digit code",
    );
}

/// Passcode must match the stored, unexpired hash.
fn check_passcode(user: &User, candidate: u32, now: DateTime<Utc>) -> Result<Vec<u8>, ApiError> {
    if !user.passcode_matches(&candidate.to_string(), now) {
        return Err(ApiError::InvalidPasscode);
    }
    user.passcode.clone().ok_or(ApiError::InvalidPasscode)
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub username: String,
    pub full_name: String,
    pub phone_number: String,
    pub password: String,
    pub lichess_username: Option<String>,
    pub chesscom_username: Option<String>,
}

impl RegisterInput {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(
            min_chars(self.username.trim(), MIN_USERNAME_CHARS),
            "username",
            "must be at least 3 characters",
        );
        errors.check(
            min_chars(self.full_name.trim(), MIN_FULL_NAME_CHARS),
            "full_name",
            "must be at least 3 characters",
        );
        errors.check(
            self.phone_number.starts_with('+'),
            "phone_number",
            "must start with +",
        );
        errors.check(
            chars_between(&self.phone_number, 10, 13),
            "phone_number",
            "must be between 10 and 13 characters",
        );
        check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

pub struct RegisterUseCase<U: UserRepository, S: SmsSender> {
    pub users: U,
    pub sms: S,
    pub tasks: BackgroundTasks,
    pub default_photo: String,
}

impl<U: UserRepository, S: SmsSender> RegisterUseCase<U, S> {
    pub async fn execute(&self, input: RegisterInput) -> Result<User, ApiError> {
        input.validate()?;

        let password_hash = hash_password(input.password).await?;
        let generated = passcode::generate()?;
        let now = Utc::now();
        let new_user = NewUser {
            id: Uuid::now_v7(),
            username: input.username.trim().to_owned(),
            full_name: input.full_name.trim().to_owned(),
            phone_number: input.phone_number,
            lichess_username: input.lichess_username.unwrap_or_default(),
            chesscom_username: input.chesscom_username.unwrap_or_default(),
            photo: self.default_photo.clone(),
            password_hash,
            passcode: generated.hash,
            passcode_expires_at: now + passcode_ttl(),
            created_at: now,
        };

        let user = self.users.create(&new_user).await?;
        tracing::info!(user_id = %user.id, "account registered");

        let message = format!(
            "Code: {}\nUse it to activate your chess club account.",
            generated.code
        );
        deliver(&self.tasks, &self.sms, &user.phone_number, message);
        Ok(user)
    }
}

// ── Activate ─────────────────────────────────────────────────────────────────

pub struct PasscodeInput {
    pub identifier: Option<Identifier>,
    pub passcode: u32,
}

#[derive(Debug)]
pub struct ActivateOutput {
    pub user: User,
    pub token: IssuedToken,
}

pub struct ActivateUseCase<U: UserRepository, T: TokenRepository> {
    pub users: U,
    pub tokens: T,
}

impl<U: UserRepository, T: TokenRepository> ActivateUseCase<U, T> {
    pub async fn execute(&self, input: PasscodeInput) -> Result<ActivateOutput, ApiError> {
        self.execute_at(input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        input: PasscodeInput,
        now: DateTime<Utc>,
    ) -> Result<ActivateOutput, ApiError> {
        let mut errors = FieldErrors::new();
        check_passcode_shape(&mut errors, input.passcode);
        errors.into_result()?;

        let identifier = require_identifier(input.identifier)?;
        let user = self
            .users
            .find_by_identifier(&identifier)
            .await?
            .ok_or(ApiError::InvalidPasscode)?;
        if user.activated {
            return Err(ApiError::InvalidPasscode);
        }
        let stored = check_passcode(&user, input.passcode, now)?;

        // The token is written first; the account only turns active once it exists.
        let issued = issue_token(&self.tokens, user.id, Scope::Authentication, now).await?;
        let hash = token::hash(&issued.plaintext);

        // Compare-and-clear: of concurrent submissions only one wins.
        match self.users.activate_with_passcode(user.id, &stored).await {
            Ok(true) => {}
            Ok(false) => {
                self.discard_token(&hash).await;
                return Err(ApiError::InvalidPasscode);
            }
            Err(e) => {
                self.discard_token(&hash).await;
                return Err(e);
            }
        }
        tracing::info!(user_id = %user.id, "account activated");

        let user = User {
            passcode: None,
            passcode_expires_at: None,
            activated: true,
            enabled: true,
            ..user
        };
        Ok(ActivateOutput {
            user,
            token: issued,
        })
    }

    /// Remove a token whose activation did not go through.
    async fn discard_token(&self, hash: &Digest) {
        if let Err(e) = self.tokens.delete(hash).await {
            tracing::warn!(error = %e, "failed to discard unused activation token");
        }
    }
}

// ── ResendActivation ─────────────────────────────────────────────────────────

pub struct ResendActivationUseCase<U: UserRepository, S: SmsSender> {
    pub users: U,
    pub sms: S,
    pub tasks: BackgroundTasks,
}

impl<U: UserRepository, S: SmsSender> ResendActivationUseCase<U, S> {
    pub async fn execute(&self, identifier: Option<Identifier>) -> Result<(), ApiError> {
        let identifier = require_identifier(identifier)?;
        let user = self
            .users
            .find_by_identifier(&identifier)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if user.activated {
            return Err(ApiError::AccountAlreadyActive);
        }

        let generated = passcode::generate()?;
        self.users
            .set_passcode(user.id, &generated.hash, Utc::now() + passcode_ttl())
            .await?;

        let message = format!(
            "Code: {}\nUse it to activate your chess club account.",
            generated.code
        );
        deliver(&self.tasks, &self.sms, &user.phone_number, message);
        Ok(())
    }
}

// ── ForgotPassword ───────────────────────────────────────────────────────────

pub struct ForgotPasswordUseCase<U: UserRepository, S: SmsSender> {
    pub users: U,
    pub sms: S,
    pub tasks: BackgroundTasks,
}

impl<U: UserRepository, S: SmsSender> ForgotPasswordUseCase<U, S> {
    pub async fn execute(&self, identifier: Option<Identifier>) -> Result<(), ApiError> {
        let identifier = require_identifier(identifier)?;
        let user = self
            .users
            .find_by_identifier(&identifier)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if !user.is_active() {
            return Err(ApiError::AccountInactive);
        }

        let generated = passcode::generate()?;
        self.users
            .set_passcode(user.id, &generated.hash, Utc::now() + passcode_ttl())
            .await?;

        let message = format!(
            "Code: {}\nUse it to reset the password of your chess club account.",
            generated.code
        );
        deliver(&self.tasks, &self.sms, &user.phone_number, message);
        Ok(())
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub identifier: Option<Identifier>,
    pub passcode: u32,
    pub password: String,
}

pub struct ChangePasswordUseCase<U: UserRepository, S: SmsSender> {
    pub users: U,
    pub sms: S,
    pub tasks: BackgroundTasks,
}

impl<U: UserRepository, S: SmsSender> ChangePasswordUseCase<U, S> {
    pub async fn execute(&self, input: ChangePasswordInput) -> Result<(), ApiError> {
        self.execute_at(input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        input: ChangePasswordInput,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        check_passcode_shape(&mut errors, input.passcode);
        check_password(&mut errors, &input.password);
        errors.into_result()?;

        let identifier = require_identifier(input.identifier)?;
        let user = self
            .users
            .find_by_identifier(&identifier)
            .await?
            .ok_or(ApiError::InvalidPasscode)?;
        if !user.activated {
            return Err(ApiError::InvalidPasscode);
        }
        let stored = check_passcode(&user, input.passcode, now)?;

        // Hash before the write so a hashing failure leaves the passcode usable.
        let password_hash = hash_password(input.password).await?;
        if !self
            .users
            .reset_password(user.id, &stored, &password_hash)
            .await?
        {
            return Err(ApiError::InvalidPasscode);
        }
        tracing::info!(user_id = %user.id, "password changed");

        deliver(
            &self.tasks,
            &self.sms,
            &user.phone_number,
            "Password changed successfully".to_owned(),
        );
        Ok(())
    }
}
