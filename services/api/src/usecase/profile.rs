use uuid::Uuid;

use chessclub_core::validate::{FieldErrors, min_chars};

use crate::domain::repository::UserRepository;
use crate::domain::types::{ProfileUpdate, User};
use crate::error::ApiError;
use crate::usecase::account::{MIN_FULL_NAME_CHARS, check_password, hash_password};

// ── ShowProfile ──────────────────────────────────────────────────────────────

pub struct ShowProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ShowProfileUseCase<U> {
    /// Re-read the account so the response reflects the latest stored row.
    pub async fn execute(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateProfileInput {
    pub full_name: Option<String>,
    pub lichess_username: Option<String>,
    pub chesscom_username: Option<String>,
    pub photo: Option<String>,
    pub password: Option<String>,
}

impl UpdateProfileInput {
    fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.lichess_username.is_none()
            && self.chesscom_username.is_none()
            && self.photo.is_none()
            && self.password.is_none()
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.is_empty() {
            errors.add("profile", "at least one field must be provided");
        }
        if let Some(full_name) = &self.full_name {
            errors.check(
                min_chars(full_name.trim(), MIN_FULL_NAME_CHARS),
                "full_name",
                "must be at least 3 characters",
            );
        }
        if let Some(photo) = &self.photo {
            errors.check(!photo.trim().is_empty(), "photo", "must not be empty");
        }
        if let Some(password) = &self.password {
            check_password(&mut errors, password);
        }
        errors.into_result()
    }
}

pub struct UpdateProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateProfileUseCase<U> {
    /// Only the account owner may edit it.
    pub async fn execute(
        &self,
        actor: &User,
        target: Uuid,
        input: UpdateProfileInput,
    ) -> Result<(), ApiError> {
        if actor.id != target {
            return Err(ApiError::Forbidden);
        }
        input.validate()?;

        let password_hash = match input.password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };
        let update = ProfileUpdate {
            full_name: input.full_name.map(|s| s.trim().to_owned()),
            lichess_username: input.lichess_username.map(|s| s.trim().to_owned()),
            chesscom_username: input.chesscom_username.map(|s| s.trim().to_owned()),
            photo: input.photo.map(|s| s.trim().to_owned()),
            password_hash,
        };
        self.users.update_profile(target, &update).await?;
        tracing::info!(user_id = %target, "profile updated");
        Ok(())
    }
}
