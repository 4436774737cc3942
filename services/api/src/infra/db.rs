use std::future::Future;
use std::time::Duration;

use anyhow::{Context as _, anyhow};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, RuntimeErr,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use chessclub_api_schema::{team_members, telegram_users, tokens, users};
use chessclub_credentials::Digest;
use chessclub_credentials::token::Scope;

use crate::domain::repository::{
    TeamMemberRepository, TelegramUserRepository, TokenRepository, UserRepository,
};
use crate::domain::types::{
    Identifier, NewUser, ProfileUpdate, TeamMember, TelegramUser, TokenRecord, UniqueField, User,
};
use crate::error::ApiError;

/// Await a database call under `deadline`; an overrun becomes an internal error.
async fn bounded<T, F>(
    deadline: Duration,
    what: &'static str,
    fut: F,
) -> Result<Result<T, DbErr>, ApiError>
where
    F: Future<Output = Result<T, DbErr>>,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| ApiError::Internal(anyhow!("{what}: timed out after {deadline:?}")))
}

async fn run<T, F>(deadline: Duration, what: &'static str, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, DbErr>>,
{
    Ok(bounded(deadline, what, fut).await?.context(what)?)
}

/// Column whose unique constraint `err` reports, read from the driver's
/// structured constraint name.
pub fn violated_unique_field(err: &DbErr) -> Option<UniqueField> {
    let runtime = match err {
        DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return None,
    };
    let RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err)) = runtime else {
        return None;
    };
    db_err.constraint().and_then(UniqueField::from_constraint)
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
    pub deadline: Duration,
}

impl UserRepository for DbUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, ApiError> {
        let model = users::ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            full_name: Set(user.full_name.clone()),
            phone_number: Set(user.phone_number.clone()),
            lichess_username: Set(user.lichess_username.clone()),
            chesscom_username: Set(user.chesscom_username.clone()),
            photo: Set(user.photo.clone()),
            password_hash: Set(user.password_hash.clone()),
            passcode: Set(Some(user.passcode.to_vec())),
            passcode_expires_at: Set(Some(user.passcode_expires_at)),
            activated: Set(false),
            enabled: Set(false),
            created_at: Set(user.created_at),
            updated_at: Set(user.created_at),
        };
        let result = bounded(
            self.deadline,
            "create user",
            users::Entity::insert(model).exec_without_returning(&self.db),
        )
        .await?;
        match result {
            Ok(_) => Ok(user.clone().into_user()),
            Err(e) => match violated_unique_field(&e) {
                Some(field) => Err(ApiError::Conflict(field)),
                None => Err(anyhow::Error::new(e).context("create user").into()),
            },
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = run(
            self.deadline,
            "find user by id",
            users::Entity::find_by_id(id).one(&self.db),
        )
        .await?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<User>, ApiError> {
        let query = match identifier {
            Identifier::PhoneNumber(phone) => {
                users::Entity::find().filter(users::Column::PhoneNumber.eq(phone.as_str()))
            }
            Identifier::Username(username) => {
                users::Entity::find().filter(users::Column::Username.eq(username.as_str()))
            }
        };
        let model = run(self.deadline, "find user by identifier", query.one(&self.db)).await?;
        Ok(model.map(user_from_model))
    }

    async fn set_passcode(
        &self,
        id: Uuid,
        hash: &Digest,
        expires_at: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        run(
            self.deadline,
            "set passcode",
            users::Entity::update_many()
                .col_expr(users::Column::Passcode, Expr::value(Some(hash.to_vec())))
                .col_expr(users::Column::PasscodeExpiresAt, Expr::value(Some(expires_at)))
                .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(users::Column::Id.eq(id))
                .exec(&self.db),
        )
        .await?;
        Ok(())
    }

    async fn activate_with_passcode(&self, id: Uuid, expected: &[u8]) -> Result<bool, ApiError> {
        let result = run(
            self.deadline,
            "activate user",
            users::Entity::update_many()
                .col_expr(users::Column::Passcode, Expr::value(Option::<Vec<u8>>::None))
                .col_expr(
                    users::Column::PasscodeExpiresAt,
                    Expr::value(Option::<DateTime<Utc>>::None),
                )
                .col_expr(users::Column::Activated, Expr::value(true))
                .col_expr(users::Column::Enabled, Expr::value(true))
                .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(users::Column::Id.eq(id))
                .filter(users::Column::Passcode.eq(expected.to_vec()))
                .exec(&self.db),
        )
        .await?;
        Ok(result.rows_affected == 1)
    }

    async fn reset_password(
        &self,
        id: Uuid,
        expected: &[u8],
        password_hash: &str,
    ) -> Result<bool, ApiError> {
        let result = run(
            self.deadline,
            "reset password",
            users::Entity::update_many()
                .col_expr(users::Column::Passcode, Expr::value(Option::<Vec<u8>>::None))
                .col_expr(
                    users::Column::PasscodeExpiresAt,
                    Expr::value(Option::<DateTime<Utc>>::None),
                )
                .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
                .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(users::Column::Id.eq(id))
                .filter(users::Column::Passcode.eq(expected.to_vec()))
                .exec(&self.db),
        )
        .await?;
        Ok(result.rows_affected == 1)
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<(), ApiError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(full_name) = &update.full_name {
            am.full_name = Set(full_name.clone());
        }
        if let Some(lichess_username) = &update.lichess_username {
            am.lichess_username = Set(lichess_username.clone());
        }
        if let Some(chesscom_username) = &update.chesscom_username {
            am.chesscom_username = Set(chesscom_username.clone());
        }
        if let Some(photo) = &update.photo {
            am.photo = Set(photo.clone());
        }
        if let Some(password_hash) = &update.password_hash {
            am.password_hash = Set(password_hash.clone());
        }
        am.updated_at = Set(Utc::now());
        run(self.deadline, "update profile", am.update(&self.db)).await?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        full_name: model.full_name,
        phone_number: model.phone_number,
        lichess_username: model.lichess_username,
        chesscom_username: model.chesscom_username,
        photo: model.photo,
        password_hash: model.password_hash,
        passcode: model.passcode.filter(|p| !p.is_empty()),
        passcode_expires_at: model.passcode_expires_at,
        activated: model.activated,
        enabled: model.enabled,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Token repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTokenRepository {
    pub db: DatabaseConnection,
    pub deadline: Duration,
}

impl TokenRepository for DbTokenRepository {
    async fn create(&self, token: &TokenRecord) -> Result<(), ApiError> {
        let model = tokens::ActiveModel {
            hash: Set(token.hash.to_vec()),
            user_id: Set(token.user_id),
            scope: Set(token.scope.as_str().to_owned()),
            expiry: Set(token.expiry),
        };
        run(
            self.deadline,
            "create token",
            tokens::Entity::insert(model).exec_without_returning(&self.db),
        )
        .await?;
        Ok(())
    }

    async fn find_user(
        &self,
        hash: &Digest,
        scope: Scope,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, ApiError> {
        let model = run(
            self.deadline,
            "find user by token",
            users::Entity::find()
                .inner_join(tokens::Entity)
                .filter(tokens::Column::Hash.eq(hash.to_vec()))
                .filter(tokens::Column::Scope.eq(scope.as_str()))
                .filter(tokens::Column::Expiry.gt(now))
                .one(&self.db),
        )
        .await?;
        Ok(model.map(user_from_model))
    }

    async fn delete(&self, hash: &Digest) -> Result<bool, ApiError> {
        let result = run(
            self.deadline,
            "delete token",
            tokens::Entity::delete_by_id(hash.to_vec()).exec(&self.db),
        )
        .await?;
        Ok(result.rows_affected > 0)
    }
}

// ── Team member repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTeamMemberRepository {
    pub db: DatabaseConnection,
    pub deadline: Duration,
}

impl TeamMemberRepository for DbTeamMemberRepository {
    async fn list(&self) -> Result<Vec<TeamMember>, ApiError> {
        let models = run(
            self.deadline,
            "list team members",
            team_members::Entity::find()
                .order_by_asc(team_members::Column::CreatedAt)
                .all(&self.db),
        )
        .await?;
        Ok(models
            .into_iter()
            .map(|m| TeamMember {
                lichess_id: m.lichess_id,
                username: m.username,
                created_at: m.created_at,
            })
            .collect())
    }

    async fn ids(&self) -> Result<Vec<String>, ApiError> {
        run(
            self.deadline,
            "list team member ids",
            team_members::Entity::find()
                .select_only()
                .column(team_members::Column::LichessId)
                .order_by_asc(team_members::Column::CreatedAt)
                .into_tuple::<String>()
                .all(&self.db),
        )
        .await
    }

    async fn upsert(&self, member: &TeamMember) -> Result<(), ApiError> {
        let model = team_members::ActiveModel {
            lichess_id: Set(member.lichess_id.clone()),
            username: Set(member.username.clone()),
            created_at: Set(member.created_at),
        };
        run(
            self.deadline,
            "upsert team member",
            team_members::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(team_members::Column::LichessId)
                        .update_column(team_members::Column::Username)
                        .to_owned(),
                )
                .exec_without_returning(&self.db),
        )
        .await?;
        Ok(())
    }
}

// ── Telegram user repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTelegramUserRepository {
    pub db: DatabaseConnection,
    pub deadline: Duration,
}

impl TelegramUserRepository for DbTelegramUserRepository {
    async fn insert(&self, user: &TelegramUser) -> Result<(), ApiError> {
        let model = telegram_users::ActiveModel {
            id: Set(user.id),
            is_active: Set(user.is_active),
            updated_at: Set(Utc::now()),
        };
        run(
            self.deadline,
            "insert telegram user",
            telegram_users::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(telegram_users::Column::Id)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&self.db),
        )
        .await?;
        Ok(())
    }

    async fn update(&self, user: &TelegramUser) -> Result<bool, ApiError> {
        let result = run(
            self.deadline,
            "update telegram user",
            telegram_users::Entity::update_many()
                .col_expr(telegram_users::Column::IsActive, Expr::value(user.is_active))
                .col_expr(telegram_users::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(telegram_users::Column::Id.eq(user.id))
                .exec(&self.db),
        )
        .await?;
        Ok(result.rows_affected > 0)
    }

    async fn active_ids(&self) -> Result<Vec<i64>, ApiError> {
        run(
            self.deadline,
            "list active telegram users",
            telegram_users::Entity::find()
                .select_only()
                .column(telegram_users::Column::Id)
                .filter(telegram_users::Column::IsActive.eq(true))
                .order_by_asc(telegram_users::Column::Id)
                .into_tuple::<i64>()
                .all(&self.db),
        )
        .await
    }
}
