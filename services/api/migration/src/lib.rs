pub use sea_orm_migration::MigratorTrait;
use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users;
mod m20240601_000002_create_tokens;
mod m20240601_000003_create_team_members;
mod m20240601_000004_create_telegram_users;

/// Unique index on `users.username`; its name is what insert conflicts report.
pub const USERS_USERNAME_KEY: &str = "users_username_key";
/// Unique index on `users.phone_number`.
pub const USERS_PHONE_NUMBER_KEY: &str = "users_phone_number_key";

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users::Migration),
            Box::new(m20240601_000002_create_tokens::Migration),
            Box::new(m20240601_000003_create_team_members::Migration),
            Box::new(m20240601_000004_create_telegram_users::Migration),
        ]
    }
}
