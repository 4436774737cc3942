use sea_orm::entity::prelude::*;

/// Club member account. `passcode` holds the SHA-256 of the pending SMS
/// passcode and is NULL once consumed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub full_name: String,
    #[sea_orm(unique)]
    pub phone_number: String,
    pub lichess_username: String,
    pub chesscom_username: String,
    pub photo: String,
    pub password_hash: String,
    pub passcode: Option<Vec<u8>>,
    pub passcode_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub activated: bool,
    pub enabled: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tokens::Entity")]
    Tokens,
}

impl Related<super::tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
