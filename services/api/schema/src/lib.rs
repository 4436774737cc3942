pub mod team_members;
pub mod telegram_users;
pub mod tokens;
pub mod users;
