pub mod account;
pub mod bot;
pub mod leaderboard;
pub mod profile;
pub mod token;
