//! Domain types shared across chessclub crates.
//!
//! Pure types with no framework dependencies: game time-controls and the
//! leaderboard ranking rule.

pub mod game;
pub mod leaderboard;
