//! Test utilities for chessclub services.
//!
//! Header builders for the two authentication schemes and rating-provider
//! payload fixtures. Import from `[dev-dependencies]` only.

pub mod auth;
pub mod lichess;
