//! Shared HTTP plumbing for chessclub services: tracing setup, request ids,
//! health handlers, field validation and serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
pub mod validate;
