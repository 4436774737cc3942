use axum::Json;
use axum::http::StatusCode;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Handler for `GET /healthz`: liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Body of `GET /ping`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Ping {
    pub status: &'static str,
    pub environment: String,
    pub version: &'static str,
    pub current_time: String,
}

impl Ping {
    pub fn available(environment: &str, version: &'static str, now: DateTime<Utc>) -> Self {
        Self {
            status: "available",
            environment: environment.to_owned(),
            version,
            current_time: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

impl axum::response::IntoResponse for Ping {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
