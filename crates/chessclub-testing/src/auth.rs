//! Authorization header builders for router tests.

use data_encoding::BASE64;
use http::header::AUTHORIZATION;
use http::{HeaderName, HeaderValue};

/// `Authorization: Bearer <token>`.
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    let value = HeaderValue::from_str(&format!("Bearer {token}"))
        .expect("bearer token must be a valid header value");
    (AUTHORIZATION, value)
}

/// `Authorization: Basic base64(username:password)`.
pub fn basic(username: &str, password: &str) -> (HeaderName, HeaderValue) {
    let encoded = BASE64.encode(format!("{username}:{password}").as_bytes());
    let value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .expect("base64 is always a valid header value");
    (AUTHORIZATION, value)
}
