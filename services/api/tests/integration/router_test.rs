use std::collections::HashMap;

use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use chessclub_api::config::ApiConfig;
use chessclub_api::router::build_router;
use chessclub_api::state::AppState;
use chessclub_api::tasks::BackgroundTasks;
use chessclub_core::middleware::REQUEST_ID_HEADER;
use chessclub_testing::auth::{basic, bearer};

fn config() -> ApiConfig {
    let vars = HashMap::from([
        ("DATABASE_URL", "postgres://localhost/chessclub_test"),
        ("APP_ENV", "test"),
        ("NEXTSMS_URL", "http://127.0.0.1:9/sms"),
        ("NEXTSMS_USERNAME", "sms-user"),
        ("NEXTSMS_PASSWORD", "sms-pass"),
        ("LICHESS_USERS_URL", "http://127.0.0.1:9/api/users"),
        ("BOT_USERNAME", "telegram-bot"),
        ("BOT_PASSWORD", "s3cret"),
    ]);
    ApiConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap()
}

/// Router without a database; only routes that never reach the store are exercised.
fn server() -> TestServer {
    let db = DatabaseConnection::Disconnected;
    let state = AppState::new(
        db,
        &config(),
        reqwest::Client::new(),
        BackgroundTasks::new(),
    )
    .unwrap();
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn should_answer_ping_with_environment_and_version() {
    let response = server().get("/ping").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "available");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn should_answer_liveness_probe() {
    server().get("/healthz").await.assert_status_ok();
}

#[tokio::test]
async fn should_set_request_id_on_response() {
    let response = server().get("/healthz").await;

    let request_id = response.header(REQUEST_ID_HEADER);
    assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn should_require_bearer_token_for_profile() {
    let response = server().get("/auth/users/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "UNAUTHORIZED");
}

#[tokio::test]
async fn should_reject_malformed_bearer_token_without_store_lookup() {
    let (name, value) = bearer("not-a-token");

    let response = server()
        .delete("/auth/tokens")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "invalid or missing authentication token");
}

#[tokio::test]
async fn should_require_basic_auth_for_bot_routes() {
    let response = server().get("/bot/telegram/users/active").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let (name, value) = basic("telegram-bot", "wrong");
    let response = server()
        .get("/bot/lichess/members")
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_report_registration_field_errors() {
    let response = server()
        .post("/users")
        .json(&json!({
            "username": "kasparov",
            "fullname": "GK",
            "phone_number": "0712345678",
            "password": "e4"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION");
    assert_eq!(body["errors"]["full_name"], "must be at least 3 characters");
    assert_eq!(body["errors"]["phone_number"], "must start with +");
    assert_eq!(body["errors"]["password"], "must be at least 6 characters");
    assert!(body["errors"].get("username").is_none());
}

#[tokio::test]
async fn should_require_identifier_for_login() {
    let response = server()
        .post("/login")
        .json(&json!({ "password": "najdorf-6" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION");
}

#[tokio::test]
async fn should_reject_non_numeric_passcode_on_its_field() {
    let response = server()
        .post("/users/activate")
        .json(&json!({ "username": "kasparov", "passcode": "abc" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION");
    assert!(body["errors"]["passcode"].is_string());
}

#[tokio::test]
async fn should_report_unreadable_body_as_validation() {
    let response = server()
        .post("/users")
        .content_type("application/json")
        .text("{not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION");
    assert!(body["errors"]["body"].is_string());
}

#[tokio::test]
async fn should_answer_cors_preflight_for_any_origin() {
    let response = server()
        .method(Method::OPTIONS, "/users")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("https://club.example"),
        )
        .add_header(
            HeaderName::from_static("access-control-request-method"),
            HeaderValue::from_static("POST"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
    let methods = response.header("access-control-allow-methods");
    let methods = methods.to_str().unwrap();
    for method in ["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE"] {
        assert!(methods.contains(method), "{method} missing from {methods}");
    }
}
