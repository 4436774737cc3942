use axum::{
    Router,
    http::Method,
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use chessclub_core::health::healthz;
use chessclub_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::auth::BotAuth;
use crate::handlers::{
    bot::{
        add_team_member, insert_telegram_user, list_active_telegram_users, list_team_members,
        update_telegram_user,
    },
    health::{ping, readyz},
    leaderboard::get_leaderboard,
    profile::{show_me, update_user},
    tokens::{login, logout},
    users::{activate, change_password, forgot_password, register, resend_activation},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let bot = Router::new()
        .route(
            "/lichess/members",
            get(list_team_members).post(add_team_member),
        )
        .route(
            "/telegram/users",
            post(insert_telegram_user).put(update_telegram_user),
        )
        .route("/telegram/users/active", get(list_active_telegram_users))
        .route_layer(middleware::from_extractor_with_state::<BotAuth, _>(
            state.clone(),
        ));

    Router::new()
        // Health
        .route("/ping", get(ping))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Sessions
        .route("/login", post(login))
        .route("/auth/tokens", delete(logout))
        // Leaderboard
        .route("/lichess/leaderboard", get(get_leaderboard))
        // Accounts
        .route("/users", post(register))
        .route("/users/activate", post(activate))
        .route("/users/resend/activation", post(resend_activation))
        .route("/users/forgot-password", post(forgot_password))
        .route("/users/change-password", post(change_password))
        // Profile
        .route("/auth/users/me", get(show_me))
        .route("/auth/users/{id}", put(update_user))
        // Bots
        .nest("/bot", bot)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(trace_layer())
                .layer(propagate_request_id_layer())
                .layer(cors_layer()),
        )
        .with_state(state)
}

/// Browser clients are served from other origins.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(Any)
}
