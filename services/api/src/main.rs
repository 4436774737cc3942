use anyhow::Context as _;
use sea_orm::{ConnectOptions, Database};
use tracing::{info, warn};

use chessclub_api::config::ApiConfig;
use chessclub_api::router::build_router;
use chessclub_api::state::AppState;
use chessclub_api::tasks::BackgroundTasks;
use chessclub_api_migration::{Migrator, MigratorTrait};
use chessclub_core::tracing::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("load configuration")?;
    init_tracing(config.log_format);

    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_max_connections)
        .connect_timeout(config.db_timeout)
        .acquire_timeout(config.db_timeout)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .context("connect to database")?;

    if config.run_migrations {
        Migrator::up(&db, None).await.context("run migrations")?;
        info!("migrations applied");
    }

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("build http client")?;

    let tasks = BackgroundTasks::new();
    let state = AppState::new(db, &config, http, tasks.clone())?;

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!(environment = %config.environment, "api listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if !tasks.wait_idle(config.shutdown_timeout).await {
        warn!(pending = tasks.pending(), "shutdown timeout reached with background tasks pending");
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
