use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context as _, anyhow};

use chessclub_core::tracing::LogFormat;
use chessclub_domain::game::{GameType, parse_game_types};

const DEFAULT_LICHESS_USERS_URL: &str = "https://lichess.org/api/users";
const DEFAULT_NEXTSMS_URL: &str = "https://messaging-service.co.tz/api/sms/v1/text/single";
const DEFAULT_PHOTO_URL: &str = "https://static.chessclub.local/images/default-avatar.png";

/// API service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port to listen on (default 4000). Env var: `API_PORT`.
    pub api_port: u16,
    /// Deployment environment reported by `/ping` (default "development"). Env var: `APP_ENV`.
    pub environment: String,
    /// Log output format. Env var: `LOG_FORMAT`, otherwise derived from `APP_ENV`.
    pub log_format: LogFormat,
    /// Apply pending migrations before serving. Env var: `RUN_MIGRATIONS`.
    pub run_migrations: bool,
    /// Connection pool size (default 25). Env var: `DB_MAX_CONNECTIONS`.
    pub db_max_connections: u32,
    /// Deadline for a single database operation. Env var: `DB_TIMEOUT_SECS`.
    pub db_timeout: Duration,
    /// Deadline for outbound HTTP calls. Env var: `HTTP_TIMEOUT_SECS`.
    pub http_timeout: Duration,
    /// Upper bound on draining background tasks at shutdown. Env var: `SHUTDOWN_TIMEOUT_SECS`.
    pub shutdown_timeout: Duration,
    pub nextsms: NextSmsConfig,
    /// Rating provider bulk users endpoint. Env var: `LICHESS_USERS_URL`.
    pub lichess_users_url: String,
    /// Leaderboard snapshot lifetime (default 180s). Env var: `LEADERBOARD_TTL_SECS`.
    pub leaderboard_ttl: Duration,
    /// Ranked time-controls (default "rapid,blitz"). Env var: `LEADERBOARD_GAME_TYPES`.
    pub leaderboard_game_types: Vec<GameType>,
    pub bot: BotCredentials,
    /// Photo URL assigned to new accounts. Env var: `DEFAULT_PHOTO_URL`.
    pub default_photo_url: String,
}

/// NextSMS gateway account. Env vars: `NEXTSMS_URL`, `NEXTSMS_USERNAME`,
/// `NEXTSMS_PASSWORD`, `NEXTSMS_SENDER`.
#[derive(Clone)]
pub struct NextSmsConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub sender: String,
}

impl std::fmt::Debug for NextSmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NextSmsConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

/// Basic-auth credentials for the `/bot` routes. Env vars: `BOT_USERNAME`, `BOT_PASSWORD`.
#[derive(Clone)]
pub struct BotCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BotCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let env = Env(&lookup);
        let environment = env.or("APP_ENV", "development");
        let log_format = match env.get("LOG_FORMAT") {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| anyhow!(e))
                .context("LOG_FORMAT")?,
            None => LogFormat::for_environment(&environment),
        };
        let game_types = parse_game_types(&env.or("LEADERBOARD_GAME_TYPES", "rapid,blitz"))
            .context("LEADERBOARD_GAME_TYPES")?;
        if game_types.is_empty() {
            return Err(anyhow!("LEADERBOARD_GAME_TYPES must name at least one game type"));
        }

        Ok(Self {
            database_url: env.required("DATABASE_URL")?,
            api_port: env.parse_or("API_PORT", 4000)?,
            environment,
            log_format,
            run_migrations: env.parse_or("RUN_MIGRATIONS", false)?,
            db_max_connections: env.parse_or("DB_MAX_CONNECTIONS", 25)?,
            db_timeout: Duration::from_secs(env.parse_or("DB_TIMEOUT_SECS", 10)?),
            http_timeout: Duration::from_secs(env.parse_or("HTTP_TIMEOUT_SECS", 10)?),
            shutdown_timeout: Duration::from_secs(env.parse_or("SHUTDOWN_TIMEOUT_SECS", 30)?),
            nextsms: NextSmsConfig {
                url: env.or("NEXTSMS_URL", DEFAULT_NEXTSMS_URL),
                username: env.required("NEXTSMS_USERNAME")?,
                password: env.required("NEXTSMS_PASSWORD")?,
                sender: env.or("NEXTSMS_SENDER", "Chess"),
            },
            lichess_users_url: env.or("LICHESS_USERS_URL", DEFAULT_LICHESS_USERS_URL),
            leaderboard_ttl: Duration::from_secs(env.parse_or("LEADERBOARD_TTL_SECS", 180)?),
            leaderboard_game_types: game_types,
            bot: BotCredentials {
                username: env.required("BOT_USERNAME")?,
                password: env.required("BOT_PASSWORD")?,
            },
            default_photo_url: env.or("DEFAULT_PHOTO_URL", DEFAULT_PHOTO_URL),
        })
    }
}

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> anyhow::Result<String> {
        self.get(key)
            .ok_or_else(|| anyhow!("missing required environment variable {key}"))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_owned())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| anyhow!("invalid {key}={raw}: {e}")),
            None => Ok(default),
        }
    }
}
