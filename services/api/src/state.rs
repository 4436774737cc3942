use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use sea_orm::DatabaseConnection;

use crate::auth::BotGuard;
use crate::config::ApiConfig;
use crate::infra::db::{
    DbTeamMemberRepository, DbTelegramUserRepository, DbTokenRepository, DbUserRepository,
};
use crate::infra::lichess::{LichessClient, LichessLeaderboardSource};
use crate::infra::sms::NextSmsClient;
use crate::tasks::BackgroundTasks;
use crate::usecase::leaderboard::LeaderboardCache;

pub type Leaderboard = LeaderboardCache<LichessLeaderboardSource<DbTeamMemberRepository>>;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub db_timeout: Duration,
    pub sms: NextSmsClient,
    pub leaderboard: Arc<Leaderboard>,
    pub tasks: BackgroundTasks,
    pub bot: BotGuard,
    pub environment: String,
    pub default_photo_url: String,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: &ApiConfig,
        http: reqwest::Client,
        tasks: BackgroundTasks,
    ) -> anyhow::Result<Self> {
        let ttl = chrono::Duration::from_std(config.leaderboard_ttl)
            .context("LEADERBOARD_TTL_SECS out of range")?;
        let source = LichessLeaderboardSource {
            members: DbTeamMemberRepository {
                db: db.clone(),
                deadline: config.db_timeout,
            },
            client: LichessClient::new(http.clone(), config.lichess_users_url.clone()),
        };
        Ok(Self {
            sms: NextSmsClient::new(http, &config.nextsms),
            leaderboard: Arc::new(LeaderboardCache::new(
                source,
                config.leaderboard_game_types.clone(),
                ttl,
            )),
            tasks,
            bot: BotGuard::new(&config.bot),
            environment: config.environment.clone(),
            default_photo_url: config.default_photo_url.clone(),
            db_timeout: config.db_timeout,
            db,
        })
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
            deadline: self.db_timeout,
        }
    }

    pub fn token_repo(&self) -> DbTokenRepository {
        DbTokenRepository {
            db: self.db.clone(),
            deadline: self.db_timeout,
        }
    }

    pub fn team_member_repo(&self) -> DbTeamMemberRepository {
        DbTeamMemberRepository {
            db: self.db.clone(),
            deadline: self.db_timeout,
        }
    }

    pub fn telegram_user_repo(&self) -> DbTelegramUserRepository {
        DbTelegramUserRepository {
            db: self.db.clone(),
            deadline: self.db_timeout,
        }
    }
}
