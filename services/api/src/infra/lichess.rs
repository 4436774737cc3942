//! Rating provider (lichess) bulk users client.

use std::collections::HashMap;

use anyhow::{Context as _, bail};
use serde::Deserialize;
use serde_json::Value;

use chessclub_domain::game::GameType;
use chessclub_domain::leaderboard::MemberPerformance;

use crate::domain::repository::{LeaderboardSource, TeamMemberRepository};
use crate::error::ApiError;

#[derive(Clone)]
pub struct LichessClient {
    http: reqwest::Client,
    users_url: String,
}

impl LichessClient {
    pub fn new(http: reqwest::Client, users_url: impl Into<String>) -> Self {
        Self {
            http,
            users_url: users_url.into(),
        }
    }

    /// Fetch performances for `ids`, preserving the provider's order.
    pub async fn fetch_users(&self, ids: &[String]) -> anyhow::Result<Vec<MemberPerformance>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let resp = self
            .http
            .post(&self.users_url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(ids.join(","))
            .send()
            .await
            .context("request lichess users")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("lichess users endpoint responded with {status}");
        }
        let body = resp.bytes().await.context("read lichess users body")?;
        parse_users(&body)
    }
}

#[derive(Deserialize)]
struct ProviderUser {
    username: String,
    #[serde(default)]
    perfs: HashMap<String, Value>,
    #[serde(default)]
    disabled: bool,
}

impl ProviderUser {
    fn into_performance(self) -> MemberPerformance {
        let ratings = self
            .perfs
            .iter()
            .filter_map(|(key, perf)| {
                let game = key.parse::<GameType>().ok()?;
                let rating = perf.get("rating")?.as_i64()?;
                Some((game, i32::try_from(rating).ok()?))
            })
            .collect();
        MemberPerformance {
            username: self.username,
            ratings,
            disabled: self.disabled,
        }
    }
}

/// Parse newline-delimited user objects or a single JSON array of them.
/// Perf entries without a rating (puzzle storm and the like) are ignored.
pub fn parse_users(body: &[u8]) -> anyhow::Result<Vec<MemberPerformance>> {
    let mut members = Vec::new();
    for value in serde_json::Deserializer::from_slice(body).into_iter::<Value>() {
        let value = value.context("decode lichess users stream")?;
        let users: Vec<ProviderUser> = match value {
            Value::Array(_) => serde_json::from_value(value).context("decode lichess users array")?,
            other => vec![serde_json::from_value(other).context("decode lichess user")?],
        };
        members.extend(users.into_iter().map(ProviderUser::into_performance));
    }
    Ok(members)
}

/// Leaderboard input: team member ids from the store, ratings from lichess.
pub struct LichessLeaderboardSource<M: TeamMemberRepository> {
    pub members: M,
    pub client: LichessClient,
}

impl<M: TeamMemberRepository> LeaderboardSource for LichessLeaderboardSource<M> {
    async fn fetch_members(&self) -> Result<Vec<MemberPerformance>, ApiError> {
        let ids = self.members.ids().await?;
        Ok(self.client.fetch_users(&ids).await?)
    }
}
