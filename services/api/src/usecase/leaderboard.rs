//! Read-through TTL cache in front of the rating provider.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};

use chessclub_domain::game::GameType;
use chessclub_domain::leaderboard::rank;

use crate::domain::repository::LeaderboardSource;
use crate::domain::types::LeaderboardSnapshot;
use crate::error::ApiError;

/// Holds at most one snapshot. Hits take only the read lock; misses go through
/// the `refresh` gate so at most one fetch is in flight.
pub struct LeaderboardCache<S: LeaderboardSource> {
    source: S,
    game_types: Vec<GameType>,
    ttl: Duration,
    current: RwLock<Slot>,
    refresh: Mutex<()>,
}

/// `generation` moves on every invalidate; a refresh that started under an
/// older generation must not install its result.
#[derive(Default)]
struct Slot {
    snapshot: Option<Arc<LeaderboardSnapshot>>,
    generation: u64,
}

impl<S: LeaderboardSource> LeaderboardCache<S> {
    pub fn new(source: S, game_types: Vec<GameType>, ttl: Duration) -> Self {
        Self {
            source,
            game_types,
            ttl,
            current: RwLock::new(Slot::default()),
            refresh: Mutex::new(()),
        }
    }

    pub async fn get(&self) -> Result<Arc<LeaderboardSnapshot>, ApiError> {
        self.load(Utc::now(), Utc::now).await
    }

    /// Like [`get`](Self::get) with a fixed clock, so freshness and the new
    /// snapshot's stamps both use `now`.
    pub async fn get_at(&self, now: DateTime<Utc>) -> Result<Arc<LeaderboardSnapshot>, ApiError> {
        self.load(now, || now).await
    }

    async fn load(
        &self,
        now: DateTime<Utc>,
        clock: impl Fn() -> DateTime<Utc>,
    ) -> Result<Arc<LeaderboardSnapshot>, ApiError> {
        if let Some(snapshot) = self.fresh(now).await {
            return Ok(snapshot);
        }

        let _gate = self.refresh.lock().await;
        let now = now.max(clock());
        // Another caller may have refreshed while we waited.
        if let Some(snapshot) = self.fresh(now).await {
            return Ok(snapshot);
        }

        let generation = self.current.read().await.generation;
        let members = self.source.fetch_members().await?;
        let fetched_at = now.max(clock());
        let snapshot = Arc::new(LeaderboardSnapshot {
            rankings: rank(&members, &self.game_types),
            fetched_at,
            expires_at: fetched_at + self.ttl,
        });

        let mut slot = self.current.write().await;
        if slot.generation == generation {
            slot.snapshot = Some(Arc::clone(&snapshot));
            tracing::info!(
                members = members.len(),
                expires_at = %snapshot.expires_at,
                "leaderboard refreshed"
            );
        } else {
            tracing::debug!("leaderboard invalidated during refresh; result not cached");
        }
        Ok(snapshot)
    }

    /// Drop the snapshot so the next read refetches.
    pub async fn invalidate(&self) {
        let mut slot = self.current.write().await;
        slot.snapshot = None;
        slot.generation = slot.generation.wrapping_add(1);
    }

    async fn fresh(&self, now: DateTime<Utc>) -> Option<Arc<LeaderboardSnapshot>> {
        self.current
            .read()
            .await
            .snapshot
            .as_ref()
            .filter(|snapshot| snapshot.is_fresh(now))
            .cloned()
    }
}
