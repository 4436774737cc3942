use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;

use chessclub_api::error::ApiError;
use chessclub_api::usecase::leaderboard::LeaderboardCache;
use chessclub_domain::game::GameType;
use chessclub_domain::leaderboard::{LeaderboardEntry, MemberPerformance};

use crate::helpers::{MockLeaderboardSource, member};

const TTL_MINUTES: i64 = 3;

fn cache(source: MockLeaderboardSource) -> LeaderboardCache<MockLeaderboardSource> {
    LeaderboardCache::new(
        source,
        vec![GameType::Rapid, GameType::Blitz],
        chrono::Duration::minutes(TTL_MINUTES),
    )
}

fn usernames(entries: &[LeaderboardEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.username.as_str()).collect()
}

#[tokio::test]
async fn should_serve_cached_snapshot_within_ttl() {
    let source = MockLeaderboardSource::new(vec![member("a", &[(GameType::Rapid, 1500)])]);
    let calls = source.calls_handle();
    let cache = cache(source);
    let t0 = Utc::now();

    let first = cache.get_at(t0).await.unwrap();
    let second = cache
        .get_at(t0 + chrono::Duration::seconds(179))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.expires_at, t0 + chrono::Duration::minutes(TTL_MINUTES));
}

#[tokio::test]
async fn should_refresh_once_after_expiry() {
    let source = MockLeaderboardSource::new(vec![member("a", &[(GameType::Rapid, 1500)])]);
    let calls = source.calls_handle();
    let members = source.members_handle();
    let cache = cache(source);
    let t0 = Utc::now();
    cache.get_at(t0).await.unwrap();

    members
        .lock()
        .unwrap()
        .push(member("b", &[(GameType::Rapid, 1800)]));
    let t1 = t0 + chrono::Duration::minutes(TTL_MINUTES);
    let refreshed = cache.get_at(t1).await.unwrap();
    let again = cache.get_at(t1).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(refreshed.expires_at, t1 + chrono::Duration::minutes(TTL_MINUTES));
    assert_eq!(usernames(&refreshed.rankings[&GameType::Rapid]), vec!["b", "a"]);
    assert!(Arc::ptr_eq(&refreshed, &again));
}

#[tokio::test]
async fn should_rank_stably_and_skip_disabled_members() {
    let mut tal = member("tal", &[(GameType::Rapid, 2500), (GameType::Blitz, 2600)]);
    tal.disabled = true;
    let source = MockLeaderboardSource::new(vec![
        member("a", &[(GameType::Rapid, 1500)]),
        member("b", &[(GameType::Rapid, 1800), (GameType::Blitz, 1700)]),
        member("c", &[(GameType::Rapid, 1800)]),
        tal,
    ]);
    let cache = cache(source);

    let snapshot = cache.get().await.unwrap();

    assert_eq!(usernames(&snapshot.rankings[&GameType::Rapid]), vec!["b", "c", "a"]);
    assert_eq!(usernames(&snapshot.rankings[&GameType::Blitz]), vec!["b", "a", "c"]);
    assert_eq!(snapshot.rankings[&GameType::Blitz][1].rating, 0);
    assert_eq!(snapshot.rankings.len(), 2);
}

#[tokio::test]
async fn should_fetch_once_for_concurrent_misses() {
    let source = MockLeaderboardSource::new(vec![member("a", &[(GameType::Blitz, 2000)])])
        .with_delay(Duration::from_millis(50));
    let calls = source.calls_handle();
    let cache = cache(source);
    let now = Utc::now();

    let results = join_all((0..16).map(|_| cache.get_at(now))).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
    }
}

#[tokio::test]
async fn should_keep_previous_snapshot_when_refresh_fails() {
    let source = MockLeaderboardSource::new(vec![member("a", &[(GameType::Rapid, 1500)])]);
    let fail = source.fail_handle();
    let calls = source.calls_handle();
    let cache = cache(source);
    let t0 = Utc::now();
    let first = cache.get_at(t0).await.unwrap();

    fail.store(true, Ordering::SeqCst);
    let expired = t0 + chrono::Duration::minutes(TTL_MINUTES + 1);
    let result = cache.get_at(expired).await;
    assert!(
        matches!(result, Err(ApiError::Internal(_))),
        "expected Internal, got {result:?}"
    );

    // Still served while fresh; nothing was swapped in.
    let within = cache.get_at(t0).await.unwrap();
    assert!(Arc::ptr_eq(&first, &within));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn should_refetch_after_invalidate() {
    let source = MockLeaderboardSource::new(Vec::<MemberPerformance>::new());
    let calls = source.calls_handle();
    let cache = cache(source);
    let now = Utc::now();

    cache.get_at(now).await.unwrap();
    cache.invalidate().await;
    cache.get_at(now).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn should_not_cache_refresh_invalidated_mid_flight() {
    let source = MockLeaderboardSource::new(vec![member("a", &[(GameType::Rapid, 1500)])])
        .with_delay(Duration::from_millis(100));
    let calls = source.calls_handle();
    let cache = cache(source);

    let (in_flight, ()) = tokio::join!(cache.get(), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.invalidate().await;
    });
    in_flight.unwrap();
    cache.get().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn should_stamp_snapshot_after_slow_fetch() {
    let source = MockLeaderboardSource::new(vec![member("a", &[(GameType::Rapid, 1500)])])
        .with_delay(Duration::from_millis(50));
    let cache = cache(source);
    let before = Utc::now();

    let snapshot = cache.get().await.unwrap();

    assert!(
        snapshot.fetched_at >= before + chrono::Duration::milliseconds(50),
        "fetched_at {} should follow the fetch that started at {before}",
        snapshot.fetched_at
    );
    assert_eq!(
        snapshot.expires_at,
        snapshot.fetched_at + chrono::Duration::minutes(TTL_MINUTES)
    );
}
