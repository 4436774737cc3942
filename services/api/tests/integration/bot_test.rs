use std::sync::Arc;
use std::sync::atomic::Ordering;

use chessclub_api::domain::types::TelegramUser;
use chessclub_api::error::ApiError;
use chessclub_api::usecase::bot::{
    AddTeamMemberInput, AddTeamMemberUseCase, InsertTelegramUserUseCase,
    ListActiveTelegramUsersUseCase, ListTeamMembersUseCase, UpdateTelegramUserUseCase,
};
use chessclub_api::usecase::leaderboard::LeaderboardCache;
use chessclub_domain::game::GameType;

use crate::helpers::{
    MockLeaderboardSource, MockTeamMemberRepo, MockTelegramUserRepo, member, team_member,
};

fn leaderboard(source: MockLeaderboardSource) -> Arc<LeaderboardCache<MockLeaderboardSource>> {
    Arc::new(LeaderboardCache::new(
        source,
        vec![GameType::Rapid],
        chrono::Duration::minutes(3),
    ))
}

fn add_input(lichess_id: &str, username: &str) -> AddTeamMemberInput {
    AddTeamMemberInput {
        lichess_id: lichess_id.to_owned(),
        username: username.to_owned(),
    }
}

// ── Team members ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_team_members() {
    let usecase = ListTeamMembersUseCase {
        members: MockTeamMemberRepo::new(vec![
            team_member("hikaru", "Hikaru"),
            team_member("dinabelenkaya", "DinaBelenkaya"),
        ]),
    };

    let members = usecase.execute().await.unwrap();

    let ids: Vec<&str> = members.iter().map(|m| m.lichess_id.as_str()).collect();
    assert_eq!(ids, vec!["hikaru", "dinabelenkaya"]);
}

#[tokio::test]
async fn should_lowercase_lichess_id_and_rename_existing_member() {
    let repo = MockTeamMemberRepo::new(vec![team_member("hikaru", "Hikaru")]);
    let stored = repo.members_handle();
    let usecase = AddTeamMemberUseCase {
        members: repo,
        leaderboard: leaderboard(MockLeaderboardSource::new(vec![])),
    };

    let added = usecase.execute(add_input(" Alireza2003 ", "Alireza2003")).await.unwrap();
    usecase.execute(add_input("HIKARU", "Hikaru_N")).await.unwrap();

    assert_eq!(added.lichess_id, "alireza2003");
    assert_eq!(added.username, "Alireza2003");
    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].lichess_id, "hikaru");
    assert_eq!(stored[0].username, "Hikaru_N");
}

#[tokio::test]
async fn should_reject_blank_team_member_fields() {
    let repo = MockTeamMemberRepo::new(vec![]);
    let stored = repo.members_handle();
    let usecase = AddTeamMemberUseCase {
        members: repo,
        leaderboard: leaderboard(MockLeaderboardSource::new(vec![])),
    };

    let result = usecase.execute(add_input("  ", "")).await;

    match &result {
        Err(ApiError::Validation(errors)) => {
            assert!(errors.get("lichess_id").is_some());
            assert!(errors.get("username").is_some());
        }
        _ => panic!("expected Validation, got {result:?}"),
    }
    assert!(stored.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_refetch_leaderboard_after_member_added() {
    let source = MockLeaderboardSource::new(vec![member("hikaru", &[(GameType::Rapid, 2800)])]);
    let calls = source.calls_handle();
    let cache = leaderboard(source);
    let usecase = AddTeamMemberUseCase {
        members: MockTeamMemberRepo::new(vec![]),
        leaderboard: Arc::clone(&cache),
    };

    cache.get().await.unwrap();
    cache.get().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    usecase.execute(add_input("hikaru", "Hikaru")).await.unwrap();
    cache.get().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn should_keep_leaderboard_when_member_rejected() {
    let source = MockLeaderboardSource::new(vec![]);
    let calls = source.calls_handle();
    let cache = leaderboard(source);
    let usecase = AddTeamMemberUseCase {
        members: MockTeamMemberRepo::new(vec![]),
        leaderboard: Arc::clone(&cache),
    };
    cache.get().await.unwrap();

    let result = usecase.execute(add_input("", "Hikaru")).await;
    assert!(
        matches!(result, Err(ApiError::Validation(_))),
        "expected Validation, got {result:?}"
    );
    cache.get().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ── Telegram users ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_insert_telegram_user_once() {
    let users = MockTelegramUserRepo::new(vec![]);
    let stored = users.users_handle();
    let usecase = InsertTelegramUserUseCase { users };

    let subscriber = TelegramUser {
        id: 4_200_001,
        is_active: true,
    };
    usecase.execute(subscriber).await.unwrap();
    usecase
        .execute(TelegramUser {
            is_active: false,
            ..subscriber
        })
        .await
        .unwrap();

    assert_eq!(*stored.lock().unwrap(), vec![subscriber]);
}

#[tokio::test]
async fn should_report_missing_telegram_user_on_update() {
    let usecase = UpdateTelegramUserUseCase {
        users: MockTelegramUserRepo::new(vec![]),
    };

    let result = usecase
        .execute(TelegramUser {
            id: 7,
            is_active: false,
        })
        .await;

    assert!(
        matches!(result, Err(ApiError::TelegramUserNotFound)),
        "expected TelegramUserNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_list_only_active_telegram_users() {
    let users = MockTelegramUserRepo::new(vec![
        TelegramUser { id: 1, is_active: true },
        TelegramUser { id: 2, is_active: true },
    ]);
    let update = UpdateTelegramUserUseCase { users };
    update
        .execute(TelegramUser { id: 2, is_active: false })
        .await
        .unwrap();

    let list = ListActiveTelegramUsersUseCase {
        users: update.users,
    };
    assert_eq!(list.execute().await.unwrap(), vec![1]);
}
