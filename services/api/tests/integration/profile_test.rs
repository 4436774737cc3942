use uuid::Uuid;

use chessclub_api::error::ApiError;
use chessclub_api::usecase::profile::{
    ShowProfileUseCase, UpdateProfileInput, UpdateProfileUseCase,
};
use chessclub_credentials::password::verify_password;

use crate::helpers::{MockUserRepo, active_user};

#[tokio::test]
async fn should_update_own_profile() {
    let user = active_user("botvinnik", "+255700000020");
    let users = MockUserRepo::new(vec![user.clone()]);
    let stored = users.users_handle();
    let usecase = UpdateProfileUseCase { users };

    usecase
        .execute(
            &user,
            user.id,
            UpdateProfileInput {
                full_name: Some("Mikhail Botvinnik".to_owned()),
                lichess_username: Some("patriarch".to_owned()),
                password: Some("english-opening".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stored = stored.lock().unwrap();
    assert_eq!(stored[0].full_name, "Mikhail Botvinnik");
    assert_eq!(stored[0].lichess_username, "patriarch");
    assert_eq!(stored[0].chesscom_username, user.chesscom_username);
    assert_eq!(stored[0].photo, user.photo);
    assert!(verify_password("english-opening", &stored[0].password_hash).unwrap());
}

#[tokio::test]
async fn should_forbid_updating_someone_else() {
    let actor = active_user("botvinnik", "+255700000020");
    let other = active_user("smyslov", "+255700000021");
    let users = MockUserRepo::new(vec![actor.clone(), other.clone()]);
    let stored = users.users_handle();
    let usecase = UpdateProfileUseCase { users };

    let result = usecase
        .execute(
            &actor,
            other.id,
            UpdateProfileInput {
                full_name: Some("Hijacked".to_owned()),
                ..Default::default()
            },
        )
        .await;

    assert!(
        matches!(result, Err(ApiError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
    assert_eq!(stored.lock().unwrap()[1].full_name, other.full_name);
}

#[tokio::test]
async fn should_reject_empty_profile_update() {
    let user = active_user("botvinnik", "+255700000020");
    let usecase = UpdateProfileUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
    };

    let result = usecase
        .execute(&user, user.id, UpdateProfileInput::default())
        .await;

    assert!(
        matches!(result, Err(ApiError::Validation(_))),
        "expected Validation, got {result:?}"
    );
}

#[tokio::test]
async fn should_show_stored_profile() {
    let user = active_user("botvinnik", "+255700000020");
    let usecase = ShowProfileUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
    };

    let shown = usecase.execute(user.id).await.unwrap();
    assert_eq!(shown.username, "botvinnik");

    let result = usecase.execute(Uuid::now_v7()).await;
    assert!(
        matches!(result, Err(ApiError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}
