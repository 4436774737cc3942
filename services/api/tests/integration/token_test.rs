use chrono::Utc;

use chessclub_api::domain::types::Identifier;
use chessclub_api::error::ApiError;
use chessclub_api::usecase::token::{
    LoginInput, LoginUseCase, LogoutUseCase, VerifyTokenUseCase, issue_token,
};
use chessclub_credentials::token::{self, Scope, TOKEN_LEN};

use crate::helpers::{MockTokenRepo, MockUserRepo, TEST_PASSWORD, active_user, pending_user};

fn login_input(username: &str, password: &str) -> LoginInput {
    LoginInput {
        identifier: Some(Identifier::Username(username.to_owned())),
        password: password.to_owned(),
    }
}

// ── Issue / Verify ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_verify_issued_token_until_expiry() {
    let user = active_user("capablanca", "+255700000010");
    let users = MockUserRepo::new(vec![user.clone()]);
    let tokens = MockTokenRepo::new(users.users_handle());
    let now = Utc::now();

    let issued = issue_token(&tokens, user.id, Scope::Authentication, now)
        .await
        .unwrap();
    assert_eq!(issued.plaintext.len(), TOKEN_LEN);

    let verify = VerifyTokenUseCase { tokens };
    let verified = verify
        .execute_at(&issued.plaintext, Scope::Authentication, now)
        .await
        .unwrap();
    assert_eq!(verified.user.id, user.id);

    let result = verify
        .execute_at(&issued.plaintext, Scope::Authentication, issued.expiry)
        .await;
    assert!(
        matches!(result, Err(ApiError::Unauthorized)),
        "expected Unauthorized, got {result:?}"
    );
}

#[tokio::test]
async fn should_store_only_token_hash() {
    let user = active_user("capablanca", "+255700000010");
    let users = MockUserRepo::new(vec![user.clone()]);
    let tokens = MockTokenRepo::new(users.users_handle());
    let stored = tokens.tokens_handle();

    let issued = issue_token(&tokens, user.id, Scope::Activation, Utc::now())
        .await
        .unwrap();

    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].hash, token::hash(&issued.plaintext));
    assert_ne!(&stored[0].hash[..], issued.plaintext.as_bytes());
    assert_eq!(stored[0].scope, Scope::Activation);
}

#[tokio::test]
async fn should_reject_token_presented_for_other_scope() {
    let user = active_user("capablanca", "+255700000010");
    let users = MockUserRepo::new(vec![user.clone()]);
    let tokens = MockTokenRepo::new(users.users_handle());
    let now = Utc::now();
    let issued = issue_token(&tokens, user.id, Scope::PasswordReset, now)
        .await
        .unwrap();

    let verify = VerifyTokenUseCase { tokens };
    let result = verify
        .execute_at(&issued.plaintext, Scope::Authentication, now)
        .await;

    assert!(
        matches!(result, Err(ApiError::Unauthorized)),
        "expected Unauthorized, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_malformed_token() {
    let users = MockUserRepo::empty();
    let verify = VerifyTokenUseCase {
        tokens: MockTokenRepo::new(users.users_handle()),
    };

    for presented in ["", "short", "abcdefghijklmnopqrstuvwxyz", "ABCDEFGHIJKLMNOPQRSTUVWXY1"] {
        let result = verify.execute(presented, Scope::Authentication).await;
        assert!(
            matches!(result, Err(ApiError::Unauthorized)),
            "expected Unauthorized for {presented:?}, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_reject_unknown_well_formed_token() {
    let users = MockUserRepo::empty();
    let verify = VerifyTokenUseCase {
        tokens: MockTokenRepo::new(users.users_handle()),
    };
    let unknown = token::generate().unwrap();

    let result = verify
        .execute(&unknown.plaintext, Scope::Authentication)
        .await;

    assert!(
        matches!(result, Err(ApiError::Unauthorized)),
        "expected Unauthorized, got {result:?}"
    );
}

// ── Login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_login_active_account() {
    let user = active_user("capablanca", "+255700000010");
    let users = MockUserRepo::new(vec![user.clone()]);
    let tokens = MockTokenRepo::new(users.users_handle());
    let stored = tokens.tokens_handle();
    let usecase = LoginUseCase { users, tokens };

    let issued = usecase
        .execute(login_input("capablanca", TEST_PASSWORD))
        .await
        .unwrap();

    let stored = stored.lock().unwrap();
    assert_eq!(stored[0].user_id, user.id);
    assert_eq!(stored[0].scope, Scope::Authentication);
    assert_eq!(stored[0].expiry, issued.expiry);
}

#[tokio::test]
async fn should_login_by_phone_number() {
    let users = MockUserRepo::new(vec![active_user("capablanca", "+255700000010")]);
    let tokens = MockTokenRepo::new(users.users_handle());
    let usecase = LoginUseCase { users, tokens };

    let result = usecase
        .execute(LoginInput {
            identifier: Some(Identifier::PhoneNumber("+255700000010".to_owned())),
            password: TEST_PASSWORD.to_owned(),
        })
        .await;

    assert!(result.is_ok(), "expected Ok, got {result:?}");
}

#[tokio::test]
async fn should_give_generic_error_for_every_login_failure() {
    let users = MockUserRepo::new(vec![
        active_user("capablanca", "+255700000010"),
        pending_user("alekhine", "+255700000011", "111111"),
    ]);
    let tokens = MockTokenRepo::new(users.users_handle());
    let stored = tokens.tokens_handle();
    let usecase = LoginUseCase { users, tokens };

    for input in [
        login_input("capablanca", "wrong-password"),
        login_input("nobody", TEST_PASSWORD),
        login_input("alekhine", TEST_PASSWORD),
    ] {
        let result = usecase.execute(input).await;
        assert!(
            matches!(result, Err(ApiError::InvalidCredentials)),
            "expected InvalidCredentials, got {result:?}"
        );
    }
    assert!(stored.lock().unwrap().is_empty());
}

// ── Logout ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_token_on_logout() {
    let user = active_user("capablanca", "+255700000010");
    let users = MockUserRepo::new(vec![user.clone()]);
    let tokens = MockTokenRepo::new(users.users_handle());
    let stored = tokens.tokens_handle();
    let issued = issue_token(&tokens, user.id, Scope::Authentication, Utc::now())
        .await
        .unwrap();

    let logout = LogoutUseCase { tokens };
    logout
        .execute(&token::hash(&issued.plaintext))
        .await
        .unwrap();

    assert!(stored.lock().unwrap().is_empty());
    let verify = VerifyTokenUseCase {
        tokens: logout.tokens,
    };
    let result = verify
        .execute(&issued.plaintext, Scope::Authentication)
        .await;
    assert!(
        matches!(result, Err(ApiError::Unauthorized)),
        "expected Unauthorized, got {result:?}"
    );
}
