//! Integration tests for session issuance, validation, expiry and sweeping.

mod common;

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use common::{Harness, PASSWORD, SESSION_TTL_SECS};
use saas_core::application::handlers::auth::{LoginCommand, SessionSweeper};
use saas_core::domain::foundation::{AuthError, UserId};
use saas_core::ports::{SessionStore, UserRepository};

// ════════════════════════════════════════════════════════════════════════════════
// Register, login, authenticate
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn login_token_authenticates_as_its_user() {
    let h = Harness::new();
    let registered = h.register("a@x.com").await;

    let session = h
        .state
        .login
        .handle(LoginCommand {
            email: "a@x.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();

    h.clock.advance_secs(SESSION_TTL_SECS - 1);
    let user_id = h.state.guard.authenticate(Some(&session.token)).await.unwrap();
    assert_eq!(user_id, registered.user.id);
}

#[tokio::test]
async fn registration_token_is_immediately_usable() {
    let h = Harness::new();
    let registered = h.register("a@x.com").await;

    let user_id = h
        .state
        .guard
        .authenticate(Some(&registered.session.token))
        .await
        .unwrap();
    assert_eq!(user_id, registered.user.id);
}

// ════════════════════════════════════════════════════════════════════════════════
// Expiry
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn expired_session_is_rejected_and_removed() {
    let h = Harness::new();
    let token = h.register("a@x.com").await.session.token;

    h.clock.advance_secs(SESSION_TTL_SECS);
    let err = h.state.guard.authenticate(Some(&token)).await.unwrap_err();

    assert_eq!(err, AuthError::ExpiredSession);
    assert!(h.store.find(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn second_use_of_expired_token_is_unknown() {
    let h = Harness::new();
    let token = h.register("a@x.com").await.session.token;

    h.clock.advance_secs(SESSION_TTL_SECS + 60);
    let _ = h.state.guard.authenticate(Some(&token)).await;
    let err = h.state.guard.authenticate(Some(&token)).await.unwrap_err();

    assert_eq!(err, AuthError::UnknownSession);
}

// ════════════════════════════════════════════════════════════════════════════════
// Revocation and cascade
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn revoked_token_is_unknown_and_revoke_is_idempotent() {
    let h = Harness::new();
    let token = h.register("a@x.com").await.session.token;

    assert!(h.state.guard.revoke(&token).await.unwrap());
    assert!(!h.state.guard.revoke(&token).await.unwrap());

    let err = h.state.guard.authenticate(Some(&token)).await.unwrap_err();
    assert_eq!(err, AuthError::UnknownSession);
}

#[tokio::test]
async fn deleting_user_invalidates_sessions() {
    let h = Harness::new();
    let registered = h.register("a@x.com").await;

    assert!(UserRepository::delete(&h.store, &registered.user.id).await.unwrap());

    let err = h
        .state
        .guard
        .authenticate(Some(&registered.session.token))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::UnknownSession);
    assert_eq!(h.store.session_count().await, 0);
}

#[tokio::test]
async fn store_outage_is_transient_not_unauthenticated() {
    let h = Harness::new();
    let token = h.register("a@x.com").await.session.token;

    h.store.set_unavailable(true);
    let err = h.state.guard.authenticate(Some(&token)).await.unwrap_err();

    assert!(err.is_transient());
    assert_eq!(err.reason_code(), "AUTH_UNAVAILABLE");
}

// ════════════════════════════════════════════════════════════════════════════════
// Sweeper
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn sweeper_removes_only_expired_sessions() {
    let h = Harness::new();
    let old = h.register("old@x.com").await.session.token;

    h.clock.advance_secs(SESSION_TTL_SECS / 2);
    let fresh = h.register("fresh@x.com").await.session.token;

    h.clock.advance_secs(SESSION_TTL_SECS / 2 + 1);
    let sweeper = SessionSweeper::new(
        Arc::new(h.store.clone()),
        h.clock.clone(),
        Duration::from_secs(300),
    );

    assert_eq!(sweeper.sweep_once().await.unwrap(), 1);
    assert!(h.store.find(&old).await.unwrap().is_none());
    assert!(h.store.find(&fresh).await.unwrap().is_some());
}

// ════════════════════════════════════════════════════════════════════════════════
// Determinism
// ════════════════════════════════════════════════════════════════════════════════

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn authenticate_is_deterministic_for_arbitrary_tokens(token in "[A-Za-z0-9._ -]{0,80}") {
        let h = Harness::new();
        let (first, second) = runtime().block_on(async {
            let first = h.state.guard.authenticate(Some(&token)).await;
            let second = h.state.guard.authenticate(Some(&token)).await;
            (first, second)
        });

        prop_assert_eq!(&first, &second);
        prop_assert!(first.is_err());
    }

    #[test]
    fn live_token_authenticates_the_same_user_every_time(
        offsets in proptest::collection::vec(0i64..SESSION_TTL_SECS, 1..4)
    ) {
        let rt = runtime();
        let h = Harness::new();
        let (expected, seen) = rt.block_on(async {
            let guard = &h.state.guard;
            let issued = guard
                .issue(UserId::new())
                .await
                .unwrap();

            let mut seen = Vec::new();
            let mut sorted = offsets.clone();
            sorted.sort_unstable();
            let mut elapsed = 0;
            for offset in sorted {
                h.clock.advance_secs(offset - elapsed);
                elapsed = offset;
                seen.push(guard.authenticate(Some(&issued.token)).await);
            }
            (issued.user_id, seen)
        });

        for result in seen {
            prop_assert_eq!(result, Ok(expected));
        }
    }
}
