//! Integration tests for the registration flow.
//!
//! Exercises the full request -> deliver -> verify lifecycle against
//! in-memory collaborators: issuance, resend cooldown, overwrite, lazy
//! expiry, delivery rollback, and promotion to a persisted account.

mod common;

use common::{ann_payload, TestHarness};
use commerce_core::domains::auth::AuthError;
use commerce_core::kernel::{BasePendingStore, NotificationKind};

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_register_then_verify_creates_account() {
    let h = TestHarness::new();

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();

    // exactly one code notification went out
    assert_eq!(h.notifier.count_to("u@test.com", NotificationKind::Otp), 1);
    let code = h.notifier.last_code().expect("a code should be recorded");
    assert_eq!(code.len(), 6);

    let session = h.registration.verify_code("u@test.com", &code).await.unwrap();

    assert_eq!(session.account.name, "Ann");
    assert_eq!(session.account.email, "u@test.com");
    assert!(session.account.email_verified);
    assert!(!session.token.is_empty());

    // token is a real session token for the created account
    let claims = h.jwt.verify_token(&session.token).unwrap();
    assert_eq!(claims.account_id, session.account.id);
}

#[tokio::test]
async fn test_profile_fields_round_trip_exactly() {
    let h = TestHarness::new();
    let payload = ann_payload();

    h.registration
        .request_registration("u@test.com", payload.clone())
        .await
        .unwrap();
    let code = h.notifier.last_code().unwrap();
    let session = h.registration.verify_code("u@test.com", &code).await.unwrap();

    assert_eq!(session.account.name, payload.name);
    assert_eq!(session.account.region, payload.region);
    assert_eq!(session.account.phone, payload.phone);
}

#[tokio::test]
async fn test_stored_credential_is_never_the_raw_password() {
    let h = TestHarness::new();

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();
    let code = h.notifier.last_code().unwrap();
    h.registration.verify_code("u@test.com", &code).await.unwrap();

    let stored = h.directory.get("u@test.com").unwrap();
    assert_ne!(stored.password_hash, "secret1");
    assert!(!stored.password_hash.contains("secret1"));
}

#[tokio::test]
async fn test_verified_code_is_trimmed_before_matching() {
    let h = TestHarness::new();

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();
    let code = h.notifier.last_code().unwrap();

    let padded = format!("  {}  ", code);
    assert!(h.registration.verify_code("u@test.com", &padded).await.is_ok());
}

// ============================================================================
// Validation and conflicts
// ============================================================================

#[tokio::test]
async fn test_register_rejects_malformed_input() {
    let h = TestHarness::new();

    let result = h
        .registration
        .request_registration("not-an-email", ann_payload())
        .await;
    assert!(matches!(result, Err(AuthError::Validation(_))));

    let mut short = ann_payload();
    short.password = "abc".to_string();
    let result = h.registration.request_registration("u@test.com", short).await;
    assert!(matches!(result, Err(AuthError::Validation(_))));

    // nothing was sent or stored
    assert!(h.notifier.sent().is_empty());
    assert!(h.store.get("u@test.com").await.is_none());
}

#[tokio::test]
async fn test_register_conflicts_with_existing_account() {
    let h = TestHarness::new();
    h.directory.seed("u@test.com", "hunter2", "Existing").await;

    let result = h
        .registration
        .request_registration("u@test.com", ann_payload())
        .await;
    assert!(matches!(result, Err(AuthError::Conflict)));
    assert!(h.notifier.sent().is_empty());
}

// ============================================================================
// Code checking
// ============================================================================

#[tokio::test]
async fn test_wrong_code_is_rejected_and_entry_survives() {
    let h = TestHarness::with_codes(vec!["111111"]);

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();

    let result = h.registration.verify_code("u@test.com", "999999").await;
    assert!(matches!(result, Err(AuthError::InvalidCode)));

    // failed attempt does not consume the pending entry
    assert!(h.registration.verify_code("u@test.com", "111111").await.is_ok());
}

#[tokio::test]
async fn test_verify_unknown_address_is_not_found() {
    let h = TestHarness::new();
    let result = h.registration.verify_code("nobody@test.com", "123456").await;
    assert!(matches!(result, Err(AuthError::NotFound)));
}

#[tokio::test]
async fn test_second_request_overwrites_first_code() {
    let h = TestHarness::with_codes(vec!["111111", "222222"]);

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();
    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();

    // the first code no longer verifies
    let result = h.registration.verify_code("u@test.com", "111111").await;
    assert!(matches!(result, Err(AuthError::InvalidCode)));

    // only the newest one does
    assert!(h.registration.verify_code("u@test.com", "222222").await.is_ok());
}

#[tokio::test]
async fn test_double_submission_cannot_create_two_accounts() {
    let h = TestHarness::new();

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();
    let code = h.notifier.last_code().unwrap();

    assert!(h.registration.verify_code("u@test.com", &code).await.is_ok());

    // pending entry was removed with the first promotion
    let result = h.registration.verify_code("u@test.com", &code).await;
    assert!(matches!(result, Err(AuthError::NotFound)));
}

// ============================================================================
// Expiry (lazy, no sweeper)
// ============================================================================

#[tokio::test]
async fn test_expired_code_is_not_found_even_if_correct() {
    let h = TestHarness::with_codes(vec!["111111"]);

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();

    // back-date the entry past its window
    let mut entry = h.store.get("u@test.com").await.unwrap();
    entry.expires_at = chrono::Utc::now() - chrono::Duration::seconds(1);
    h.store.put(entry).await;

    let result = h.registration.verify_code("u@test.com", "111111").await;
    assert!(matches!(result, Err(AuthError::NotFound)));

    // idempotent: the stale entry was discarded, repeat gives the same answer
    let result = h.registration.verify_code("u@test.com", "111111").await;
    assert!(matches!(result, Err(AuthError::NotFound)));
}

#[tokio::test]
async fn test_resend_after_expiry_is_not_found() {
    let h = TestHarness::new();

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();

    let mut entry = h.store.get("u@test.com").await.unwrap();
    entry.expires_at = chrono::Utc::now() - chrono::Duration::minutes(1);
    h.store.put(entry).await;

    let result = h.registration.resend_code("u@test.com").await;
    assert!(matches!(result, Err(AuthError::NotFound)));
}

// ============================================================================
// Resend and cooldown
// ============================================================================

#[tokio::test]
async fn test_resend_issues_fresh_code() {
    let h = TestHarness::with_codes(vec!["111111", "222222"]);

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();
    h.registration.resend_code("u@test.com").await.unwrap();

    assert_eq!(h.notifier.count_to("u@test.com", NotificationKind::Otp), 2);
    assert_eq!(h.notifier.last_code().unwrap(), "222222");

    // old code invalid, new one verifies; payload untouched
    let result = h.registration.verify_code("u@test.com", "111111").await;
    assert!(matches!(result, Err(AuthError::InvalidCode)));
    let session = h.registration.verify_code("u@test.com", "222222").await.unwrap();
    assert_eq!(session.account.name, "Ann");
}

#[tokio::test]
async fn test_second_resend_within_cooldown_is_rate_limited() {
    let h = TestHarness::with_codes(vec!["111111", "222222", "333333"]);

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();

    // first resend is allowed (no prior re-issuance to cool down from)
    h.registration.resend_code("u@test.com").await.unwrap();

    let result = h.registration.resend_code("u@test.com").await;
    assert!(matches!(result, Err(AuthError::RateLimited)));

    // the failed attempt left the code unchanged
    assert!(h.registration.verify_code("u@test.com", "222222").await.is_ok());
}

#[tokio::test]
async fn test_cooldown_off_variant_allows_rapid_resends() {
    let h = TestHarness::without_cooldown();

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();
    h.registration.resend_code("u@test.com").await.unwrap();
    h.registration.resend_code("u@test.com").await.unwrap();

    assert_eq!(h.notifier.count_to("u@test.com", NotificationKind::Otp), 3);
    let code = h.notifier.last_code().unwrap();
    assert!(h.registration.verify_code("u@test.com", &code).await.is_ok());
}

#[tokio::test]
async fn test_resend_for_unknown_address_is_not_found() {
    let h = TestHarness::new();
    let result = h.registration.resend_code("nobody@test.com").await;
    assert!(matches!(result, Err(AuthError::NotFound)));
}

// ============================================================================
// Delivery failures
// ============================================================================

#[tokio::test]
async fn test_failed_delivery_rolls_back_pending_state() {
    let h = TestHarness::new();
    h.notifier.set_failing(true);

    let result = h
        .registration
        .request_registration("u@test.com", ann_payload())
        .await;
    assert!(matches!(result, Err(AuthError::Delivery(_))));

    // no orphaned pending entry: the address is back to square one
    assert!(h.store.get("u@test.com").await.is_none());

    // and a later request goes through cleanly
    h.notifier.set_failing(false);
    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();
    let code = h.notifier.last_code().unwrap();
    assert!(h.registration.verify_code("u@test.com", &code).await.is_ok());
}

#[tokio::test]
async fn test_welcome_failure_does_not_fail_registration() {
    let h = TestHarness::new();

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();
    let code = h.notifier.last_code().unwrap();

    // the OTP already went out; now every send fails, including the welcome
    h.notifier.set_failing(true);
    let session = h.registration.verify_code("u@test.com", &code).await.unwrap();
    assert!(!session.token.is_empty());
    assert!(h.directory.get("u@test.com").is_some());
}

#[tokio::test]
async fn test_welcome_notice_is_sent_after_verification() {
    let h = TestHarness::new();

    h.registration
        .request_registration("u@test.com", ann_payload())
        .await
        .unwrap();
    let code = h.notifier.last_code().unwrap();
    h.registration.verify_code("u@test.com", &code).await.unwrap();

    // dispatched as a detached task; give it a beat to run
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(
        h.notifier.count_to("u@test.com", NotificationKind::Welcome),
        1
    );
}
