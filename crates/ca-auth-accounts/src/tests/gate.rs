use super::*;

// Helper to create an enrolled user and a token for it
async fn create_logged_in_user(h: &TestHarness, username: &str) -> String {
    h.service
        .create_user(Some(&admin()), username, "pw123", UserRole::Client)
        .await
        .unwrap();
    h.service.login(username, "pw123").await.unwrap().token
}

#[tokio::test]
async fn test_missing_token() {
    let h = create_test_harness(true).await;

    assert!(matches!(
        h.service.authenticate(None).await,
        Err(AccountError::NoToken)
    ));
    assert!(matches!(
        h.service.authenticate(Some("   ")).await,
        Err(AccountError::NoToken)
    ));
}

#[tokio::test]
async fn test_malformed_token() {
    let h = create_test_harness(true).await;

    assert!(matches!(
        h.service.authenticate(Some("not-a-token")).await,
        Err(AccountError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_expired_token() {
    let h = create_test_harness(true).await;
    let token = create_logged_in_user(&h, "bob").await;

    h.clock.advance(2 * 3600);

    assert!(matches!(
        h.service.authenticate(Some(token.as_str())).await,
        Err(AccountError::TokenExpired)
    ));
}

#[tokio::test]
async fn test_removed_credential_rejects_valid_token() {
    let h = create_test_harness(true).await;
    let token = create_logged_in_user(&h, "bob").await;
    assert!(h.service.authenticate(Some(token.as_str())).await.is_ok());

    h.wallet.remove("bob").await.unwrap();

    // Signature and expiry still check out
    assert!(h.service.tokens().verify(&token).is_ok());
    assert!(matches!(
        h.service.authenticate(Some(token.as_str())).await,
        Err(AccountError::NoCredential)
    ));
}

#[tokio::test]
async fn test_authenticated_identity_carries_claim() {
    let h = create_test_harness(true).await;
    let token = create_logged_in_user(&h, "bob").await;

    let identity = h.service.authenticate(Some(token.as_str())).await.unwrap();
    assert_eq!(identity.user_id, "bob");
    assert_eq!(identity.username, "bob");
    assert_eq!(identity.role, UserRole::Client);
    assert_eq!(identity.issued_at, START);
    assert_eq!(identity.expires_at, START + 3600);
}

#[tokio::test]
async fn test_authentication_failures_are_classified() {
    for error in [
        AccountError::NoToken,
        AccountError::InvalidToken,
        AccountError::TokenExpired,
        AccountError::NoCredential,
        AccountError::WrongPassword,
        AccountError::AccountNotFound,
    ] {
        assert!(error.is_authentication_failure(), "{:?}", error);
    }
    assert!(!AccountError::Forbidden.is_authentication_failure());
    assert!(!AccountError::DuplicateAccount("bob".to_string()).is_authentication_failure());
}
