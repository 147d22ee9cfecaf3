//! Register, log in, then make authenticated requests, the way an HTTP auth
//! layer would drive the services.
use std::sync::Arc;

use credential_core::{AuthError, AuthService, Claims, PasswordRecord};
use serde_json::json;
use zeroize::Zeroizing;

use crate::test_utils::fast_auth;

/// Stand-in for the caller's user table.
struct StoredUser {
    id: &'static str,
    record: String,
}

async fn register(auth: &dyn AuthService, id: &'static str, password: &str) -> StoredUser {
    let record = auth.hash_password(password).await.unwrap();
    StoredUser {
        id,
        record: record.encode(),
    }
}

async fn login(
    auth: &dyn AuthService,
    user: &StoredUser,
    password: &str,
) -> Result<String, AuthError> {
    if !auth.verify_password(password, &user.record).await? {
        return Err(AuthError::InvalidSignature);
    }
    let mut claims = Claims::new();
    claims.insert("id".to_string(), json!(user.id));
    auth.issue_token(&claims)
}

#[tokio::test]
async fn test_auth_service_flow() {
    let auth = fast_auth();
    let user = register(&auth, "1234", "hello").await;

    // The stored record is a portable bcrypt string
    let record: PasswordRecord = user.record.parse().unwrap();
    assert_eq!(record.cost(), 4);

    let token = login(&auth, &user, "hello").await.unwrap();
    let verified = auth.verify_token(&token).unwrap();
    assert_eq!(verified.claims.get("id"), Some(&json!("1234")));

    let err = login(&auth, &user, "wrong").await.unwrap_err();
    assert_eq!(err.sanitized_message(), "Invalid credentials");
}

#[tokio::test]
async fn test_corrupt_stored_record_looks_like_wrong_password() {
    let auth = fast_auth();
    let user = StoredUser {
        id: "1234",
        record: "$2b$04$corrupted".to_string(),
    };

    let err = login(&auth, &user, "hello").await.unwrap_err();
    assert!(err.is_credential_failure());
}

#[tokio::test]
async fn test_token_from_another_deployment_is_rejected() {
    let auth = fast_auth();
    let other = {
        let mut settings = crate::test_utils::fast_settings();
        settings.secret_key = "another-deployment".into();
        credential_core::DefaultAuth::from_settings(&settings).unwrap()
    };

    let mut claims = Claims::new();
    claims.insert("id".to_string(), json!("1234"));
    let token = other.issue_token(&claims).unwrap();

    assert!(matches!(
        auth.verify_token(&token),
        Err(AuthError::InvalidSignature)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_many_logins_in_parallel() {
    let auth: Arc<dyn AuthService> = Arc::new(fast_auth());
    let user = Arc::new(register(auth.as_ref(), "1234", "hello").await);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let auth = Arc::clone(&auth);
            let user = Arc::clone(&user);
            tokio::spawn(async move {
                let password = Zeroizing::new(if i % 2 == 0 { "hello" } else { "nope" }.to_string());
                login(auth.as_ref(), &user, &password).await.is_ok() == (i % 2 == 0)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap());
    }
}
