// =============
// crates/credential-core/src/auth/service.rs
// =============
//! This module defines the `AuthService` trait, the async entry point to
//! password and token operations.
use async_trait::async_trait;

use super::{Claims, PasswordRecord, VerifiedClaims};
use crate::error::AuthError;

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Hash a password off the async executor.
    async fn hash_password(&self, plain: &str) -> Result<PasswordRecord, AuthError>;

    /// Verify a password off the async executor. Malformed records yield `Ok(false)`.
    async fn verify_password(&self, plain: &str, record: &str) -> Result<bool, AuthError>;

    fn issue_token(&self, claims: &Claims) -> Result<String, AuthError>;

    fn verify_token(&self, token: &str) -> Result<VerifiedClaims, AuthError>;
}
