use async_trait::async_trait;
use tokio::task;
use zeroize::Zeroizing;

use crate::auth::{
    AuthService, Claims, PasswordCredentialService, PasswordRecord, TokenService, VerifiedClaims,
};
use crate::config::Settings;
use crate::error::AuthError;

/// Default `AuthService`: bcrypt on the blocking pool, tokens inline.
#[derive(Debug, Clone)]
pub struct DefaultAuth {
    passwords: PasswordCredentialService,
    tokens: TokenService,
}

impl DefaultAuth {
    pub fn new(passwords: PasswordCredentialService, tokens: TokenService) -> Self {
        Self { passwords, tokens }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AuthError> {
        Ok(Self::new(
            PasswordCredentialService::from_settings(settings)?,
            TokenService::from_settings(settings)?,
        ))
    }

    pub fn passwords(&self) -> &PasswordCredentialService {
        &self.passwords
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn hash_password(&self, plain: &str) -> Result<PasswordRecord, AuthError> {
        let passwords = self.passwords;
        let plain = Zeroizing::new(plain.to_owned());
        // If the caller drops this future the task still runs to completion;
        // its record is discarded with the join handle.
        task::spawn_blocking(move || passwords.hash(&plain)).await?
    }

    async fn verify_password(&self, plain: &str, record: &str) -> Result<bool, AuthError> {
        let passwords = self.passwords;
        let plain = Zeroizing::new(plain.to_owned());
        let record = record.to_owned();
        Ok(task::spawn_blocking(move || passwords.verify(&plain, &record)).await?)
    }

    fn issue_token(&self, claims: &Claims) -> Result<String, AuthError> {
        self.tokens.issue(claims)
    }

    fn verify_token(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        self.tokens.verify(token)
    }
}
