// ============================
// crates/credential-core/src/lib.rs
// ============================
//! Credential verification core: bcrypt password records and HMAC-signed
//! tokens.
//!
//! Both services are stateless and hold only read-only configuration. Build
//! them once at startup from [`config::Settings`] and share them freely.

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;

pub use auth::{
    AuthService, Claims, DefaultAuth, PasswordCredentialService, PasswordRecord, SecretKey,
    TokenService, VerifiedClaims, MAX_TOKEN_TTL,
};
pub use config::Settings;
pub use error::AuthError;
