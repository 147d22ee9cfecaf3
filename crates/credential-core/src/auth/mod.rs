// ============================
// crates/credential-core/src/auth/mod.rs
// ============================
//! Password credentials and signed tokens.
pub mod password;
pub mod record;
pub mod secret;
mod service;
mod service_impl;
pub mod token;

pub use password::{
    hash_password, hash_password_zeroizing, verify_password, verify_password_record,
    PasswordCredentialService, DEFAULT_COST, MAX_PASSWORD_BYTES,
};
pub use record::{BcryptVersion, PasswordRecord, MAX_COST, MIN_COST};
pub use secret::SecretKey;
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::{
    Claims, TokenService, VerifiedClaims, DEFAULT_TOKEN_TTL, EXPIRY_CLAIM, ISSUED_AT_CLAIM,
    MAX_TOKEN_TTL,
};
