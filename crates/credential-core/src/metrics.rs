// ==============
// crates/credential-core/src/metrics.rs

//! Central place for metric keys
pub const PASSWORD_HASHED: &str = "password.hashed";
pub const PASSWORD_VERIFIED: &str = "password.verified";
pub const TOKEN_ISSUED: &str = "token.issued";
pub const TOKEN_REJECTED: &str = "token.rejected";
