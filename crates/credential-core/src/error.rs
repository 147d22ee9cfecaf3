// crates/credential-core/src/error.rs

//! Central error type for credential and token operations.
use thiserror::Error;

/// Credential error types with error codes and sanitized messages
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid password record")]
    InvalidRecord,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Internal error: {0}")]
    InternalFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidInput(_) => "VAL_001",
            AuthError::InvalidRecord => "AUTH_001",
            AuthError::Malformed(_) => "AUTH_002",
            AuthError::InvalidSignature => "AUTH_003",
            AuthError::Expired => "AUTH_004",
            AuthError::InternalFailure(_) => "INT_001",
            AuthError::Config(_) => "CFG_001",
        }
    }

    /// True for failures an authentication flow must report as a generic
    /// "invalid credentials" response.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidRecord | AuthError::Malformed(_) | AuthError::InvalidSignature
        )
    }

    /// Get a sanitized message suitable for returning to an untrusted caller
    pub fn sanitized_message(&self) -> String {
        match self {
            AuthError::InvalidRecord | AuthError::Malformed(_) | AuthError::InvalidSignature => {
                "Invalid credentials".to_string()
            },
            AuthError::Expired => "Session expired".to_string(),
            AuthError::InvalidInput(_) => "Invalid input provided".to_string(),
            AuthError::InternalFailure(_) | AuthError::Config(_) => {
                "An internal error occurred".to_string()
            },
        }
    }
}

impl From<figment::Error> for AuthError {
    fn from(err: figment::Error) -> Self {
        AuthError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::InternalFailure(format!("blocking task failed: {err}"))
    }
}
