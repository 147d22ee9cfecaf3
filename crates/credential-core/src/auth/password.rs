// ============================
// crates/credential-core/src/auth/password.rs
// ============================
//! Password hashing and verification.
//!
//! Hashing and verifying are deliberately slow (2^cost bcrypt rounds). Async
//! callers should go through [`crate::auth::AuthService`], which runs them on
//! the blocking pool.
use bcrypt::Version;
use metrics::counter;
use rand::{rngs::OsRng, TryRngCore};
use subtle::ConstantTimeEq;
use tracing::{debug, instrument, warn};
use zeroize::Zeroize;

use super::record::{PasswordRecord, MAX_COST, MIN_COST};
use crate::config::Settings;
use crate::error::AuthError;
use crate::metrics::{PASSWORD_HASHED, PASSWORD_VERIFIED};

/// Default bcrypt cost
pub const DEFAULT_COST: u32 = 12;

/// Longest plaintext accepted, in bytes. Bcrypt ignores anything past this.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes and verifies passwords at a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordCredentialService {
    cost: u32,
}

impl Default for PasswordCredentialService {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordCredentialService {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        check_cost(cost)?;
        Ok(Self { cost })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AuthError> {
        Self::new(settings.cost_factor)
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `plain` at the configured cost.
    pub fn hash(&self, plain: &str) -> Result<PasswordRecord, AuthError> {
        hash_password(plain, self.cost)
    }

    /// Hash `plain` at an explicit cost.
    pub fn hash_with_cost(&self, plain: &str, cost: u32) -> Result<PasswordRecord, AuthError> {
        hash_password(plain, cost)
    }

    /// Check `plain` against a stored record. Malformed records never match.
    pub fn verify(&self, plain: &str, record: &str) -> bool {
        verify_password(plain, record)
    }
}

fn check_cost(cost: u32) -> Result<(), AuthError> {
    if (MIN_COST..=MAX_COST).contains(&cost) {
        Ok(())
    } else {
        Err(AuthError::InvalidInput(format!(
            "cost factor must be between {MIN_COST} and {MAX_COST}"
        )))
    }
}

fn check_plaintext(plain: &str) -> Result<(), AuthError> {
    if plain.is_empty() {
        return Err(AuthError::InvalidInput("password is empty".to_string()));
    }
    if plain.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::InvalidInput(format!(
            "password exceeds {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Run bcrypt and re-parse its output into a record.
fn derive(plain: &str, cost: u32, salt: [u8; 16]) -> Result<PasswordRecord, AuthError> {
    let parts = bcrypt::hash_with_salt(plain, cost, salt)
        .map_err(|e| AuthError::InternalFailure(format!("bcrypt failed: {e}")))?;
    parts
        .format_for_version(Version::TwoB)
        .parse()
        .map_err(|_| AuthError::InternalFailure("bcrypt produced an unreadable record".to_string()))
}

/// Hash a password with a fresh random salt.
#[instrument(skip_all, fields(cost = cost))]
pub fn hash_password(plain: &str, cost: u32) -> Result<PasswordRecord, AuthError> {
    check_plaintext(plain)?;
    check_cost(cost)?;

    let mut salt = [0u8; 16];
    OsRng.try_fill_bytes(&mut salt).map_err(|e| {
        warn!(error = %e, "os rng unavailable");
        AuthError::InternalFailure("random source unavailable".to_string())
    })?;

    let record = derive(plain, cost, salt)?;
    counter!(PASSWORD_HASHED).increment(1);
    debug!("password hashed");
    Ok(record)
}

/// Hash a caller-owned password and wipe it afterwards.
pub fn hash_password_zeroizing(plain: &mut String, cost: u32) -> Result<PasswordRecord, AuthError> {
    let result = hash_password(plain, cost);
    plain.zeroize();
    result
}

/// Verify a password against a stored record string.
///
/// Returns `false` for a wrong password and for anything that is not a
/// readable bcrypt record, so a corrupt record looks like a wrong password.
pub fn verify_password(plain: &str, record: &str) -> bool {
    let Ok(record) = record.parse::<PasswordRecord>() else {
        debug!("password record rejected as unreadable");
        counter!(PASSWORD_VERIFIED, "outcome" => "invalid_record").increment(1);
        return false;
    };
    match_or_reject(verify_password_record(plain, &record))
}

/// Collapse a verification result to a boolean, logging anything that was not
/// a plain match or mismatch.
fn match_or_reject(result: Result<bool, AuthError>) -> bool {
    match result {
        Ok(matched) => matched,
        Err(err @ AuthError::InternalFailure(_)) => {
            warn!(error = %err, "password verification failed internally");
            false
        },
        Err(err) => {
            debug!(code = err.error_code(), "password record rejected");
            false
        },
    }
}

/// Verify a password against a parsed record.
///
/// The recomputed hash is compared in constant time.
#[instrument(skip_all, fields(cost = record.cost()))]
pub fn verify_password_record(plain: &str, record: &PasswordRecord) -> Result<bool, AuthError> {
    if check_plaintext(plain).is_err() {
        counter!(PASSWORD_VERIFIED, "outcome" => "mismatch").increment(1);
        return Ok(false);
    }

    let salt = record.salt_bytes()?;
    let candidate = derive(plain, record.cost(), salt)?;

    let matched: bool = candidate
        .hash()
        .as_bytes()
        .ct_eq(record.hash().as_bytes())
        .into();

    let outcome = if matched { "match" } else { "mismatch" };
    counter!(PASSWORD_VERIFIED, "outcome" => outcome).increment(1);
    Ok(matched)
}
