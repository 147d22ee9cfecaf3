// ============================
// crates/credential-core/src/auth/token.rs
// ============================
//! Signed, self-contained tokens.
//!
//! A token is three base64url segments joined by `.`:
//! `header.payload.signature`. The header names the algorithm (`HS256`), the
//! payload is the caller's claims plus `iat`/`exp` in Unix seconds, and the
//! signature is HMAC-SHA256 over `header.payload`. The layout matches an HS256
//! JSON Web Token.
use std::collections::BTreeMap;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use tracing::{debug, instrument};

use super::secret::SecretKey;
use crate::config::Settings;
use crate::error::AuthError;
use crate::metrics::{TOKEN_ISSUED, TOKEN_REJECTED};

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by a token. Ordered so the signed encoding is deterministic.
///
/// Anything placed here is readable by whoever holds the token; never put
/// passwords or other secrets in it.
pub type Claims = BTreeMap<String, Value>;

/// Claim the service injects for the issue time.
pub const ISSUED_AT_CLAIM: &str = "iat";
/// Claim the service injects for the expiry time.
pub const EXPIRY_CLAIM: &str = "exp";

/// Default token lifetime (1 hour)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Longest accepted token lifetime (100 years).
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Tokens longer than this are rejected without further work.
pub const MAX_TOKEN_LEN: usize = 8 * 1024;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Claims recovered from a token whose signature and expiry checked out.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedClaims {
    pub claims: Claims,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies tokens with one shared secret.
#[derive(Debug, Clone)]
pub struct TokenService {
    secret: SecretKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: SecretKey, ttl: Duration) -> Result<Self, AuthError> {
        check_secret(&secret)?;
        ttl_secs(ttl)?;
        Ok(Self { secret, ttl })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AuthError> {
        Self::new(settings.secret_key.clone(), settings.token_ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `claims` with the configured secret and lifetime.
    pub fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        Self::issue_with(claims, &self.secret, self.ttl)
    }

    /// Verify a token against the configured secret.
    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        Self::verify_with(token, &self.secret)
    }

    pub fn issue_with(claims: &Claims, secret: &SecretKey, ttl: Duration) -> Result<String, AuthError> {
        Self::issue_at(claims, secret, ttl, Utc::now())
    }

    pub fn verify_with(token: &str, secret: &SecretKey) -> Result<VerifiedClaims, AuthError> {
        Self::verify_at(token, secret, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    #[instrument(skip_all)]
    pub fn issue_at(
        claims: &Claims,
        secret: &SecretKey,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        check_secret(secret)?;
        let ttl = ttl_secs(ttl)?;

        for reserved in [ISSUED_AT_CLAIM, EXPIRY_CLAIM] {
            if claims.contains_key(reserved) {
                return Err(AuthError::InvalidInput(format!(
                    "claim `{reserved}` is reserved"
                )));
            }
        }

        let issued_at = now.timestamp();
        // `exp` has to be a timestamp verify can read back.
        let expires_at = issued_at
            .checked_add(ttl)
            .filter(|&exp| DateTime::from_timestamp(exp, 0).is_some())
            .ok_or_else(|| AuthError::InvalidInput("ttl is too large".to_string()))?;

        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        };

        let mut payload = claims.clone();
        payload.insert(ISSUED_AT_CLAIM.to_string(), Value::from(issued_at));
        payload.insert(EXPIRY_CLAIM.to_string(), Value::from(expires_at));

        let header = serde_json::to_vec(&header)
            .map_err(|e| AuthError::InternalFailure(format!("header encoding failed: {e}")))?;
        let payload = serde_json::to_vec(&payload)
            .map_err(|e| AuthError::InternalFailure(format!("payload encoding failed: {e}")))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = mac(secret, &signing_input)?.finalize().into_bytes();

        counter!(TOKEN_ISSUED).increment(1);
        debug!(expires_at, "token issued");
        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Verify a token as if the current time were `now`.
    #[instrument(skip_all)]
    pub fn verify_at(
        token: &str,
        secret: &SecretKey,
        now: DateTime<Utc>,
    ) -> Result<VerifiedClaims, AuthError> {
        check_secret(secret)?;

        let result = decode_verified(token, secret, now);
        if let Err(err) = &result {
            let reason = match err {
                AuthError::Malformed(_) => "malformed",
                AuthError::InvalidSignature => "invalid_signature",
                AuthError::Expired => "expired",
                _ => "other",
            };
            counter!(TOKEN_REJECTED, "reason" => reason).increment(1);
            debug!(reason, "token rejected");
        }
        result
    }
}

fn check_secret(secret: &SecretKey) -> Result<(), AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidInput("secret key is empty".to_string()));
    }
    Ok(())
}

fn ttl_secs(ttl: Duration) -> Result<i64, AuthError> {
    if ttl.as_secs() == 0 {
        return Err(AuthError::InvalidInput(
            "ttl must be at least one second".to_string(),
        ));
    }
    if ttl > MAX_TOKEN_TTL {
        return Err(AuthError::InvalidInput("ttl is too large".to_string()));
    }
    i64::try_from(ttl.as_secs()).map_err(|_| AuthError::InvalidInput("ttl is too large".to_string()))
}

fn mac(secret: &SecretKey, signing_input: &str) -> Result<HmacSha256, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AuthError::InternalFailure(format!("hmac key rejected: {e}")))?;
    mac.update(signing_input.as_bytes());
    Ok(mac)
}

fn malformed(reason: &str) -> AuthError {
    AuthError::Malformed(reason.to_string())
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| malformed(&format!("{what} is not base64url")))
}

fn decode_verified(
    token: &str,
    secret: &SecretKey,
    now: DateTime<Utc>,
) -> Result<VerifiedClaims, AuthError> {
    if token.len() > MAX_TOKEN_LEN {
        return Err(malformed("token too long"));
    }

    let segments: Vec<&str> = token.split('.').collect();
    let &[header, payload, signature] = segments.as_slice() else {
        return Err(malformed("expected three segments"));
    };
    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(malformed("empty segment"));
    }

    let signature = decode_segment(signature, "signature")?;
    let signing_input = &token[..header.len() + 1 + payload.len()];

    // Nothing in the header or payload is looked at until this passes.
    mac(secret, signing_input)?
        .verify_slice(&signature)
        .map_err(|_| AuthError::InvalidSignature)?;

    let header: Header = serde_json::from_slice(&decode_segment(header, "header")?)
        .map_err(|_| malformed("header is not valid json"))?;
    if header.alg != ALGORITHM {
        return Err(malformed("unsupported algorithm"));
    }

    let mut claims: Claims = serde_json::from_slice(&decode_segment(payload, "payload")?)
        .map_err(|_| malformed("payload is not a json object"))?;

    let issued_at = take_timestamp(&mut claims, ISSUED_AT_CLAIM)?;
    let expires_at = take_timestamp(&mut claims, EXPIRY_CLAIM)?;

    if now >= expires_at {
        return Err(AuthError::Expired);
    }

    Ok(VerifiedClaims {
        claims,
        issued_at,
        expires_at,
    })
}

fn take_timestamp(claims: &mut Claims, name: &str) -> Result<DateTime<Utc>, AuthError> {
    claims
        .remove(name)
        .and_then(|value| value.as_i64())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| malformed(&format!("missing or invalid `{name}` claim")))
}
