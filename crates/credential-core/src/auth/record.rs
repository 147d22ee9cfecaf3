// ============================
// crates/credential-core/src/auth/record.rs
// ============================
//! Bcrypt password records in modular-crypt format.
//!
//! A record reads `$<version>$<cost>$<salt><hash>`, e.g.
//! `$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW`.
//! The salt is 22 characters and the hash 31 characters of the bcrypt base64
//! alphabet (`./A-Za-z0-9`), so the two fields need no delimiter between them.
use std::fmt;
use std::str::FromStr;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Lowest accepted bcrypt cost.
pub const MIN_COST: u32 = 4;
/// Highest accepted bcrypt cost.
pub const MAX_COST: u32 = 31;

const SALT_LEN: usize = 22;
const HASH_LEN: usize = 31;
const SALT_BYTES: usize = 16;

const BCRYPT_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Bcrypt variant named by the record prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcryptVersion {
    TwoA,
    TwoB,
    TwoY,
}

impl BcryptVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            BcryptVersion::TwoA => "2a",
            BcryptVersion::TwoB => "2b",
            BcryptVersion::TwoY => "2y",
        }
    }
}

impl fmt::Display for BcryptVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BcryptVersion {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2a" => Ok(BcryptVersion::TwoA),
            "2b" => Ok(BcryptVersion::TwoB),
            "2y" => Ok(BcryptVersion::TwoY),
            _ => Err(AuthError::InvalidRecord),
        }
    }
}

/// A parsed password credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasswordRecord {
    version: BcryptVersion,
    cost: u32,
    salt: String,
    hash: String,
}

impl PasswordRecord {
    /// Assemble a record from its fields, validating each one.
    pub fn new(
        version: BcryptVersion,
        cost: u32,
        salt: impl Into<String>,
        hash: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let salt = salt.into();
        let hash = hash.into();

        if !(MIN_COST..=MAX_COST).contains(&cost)
            || !is_encoded_field(&salt, SALT_LEN)
            || !is_encoded_field(&hash, HASH_LEN)
        {
            return Err(AuthError::InvalidRecord);
        }

        Ok(Self {
            version,
            cost,
            salt,
            hash,
        })
    }

    pub fn version(&self) -> BcryptVersion {
        self.version
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// The 22-character encoded salt.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// The 31-character encoded hash.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Decode the salt into the 16 raw bytes bcrypt consumes.
    pub fn salt_bytes(&self) -> Result<[u8; SALT_BYTES], AuthError> {
        let decoded = BCRYPT_B64
            .decode(&self.salt)
            .map_err(|_| AuthError::InvalidRecord)?;
        decoded.try_into().map_err(|_| AuthError::InvalidRecord)
    }

    /// Encode to the storable `$<version>$<cost>$<salt><hash>` form.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

fn is_encoded_field(field: &str, len: usize) -> bool {
    field.len() == len
        && field
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'/')
}

impl fmt::Display for PasswordRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}${:02}${}{}",
            self.version, self.cost, self.salt, self.hash
        )
    }
}

impl FromStr for PasswordRecord {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix('$').ok_or(AuthError::InvalidRecord)?;
        let mut fields = rest.splitn(3, '$');

        let version = fields
            .next()
            .ok_or(AuthError::InvalidRecord)?
            .parse::<BcryptVersion>()?;

        let cost = fields.next().ok_or(AuthError::InvalidRecord)?;
        if cost.len() != 2 || !cost.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuthError::InvalidRecord);
        }
        let cost = cost.parse::<u32>().map_err(|_| AuthError::InvalidRecord)?;

        let tail = fields.next().ok_or(AuthError::InvalidRecord)?;
        if !is_encoded_field(tail, SALT_LEN + HASH_LEN) {
            return Err(AuthError::InvalidRecord);
        }
        let (salt, hash) = tail.split_at(SALT_LEN);

        Self::new(version, cost, salt, hash)
    }
}

impl TryFrom<String> for PasswordRecord {
    type Error = AuthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PasswordRecord> for String {
    fn from(record: PasswordRecord) -> Self {
        record.encode()
    }
}
