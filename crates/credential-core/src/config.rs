// ============================
// crates/credential-core/src/config.rs
// ============================
//! Configuration management.
use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::{SecretKey, DEFAULT_COST, DEFAULT_TOKEN_TTL, MAX_COST, MAX_TOKEN_TTL, MIN_COST};
use crate::error::AuthError;

/// Config file read from the working directory by [`Settings::load`].
pub const CONFIG_FILE: &str = "credential.toml";

/// Prefix for environment overrides, e.g. `CREDENTIAL_SECRET_KEY`.
pub const ENV_PREFIX: &str = "CREDENTIAL_";

const SECRET_KEY: &str = "secret_key";
const SECRET_KEY_VAR: &str = "CREDENTIAL_SECRET_KEY";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Bcrypt cost factor
    pub cost_factor: u32,
    /// Token lifetime in seconds
    pub token_ttl_secs: u64,
    /// Shared token signing secret. Required; there is no default.
    pub secret_key: SecretKey,
    /// Log level
    pub log_level: String,
}

/// Everything that has a default. `secret_key` is deliberately absent.
#[derive(Debug, Serialize)]
struct Defaults {
    cost_factor: u32,
    token_ttl_secs: u64,
    log_level: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            cost_factor: DEFAULT_COST,
            token_ttl_secs: DEFAULT_TOKEN_TTL.as_secs(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Settings with defaults for everything but the secret.
    pub fn new(secret_key: impl Into<SecretKey>) -> Self {
        let defaults = Defaults::default();
        Self {
            cost_factor: defaults.cost_factor,
            token_ttl_secs: defaults.token_ttl_secs,
            secret_key: secret_key.into(),
            log_level: defaults.log_level,
        }
    }

    /// Load from `credential.toml` and `CREDENTIAL_*` environment variables.
    pub fn load() -> Result<Self, AuthError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load from an explicit config file plus environment overrides.
    ///
    /// A missing file is not an error; a missing secret is.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The provider stack: defaults, then file, then environment.
    pub fn figment(path: &Path) -> Figment {
        let figment = Figment::from(Serialized::defaults(Defaults::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&[SECRET_KEY]));

        // `Env` would read an all-digit secret as a number; take it verbatim.
        match Env::var(SECRET_KEY_VAR) {
            Some(raw) => figment.merge(Serialized::default(SECRET_KEY, raw)),
            None => figment,
        }
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if !(MIN_COST..=MAX_COST).contains(&self.cost_factor) {
            return Err(AuthError::Config(format!(
                "cost_factor must be between {MIN_COST} and {MAX_COST}"
            )));
        }
        if self.token_ttl_secs == 0 {
            return Err(AuthError::Config("token_ttl_secs must be positive".to_string()));
        }
        if self.token_ttl_secs > MAX_TOKEN_TTL.as_secs() {
            return Err(AuthError::Config(format!(
                "token_ttl_secs must be at most {}",
                MAX_TOKEN_TTL.as_secs()
            )));
        }
        if self.secret_key.is_empty() {
            return Err(AuthError::Config("secret_key must not be empty".to_string()));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(AuthError::Config(format!(
                "log_level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}
