//! Runs a register/login round trip against the credential core: hash a
//! password, verify it, issue a token for the user and verify that token.
//!
//! Needs `CREDENTIAL_SECRET_KEY` (or `secret_key` in `credential.toml`).
use anyhow::Context;
use credential_core::{AuthService, Claims, DefaultAuth, Settings};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEMO_PASSWORD: &str = "hello";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let auth = DefaultAuth::from_settings(&settings)?;
    info!(
        cost = settings.cost_factor,
        ttl_secs = settings.token_ttl_secs,
        "credential services ready"
    );

    // Registration: store a record, never the password.
    let record = auth.hash_password(DEMO_PASSWORD).await?;
    info!(algorithm = %record.version(), cost = record.cost(), "password hashed");

    // Login: check the supplied password against the stored record.
    let matched = auth.verify_password(DEMO_PASSWORD, &record.encode()).await?;
    let rejected = !auth.verify_password("not-the-password", &record.encode()).await?;
    info!(matched, rejected, "password verification checked");

    // Public claims only; the token is readable by whoever holds it.
    let mut claims = Claims::new();
    claims.insert("name".to_string(), json!("valerie"));
    claims.insert("id".to_string(), json!("1234"));
    claims.insert("email".to_string(), json!("v@a.com"));

    let token = auth.issue_token(&claims)?;
    info!(len = token.len(), "token issued");

    match auth.verify_token(&token) {
        Ok(verified) => info!(
            claims = verified.claims.len(),
            expires_at = %verified.expires_at,
            "token verified"
        ),
        Err(err) => {
            // The caller would log the user out here.
            warn!(code = err.error_code(), "token rejected");
            return Err(err.into());
        },
    }

    Ok(())
}
