//! Environment-driven server configuration.
//!
//! Every knob has a default suitable for local development; production
//! deployments set the `TAVOLA_*` variables. The JWT secret and the seed
//! admin credentials are the only values the server refuses to invent on
//! its own when binding beyond loopback.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_host: String,
    pub port: u16,
    pub database_url: String,
    pub cors_allowed_origins: Vec<String>,

    pub jwt_secret: String,
    /// Session token lifetime in seconds.
    pub token_ttl_secs: i64,

    /// Pending login approvals older than this are swept (seconds).
    pub approval_ttl_secs: u64,
    /// Verification codes older than this no longer verify (seconds).
    pub code_ttl_secs: u64,

    /// Admin account provisioned at startup if no admin exists yet.
    pub seed_admin_email: Option<String>,
    pub seed_admin_password: Option<String>,

    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_host: read_env("TAVOLA_BIND_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: read_parsed_env("TAVOLA_PORT").unwrap_or(8080),
            database_url: read_env("TAVOLA_DATABASE_URL")
                .unwrap_or_else(|| "sqlite://tavola.db?mode=rwc".into()),
            cors_allowed_origins: read_env("TAVOLA_CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            jwt_secret: read_env("TAVOLA_JWT_SECRET").unwrap_or_else(|| {
                tracing::warn!("TAVOLA_JWT_SECRET not set, using an insecure development secret");
                "tavola-dev-secret".into()
            }),
            token_ttl_secs: read_parsed_env("TAVOLA_TOKEN_TTL_SECS").unwrap_or(24 * 60 * 60),
            approval_ttl_secs: read_parsed_env("TAVOLA_APPROVAL_TTL_SECS").unwrap_or(300),
            code_ttl_secs: read_parsed_env("TAVOLA_CODE_TTL_SECS").unwrap_or(600),
            seed_admin_email: read_env("TAVOLA_SEED_ADMIN_EMAIL"),
            seed_admin_password: read_env("TAVOLA_SEED_ADMIN_PASSWORD"),
            smtp: SmtpConfig {
                host: read_env("TAVOLA_SMTP_HOST"),
                port: read_parsed_env("TAVOLA_SMTP_PORT").unwrap_or(587),
                username: read_env("TAVOLA_SMTP_USERNAME"),
                password: read_env("TAVOLA_SMTP_PASSWORD"),
                from: read_env("TAVOLA_SMTP_FROM")
                    .unwrap_or_else(|| "Tavola <no-reply@tavola.example>".into()),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".into(),
            port: 8080,
            database_url: "sqlite::memory:".into(),
            cors_allowed_origins: Vec::new(),
            jwt_secret: "tavola-dev-secret".into(),
            token_ttl_secs: 24 * 60 * 60,
            approval_ttl_secs: 300,
            code_ttl_secs: 600,
            seed_admin_email: None,
            seed_admin_password: None,
            smtp: SmtpConfig {
                host: None,
                port: 587,
                username: None,
                password: None,
                from: "Tavola <no-reply@tavola.example>".into(),
            },
        }
    }
}

fn read_env(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_parsed_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    read_env(key).and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_local_only() {
        let config = Config::default();
        assert_eq!(config.bind_host, "127.0.0.1");
        assert!(config.seed_admin_email.is_none());
        assert_eq!(config.approval_ttl_secs, 300);
    }
}
