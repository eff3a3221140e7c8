//! Process configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - PostgreSQL connection string
//! - `TOKEN_SECRET` - bearer token signing secret (at least 32 bytes)
//!
//! ## Optional
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default: 5)
//! - `BIND_ADDR` - listen address (default: 0.0.0.0:8000)
//! - `TOKEN_TTL_MINUTES` - access token lifetime (default: 60, at most 43200)
//! - `STRIPE_SECRET_KEY` - enables the payment bridge when set
//! - `STRIPE_API_BASE` - Stripe API root (default: https://api.stripe.com)
//! - `PAYMENT_TIMEOUT_SECS` - processor request timeout (default: 10)
//! - `CORS_ALLOWED_ORIGINS` - comma separated origins; unset allows any origin without credentials

use secrecy::{ExposeSecret, SecretString};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
/// 30 days.
const MAX_TOKEN_TTL_MINUTES: i64 = 30 * 24 * 60;
const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: SecretString,
    pub api_base: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Contains the database password.
    pub database_url: SecretString,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub token_secret: SecretString,
    pub token_ttl: chrono::Duration,
    /// `None` disables the payment endpoint.
    pub stripe: Option<StripeConfig>,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::MissingEnvVar("DATABASE_URL"))?;
        let token_secret = get("TOKEN_SECRET").ok_or(ConfigError::MissingEnvVar("TOKEN_SECRET"))?;
        if token_secret.len() < MIN_TOKEN_SECRET_LENGTH {
            return Err(ConfigError::InvalidEnvVar(
                "TOKEN_SECRET",
                format!("must be at least {} bytes", MIN_TOKEN_SECRET_LENGTH),
            ));
        }

        let database_max_connections =
            parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), 5u32)?;
        let bind_addr = parse_or(
            "BIND_ADDR",
            get("BIND_ADDR"),
            SocketAddr::from(([0, 0, 0, 0], 8000)),
        )?;
        let ttl_minutes = parse_or("TOKEN_TTL_MINUTES", get("TOKEN_TTL_MINUTES"), 60i64)?;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(ConfigError::InvalidEnvVar(
                "TOKEN_TTL_MINUTES",
                format!("must be between 1 and {}", MAX_TOKEN_TTL_MINUTES),
            ));
        }
        let token_ttl = chrono::Duration::try_minutes(ttl_minutes).ok_or(ConfigError::InvalidEnvVar(
            "TOKEN_TTL_MINUTES",
            "out of range".into(),
        ))?;

        let stripe = match get("STRIPE_SECRET_KEY") {
            Some(key) => {
                let timeout_secs = parse_or("PAYMENT_TIMEOUT_SECS", get("PAYMENT_TIMEOUT_SECS"), 10u64)?;
                Some(StripeConfig {
                    secret_key: SecretString::from(key),
                    api_base: get("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.into()),
                    timeout: Duration::from_secs(timeout_secs),
                })
            }
            None => None,
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url: SecretString::from(database_url),
            database_max_connections,
            bind_addr,
            token_secret: SecretString::from(token_secret),
            token_ttl,
            stripe,
            cors_allowed_origins,
        })
    }

    pub fn database_url(&self) -> &str {
        self.database_url.expose_secret()
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key, e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn database_url_is_required() {
        let err = load(&[("TOKEN_SECRET", SECRET)]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("DATABASE_URL")));
    }

    #[test]
    fn short_token_secret_is_rejected() {
        let err = load(&[("DATABASE_URL", "postgres://localhost/food"), ("TOKEN_SECRET", "short")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar("TOKEN_SECRET", _)));
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/food"), ("TOKEN_SECRET", SECRET)])
            .unwrap();
        assert_eq!(config.database_url(), "postgres://localhost/food");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8000");
        assert_eq!(config.token_ttl, chrono::Duration::minutes(60));
        assert!(config.stripe.is_none());
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn stripe_and_cors_are_parsed() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/food"),
            ("TOKEN_SECRET", SECRET),
            ("STRIPE_SECRET_KEY", "sk_test_abc"),
            ("PAYMENT_TIMEOUT_SECS", "3"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, https://shop.example.com,"),
        ])
        .unwrap();
        let stripe = config.stripe.unwrap();
        assert_eq!(stripe.secret_key.expose_secret(), "sk_test_abc");
        assert_eq!(stripe.api_base, "https://api.stripe.com");
        assert_eq!(stripe.timeout, Duration::from_secs(3));
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "https://shop.example.com"]
        );
    }

    #[test]
    fn token_ttl_is_bounded() {
        for ttl in ["0", "-5", "43201", "9223372036854775807"] {
            let err = load(&[
                ("DATABASE_URL", "postgres://localhost/food"),
                ("TOKEN_SECRET", SECRET),
                ("TOKEN_TTL_MINUTES", ttl),
            ])
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar("TOKEN_TTL_MINUTES", _)), "accepted {}", ttl);
        }
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/food"),
            ("TOKEN_SECRET", SECRET),
            ("TOKEN_TTL_MINUTES", "43200"),
        ])
        .unwrap();
        assert_eq!(config.token_ttl, chrono::Duration::days(30));
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/food"),
            ("TOKEN_SECRET", SECRET),
            ("TOKEN_TTL_MINUTES", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar("TOKEN_TTL_MINUTES", _)));
    }
}
