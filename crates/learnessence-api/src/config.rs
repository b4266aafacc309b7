//! Server configuration from environment variables.

use std::collections::HashMap;

use learnessence_core::defaults::{self, *};
use learnessence_core::{Error, GuardrailStrategy, Result};

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: Option<u32>,
    /// Comma-separated origin whitelist.
    pub allowed_origins: String,
    pub session_cookie_name: String,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u64,
    pub rate_limit_period_secs: u64,
    pub max_upload_bytes: usize,
    pub guardrail_strategy: GuardrailStrategy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            database_url: defaults::DATABASE_URL.to_string(),
            database_max_connections: None,
            allowed_origins: defaults::ALLOWED_ORIGINS.to_string(),
            session_cookie_name: defaults::SESSION_COOKIE_NAME.to_string(),
            rate_limit_enabled: false,
            rate_limit_requests: defaults::RATE_LIMIT_REQUESTS,
            rate_limit_period_secs: defaults::RATE_LIMIT_PERIOD_SECS,
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            guardrail_strategy: GuardrailStrategy::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let base = Self::default();

        let rate_limit_enabled = get(ENV_RATE_LIMIT_ENABLED)
            .map(|v| matches!(v.trim(), "true" | "1"))
            .unwrap_or(base.rate_limit_enabled);

        let guardrail_strategy = match get(ENV_GUARDRAIL_STRATEGY) {
            Some(v) => v.parse()?,
            None => base.guardrail_strategy,
        };

        let config = Self {
            host: get(ENV_HOST).unwrap_or(base.host),
            port: parse_or(get(ENV_PORT), ENV_PORT, base.port)?,
            database_url: get(ENV_DATABASE_URL).unwrap_or(base.database_url),
            database_max_connections: get(ENV_DATABASE_MAX_CONNECTIONS)
                .map(|v| parse_value(&v, ENV_DATABASE_MAX_CONNECTIONS))
                .transpose()?,
            allowed_origins: get(ENV_ALLOWED_ORIGINS).unwrap_or(base.allowed_origins),
            session_cookie_name: get(ENV_SESSION_COOKIE_NAME).unwrap_or(base.session_cookie_name),
            rate_limit_enabled,
            rate_limit_requests: parse_or(
                get(ENV_RATE_LIMIT_REQUESTS),
                ENV_RATE_LIMIT_REQUESTS,
                base.rate_limit_requests,
            )?,
            rate_limit_period_secs: parse_or(
                get(ENV_RATE_LIMIT_PERIOD_SECS),
                ENV_RATE_LIMIT_PERIOD_SECS,
                base.rate_limit_period_secs,
            )?,
            max_upload_bytes: parse_or(
                get(ENV_MAX_UPLOAD_BYTES),
                ENV_MAX_UPLOAD_BYTES,
                base.max_upload_bytes,
            )?,
            guardrail_strategy,
        };

        if config.rate_limit_enabled
            && (config.rate_limit_requests == 0 || config.rate_limit_period_secs == 0)
        {
            return Err(Error::Config(
                "rate limit requests and period must be non-zero".to_string(),
            ));
        }

        Ok(config)
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw)))
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T> {
    match raw {
        Some(v) => parse_value(&v, key),
        None => Ok(default),
    }
}
