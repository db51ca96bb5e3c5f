//! Process configuration read from the environment (`.env` is loaded first)

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use auth::config::DEFAULT_TOKEN_TTL;
use forum::ForumConfig;
use platform::rate_limit::RateLimitConfig;

pub const DEFAULT_PORT: u16 = 5000;
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug)]
pub struct ServerConfig {
    pub port: u16,
    /// `None` runs on the in-memory store
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub frontend_origins: Vec<String>,
    pub relay_queue_capacity: usize,
    pub auth: AuthConfig,
    pub forum: ForumConfig,
}

/// Parse an optional variable, falling back to `default` when unset or blank
fn var_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} is not valid: {raw:?}")),
        _ => Ok(default),
    }
}

/// `<PREFIX>_MAX_REQUESTS` per `<PREFIX>_WINDOW_SECS`
fn rate_limit_config(prefix: &str, default: RateLimitConfig) -> anyhow::Result<RateLimitConfig> {
    let max_requests = var_or(&format!("{prefix}_MAX_REQUESTS"), default.max_requests)?;
    let window_secs = var_or(&format!("{prefix}_WINDOW_SECS"), default.window.as_secs())?;
    if max_requests == 0 || window_secs == 0 {
        bail!("{prefix}_MAX_REQUESTS and {prefix}_WINDOW_SECS must be positive");
    }
    Ok(RateLimitConfig::new(max_requests, window_secs))
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    let ttl = Duration::from_secs(var_or("JWT_EXPIRE_SECS", DEFAULT_TOKEN_TTL.as_secs())?);

    let secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
    let mut config = match secret {
        Some(secret) => {
            if secret.len() < MIN_SECRET_LEN {
                bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes");
            }
            AuthConfig::new(secret.into_bytes(), ttl)
        }
        None if cfg!(debug_assertions) => {
            tracing::warn!("JWT_SECRET not set, using a random secret (tokens will not survive a restart)");
            AuthConfig {
                token_ttl: ttl,
                ..AuthConfig::development()
            }
        }
        None => bail!("JWT_SECRET must be set in production"),
    };

    config.password_pepper = env::var("PASSWORD_PEPPER")
        .ok()
        .filter(|s| !s.is_empty())
        .map(String::into_bytes);
    config.rate_limit = rate_limit_config("RATE_LIMIT", RateLimitConfig::default())?;

    Ok(config)
}

fn forum_config() -> anyhow::Result<ForumConfig> {
    let defaults = ForumConfig::default();
    Ok(ForumConfig::new(
        var_or("PAGE_SIZE_DEFAULT", defaults.page_size_default)?,
        var_or("PAGE_SIZE_MAX", defaults.page_size_max)?,
    )
    .with_rate_limits(
        rate_limit_config("RATE_LIMIT", defaults.rate_limit)?,
        rate_limit_config("POST_RATE_LIMIT", defaults.create_post_limit)?,
    ))
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            port: var_or("PORT", DEFAULT_PORT)?,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            database_max_connections: var_or("DATABASE_MAX_CONNECTIONS", 5)?,
            frontend_origins,
            relay_queue_capacity: var_or("RELAY_QUEUE_CAPACITY", relay::DEFAULT_QUEUE_CAPACITY)?,
            auth: auth_config()?,
            forum: forum_config()?,
        })
    }
}
