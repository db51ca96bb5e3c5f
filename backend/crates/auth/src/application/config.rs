//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::rate_limit::RateLimitConfig;
use platform::token::TokenSigner;

/// Default token lifetime (30 days)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 3600);

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens
    pub token_secret: Vec<u8>,
    /// Bearer token lifetime
    pub token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Per-client budget for every `/auth` route
    pub rate_limit: RateLimitConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: Vec::new(),
            token_ttl: DEFAULT_TOKEN_TTL,
            password_pepper: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AuthConfig {
    pub fn new(token_secret: impl Into<Vec<u8>>, token_ttl: Duration) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_ttl,
            ..Default::default()
        }
    }

    /// Create config with a random token secret (for development)
    ///
    /// Tokens do not survive a restart.
    pub fn development() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    pub fn token_signer(&self) -> TokenSigner {
        TokenSigner::new(&self.token_secret, self.token_ttl)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}
