//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use kernel::error::conversions::classify_sqlx_error;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::bearer::BearerError;
use platform::password::PasswordPolicyError;
use platform::rate_limit::RateLimitStoreError;
use platform::token::TokenError;
use thiserror::Error;

use crate::domain::value_object::ban_state::BanState;
use crate::domain::value_object::{email::EmailError, handle::HandleError};

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer credential on a protected route
    #[error("Not authorized, no token")]
    MissingCredential,

    /// Malformed header, bad signature or unparsable token
    #[error("Not authorized, token failed")]
    InvalidToken,

    #[error("Not authorized, token expired")]
    TokenExpired,

    /// Token is valid but the account no longer exists
    #[error("Not authorized, account not found")]
    AccountNotFound,

    /// Wrong identifier or password at sign-in
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{}", ban_message(.reason, .expires_at))]
    Banned {
        reason: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    },

    #[error("Username is already taken")]
    HandleTaken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("{0}")]
    Validation(String),

    #[error("Too many requests, please try again later")]
    RateLimited { retry_after_secs: u64 },

    #[error(transparent)]
    RateLimitStore(#[from] RateLimitStoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn ban_message(reason: &Option<String>, expires_at: &Option<DateTime<Utc>>) -> String {
    BanState::Banned {
        reason: reason.clone(),
        expires_at: *expires_at,
    }
    .to_string()
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingCredential
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::AccountNotFound
            | AuthError::InvalidCredentials => ErrorKind::Unauthenticated,
            AuthError::Banned { .. } => ErrorKind::Forbidden,
            AuthError::HandleTaken | AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::RateLimited { .. } => ErrorKind::TooManyRequests,
            AuthError::RateLimitStore(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(e) => classify_sqlx_error(e).0,
            AuthError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Database(e) => {
                let (kind, message) = classify_sqlx_error(&e);
                AppError::new(kind, message).with_source(e)
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::RateLimitStore(e) => {
                tracing::error!(error = %e, "Rate limit store error");
            }
            AuthError::RateLimited { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Rate limit exceeded");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Banned { reason, .. } => {
                tracing::info!(reason = ?reason, "Request from banned account rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let retry_after = match &self {
            AuthError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let mut response = self.into_app_error().into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// Unreadable or mistyped request bodies
impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::Validation(rejection.body_text())
    }
}

impl From<BanState> for AuthError {
    fn from(ban: BanState) -> Self {
        AuthError::Banned {
            reason: ban.reason().map(str::to_owned),
            expires_at: ban.expires_at(),
        }
    }
}

impl From<BearerError> for AuthError {
    fn from(err: BearerError) -> Self {
        match err {
            BearerError::Missing => AuthError::MissingCredential,
            BearerError::Malformed => AuthError::InvalidToken,
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::InvalidSignature | TokenError::Malformed => AuthError::InvalidToken,
            TokenError::Signing(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<HandleError> for AuthError {
    fn from(err: HandleError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<EmailError> for AuthError {
    fn from(err: EmailError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}
