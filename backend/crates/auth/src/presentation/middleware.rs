//! Auth Middleware
//!
//! Identity & session guard for protected routes. On success the resolved
//! [`Principal`] is inserted into the request extensions; handlers take it
//! with `Extension<Principal>`.
//!
//! [`rate_limit`] caps requests per caller. Behind the guard the caller is
//! the account, otherwise the client IP.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use platform::bearer::extract_bearer_token;
use platform::rate_limit::{MemoryRateLimitStore, RateLimitConfig, RateLimitStore};

use crate::application::AuthenticateUseCase;
use crate::domain::entity::account::Principal;
use crate::domain::repository::AccountRepository;
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Middleware that requires a valid bearer token from a non-banned account
pub async fn require_principal<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let token = extract_bearer_token(req.headers())?.to_owned();

    let principal: Principal = AuthenticateUseCase::new(state.repo.clone(), state.config.clone())
        .execute(&token)
        .await?;

    tracing::debug!(account_id = %principal.account_id, "Request authenticated");

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Request budget for one group of routes
pub struct RateLimiter<S> {
    store: Arc<S>,
    config: RateLimitConfig,
    scope: &'static str,
}

impl<S> Clone for RateLimiter<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            scope: self.scope,
        }
    }
}

impl<S> RateLimiter<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    /// `scope` keeps counters of different route groups apart in a shared store
    pub fn new(scope: &'static str, store: Arc<S>, config: RateLimitConfig) -> Self {
        Self {
            store,
            config,
            scope,
        }
    }
}

impl RateLimiter<MemoryRateLimitStore> {
    pub fn memory(scope: &'static str, config: RateLimitConfig) -> Self {
        Self::new(scope, Arc::new(MemoryRateLimitStore::new()), config)
    }
}

fn caller_key(req: &Request) -> String {
    if let Some(principal) = req.extensions().get::<Principal>() {
        return format!("account:{}", principal.account_id);
    }
    match req.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => format!("ip:{}", addr.ip()),
        None => "ip:unknown".to_string(),
    }
}

/// Middleware that rejects callers over budget with 429 and `Retry-After`
pub async fn rate_limit<S>(
    State(limiter): State<RateLimiter<S>>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    let key = format!("{}:{}", limiter.scope, caller_key(&req));
    let result = limiter
        .store
        .check_and_increment(&key, &limiter.config)
        .await?;

    if !result.allowed {
        tracing::debug!(key = %key, reset_at_ms = result.reset_at_ms, "Rate limited");
        return Err(AuthError::RateLimited {
            retry_after_secs: result.retry_after_secs(Utc::now().timestamp_millis()),
        });
    }

    Ok(next.run(req).await)
}
