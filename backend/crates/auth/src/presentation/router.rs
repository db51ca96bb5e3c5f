//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use platform::rate_limit::MemoryRateLimitStore;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::AccountRepository;
use crate::infra::postgres::PgAccountRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{RateLimiter, rate_limit, require_principal};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAccountRepository, config: AuthConfig) -> Router {
    auth_router_generic(AuthAppState::new(Arc::new(repo), Arc::new(config)))
}

/// Create a generic Auth router for any repository implementation
///
/// Share `state` with other routers that need the guard so that both see
/// the same account store. Every route counts against
/// `AuthConfig::rate_limit` per client IP.
pub fn auth_router_generic<R>(state: AuthAppState<R>) -> Router
where
    R: AccountRepository + Send + Sync + 'static,
{
    let limiter = RateLimiter::memory("auth", state.config.rate_limit.clone());

    let protected = Router::new()
        .route("/me", get(handlers::me::<R>))
        .route("/updatedetails", put(handlers::update_details::<R>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_principal::<R>,
        ));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::<MemoryRateLimitStore>,
        ))
        .with_state(state)
}
