//! Forum Router

use std::sync::Arc;

use auth::{
    AccountRepository, AuthAppState, PgAccountRepository, RateLimiter, rate_limit,
    require_principal,
};
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use platform::rate_limit::MemoryRateLimitStore;
use relay::NotificationRelay;

use crate::application::config::ForumConfig;
use crate::domain::repository::{PostRepository, RelationshipRepository};
use crate::infra::postgres::PgForumRepository;
use crate::presentation::handlers::{self, ForumAppState};

/// Create the Forum router with PostgreSQL repositories
pub fn forum_router(
    auth_state: AuthAppState<PgAccountRepository>,
    repo: PgForumRepository,
    relay: Arc<NotificationRelay>,
    config: ForumConfig,
) -> Router {
    let state = ForumAppState::new(
        auth_state.repo.clone(),
        Arc::new(repo),
        relay,
        Arc::new(config),
    );
    forum_router_generic(state, auth_state)
}

/// Create a generic Forum router for any repository implementation
///
/// `auth_state` drives the guard; its account store should be the same one
/// held by `state`.
///
/// Every route shares a per-IP budget. `POST /posts` additionally counts
/// against a per-account budget, checked after the guard has run.
pub fn forum_router_generic<A, R>(state: ForumAppState<A, R>, auth_state: AuthAppState<A>) -> Router
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let limiter = RateLimiter::memory("forum", state.config.rate_limit.clone());
    let create_post_limiter =
        RateLimiter::memory("create-post", state.config.create_post_limit.clone());

    let public = Router::new()
        .route("/users/{id}", get(handlers::get_profile::<A, R>))
        .route("/users/{id}/followers", get(handlers::followers::<A, R>))
        .route("/users/{id}/following", get(handlers::following::<A, R>))
        .route("/posts", get(handlers::list_posts::<A, R>))
        .route("/posts/user/{user_id}", get(handlers::user_posts::<A, R>))
        .route("/posts/liked/{user_id}", get(handlers::liked_posts::<A, R>))
        .route("/posts/{id}", get(handlers::get_post::<A, R>));

    let protected = Router::new()
        // profile & relationships
        .route("/users/{id}", put(handlers::update_profile::<A, R>))
        .route("/users/{id}/follow", post(handlers::follow::<A, R>))
        .route("/users/{id}/unfollow", post(handlers::unfollow::<A, R>))
        // posts
        .route(
            "/posts",
            post(handlers::create_post::<A, R>).layer(middleware::from_fn_with_state(
                create_post_limiter,
                rate_limit::<MemoryRateLimitStore>,
            )),
        )
        .route(
            "/posts/{id}",
            put(handlers::update_post::<A, R>).delete(handlers::delete_post::<A, R>),
        )
        .route("/posts/{id}/vote", put(handlers::vote::<A, R>))
        .route("/posts/{id}/like", put(handlers::like::<A, R>))
        .route("/posts/{id}/comments", post(handlers::add_comment::<A, R>))
        .route(
            "/posts/{id}/comments/{comment_id}",
            delete(handlers::delete_comment::<A, R>),
        )
        // admin (role is checked in the use cases)
        .route("/admin/users", get(handlers::admin_list_accounts::<A, R>))
        .route("/admin/users/{id}/ban", put(handlers::admin_set_ban::<A, R>))
        .route("/admin/posts", get(handlers::admin_list_posts::<A, R>))
        .route("/admin/posts/{id}", delete(handlers::admin_delete_post::<A, R>))
        .route(
            "/admin/posts/{id}/comments/{comment_id}",
            delete(handlers::admin_delete_comment::<A, R>),
        )
        .route_layer(middleware::from_fn_with_state(
            auth_state,
            require_principal::<A>,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::<MemoryRateLimitStore>,
        ))
        .with_state(state)
}
