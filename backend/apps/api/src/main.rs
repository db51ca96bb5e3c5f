//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::{
    AccountRepository, AuthAppState, MemoryAccountRepository, PgAccountRepository,
    auth_router_generic,
};
use axum::{
    Router, http,
    http::{Method, header},
    routing::get,
};
use forum::{
    ForumAppState, MemoryForumRepository, PgForumRepository, PostRepository,
    RelationshipRepository, forum_router_generic,
};
use kernel::response::ApiResponse;
use relay::{NotificationRelay, relay_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

/// GET /health
async fn health() -> ApiResponse<()> {
    ApiResponse::message("Server is running")
}

/// Assemble every router over one account store and one forum store
fn build_app<A, R>(
    accounts: Arc<A>,
    repo: Arc<R>,
    relay: Arc<NotificationRelay>,
    config: &ServerConfig,
) -> Router
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let auth_state = AuthAppState::new(accounts.clone(), Arc::new(config.auth.clone()));
    let forum_state = ForumAppState::new(
        accounts,
        repo,
        relay.clone(),
        Arc::new(config.forum.clone()),
    );

    Router::new()
        .nest("/api/auth", auth_router_generic(auth_state.clone()))
        .nest("/api", forum_router_generic(forum_state, auth_state))
        .merge(relay_router(relay))
        .route("/health", get(health))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,forum=info,relay=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Process-scoped relay; dropped with the server
    let relay = NotificationRelay::new(config.relay_queue_capacity);

    let app = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            build_app(
                Arc::new(PgAccountRepository::new(pool.clone())),
                Arc::new(PgForumRepository::new(pool)),
                relay,
                &config,
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store (data is lost on exit)");
            build_app(
                Arc::new(MemoryAccountRepository::new()),
                Arc::new(MemoryForumRepository::new()),
                relay,
                &config,
            )
        }
    };

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.frontend_origins));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
