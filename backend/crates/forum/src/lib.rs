//! Forum Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Posts, comments, Relationship / Engagement ledgers, repository traits
//! - `application/` - Use cases (follow, vote, like, comments, moderation)
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Consistency
//! - Follow edges are written in pairs or not at all
//! - A voter is in at most one of `upvotes` / `downvotes`; a repeated vote
//!   removes it. Likes are independent of votes.
//! - Every successful mutation publishes an advisory event to the
//!   [`relay::NotificationRelay`]; the store stays the source of truth.
//!
//! Every mutating route sits behind `auth::require_principal`, so banned
//! accounts are rejected before any forum logic runs. All routes share a
//! per-IP rate limit; post creation also has a per-account one.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ForumConfig;
pub use domain::repository::{PostRepository, RelationshipRepository};
pub use error::{ForumError, ForumResult};
pub use infra::{memory::MemoryForumRepository, postgres::PgForumRepository};
pub use presentation::handlers::ForumAppState;
pub use presentation::router::{forum_router, forum_router_generic};

pub mod models {
    pub use crate::domain::engagement::*;
    pub use crate::domain::post::*;
    pub use crate::domain::relationship::*;
    pub use crate::presentation::dto::*;
}

#[cfg(test)]
mod tests;
