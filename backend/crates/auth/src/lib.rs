//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router, guard middleware
//!
//! ## Features
//! - Account registration with handle + email + password
//! - Sign-in by handle or email, returning a signed bearer token
//! - Identity & session guard: bearer token → [`Principal`], ban enforcement
//! - Role-based access (User, Admin)
//! - Profile updates (handle, email, bio, avatar)
//! - Per-client rate limiting on every `/auth` route
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Stateless HS256 tokens; the account is reloaded on every request so
//!   bans and role changes apply immediately
//! - Timed bans are lifted lazily when the guard sees them expired

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::entity::account::{Account, Principal};
pub use domain::repository::AccountRepository;
pub use error::{AuthError, AuthResult};
pub use infra::{memory::MemoryAccountRepository, postgres::PgAccountRepository};
pub use presentation::handlers::AuthAppState;
pub use presentation::middleware::{RateLimiter, rate_limit, require_principal};
pub use presentation::router::{auth_router, auth_router_generic};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::account::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
