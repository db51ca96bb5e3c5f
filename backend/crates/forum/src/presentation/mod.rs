//! Presentation Layer
//!
//! HTTP handlers, DTOs, and router. The guard comes from the auth crate.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod router;

pub use handlers::ForumAppState;
pub use router::{forum_router, forum_router_generic};
