//! Domain Layer
//!
//! Contains entities, the two ledgers, and repository traits.

pub mod engagement;
pub mod post;
pub mod relationship;
pub mod repository;

// Re-exports
pub use engagement::{Engagement, VoteDirection};
pub use post::{Comment, Post, PostFilter};
pub use relationship::{FollowPair, FollowSets, RelationshipLedger};
pub use repository::{PostRepository, RelationshipRepository};
