//! Application Layer
//!
//! Use cases and application services.

pub mod comment;
pub mod config;
pub mod engagement;
pub mod moderation;
pub mod post;
pub mod profile;
pub mod relationship;

// Re-exports
pub use comment::CommentUseCase;
pub use config::ForumConfig;
pub use engagement::EngagementUseCase;
pub use moderation::{BanInput, ModerationUseCase, require_admin};
pub use post::{CreatePostInput, PostUseCase, UpdatePostInput};
pub use profile::{Profile, ProfileUseCase};
pub use relationship::{FollowDirection, FollowListUseCase, FollowUseCase};
