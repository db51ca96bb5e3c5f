//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Every mutating method is all-or-nothing.

use kernel::id::{AccountId, CommentId, PostId};
use kernel::pagination::{PageRequest, Paginated};

use crate::domain::engagement::{Engagement, VoteDirection};
use crate::domain::post::{Comment, Post, PostFilter};
use crate::domain::relationship::{FollowPair, FollowSets};
use crate::error::ForumResult;

/// Relationship Ledger storage
#[trait_variant::make(RelationshipRepository: Send)]
pub trait LocalRelationshipRepository {
    /// Add `target` to `actor.following` and `actor` to `target.followers`
    ///
    /// Fails with `SelfFollow` or `AlreadyFollowing`; nothing is written then.
    async fn follow(&self, actor: &AccountId, target: &AccountId) -> ForumResult<FollowPair>;

    /// Remove both edges; fails with `NotFollowing` when absent
    async fn unfollow(&self, actor: &AccountId, target: &AccountId) -> ForumResult<FollowPair>;

    async fn follow_sets(&self, account: &AccountId) -> ForumResult<FollowSets>;
}

/// Posts, their engagement and comments
#[trait_variant::make(PostRepository: Send)]
pub trait LocalPostRepository {
    async fn create(&self, post: &Post) -> ForumResult<()>;

    async fn find_by_id(&self, post_id: &PostId) -> ForumResult<Option<Post>>;

    /// Newest first
    async fn list(&self, filter: &PostFilter, page: PageRequest) -> ForumResult<Paginated<Post>>;

    /// Overwrite title, content, category and `updated_at`. `false` when absent.
    async fn update(&self, post: &Post) -> ForumResult<bool>;

    /// Delete a post with its engagement and comments. `false` when absent.
    async fn delete(&self, post_id: &PostId) -> ForumResult<bool>;

    /// Resolve and apply a vote request; fails with `PostNotFound`
    async fn vote(
        &self,
        post_id: &PostId,
        actor: &AccountId,
        direction: VoteDirection,
    ) -> ForumResult<Engagement>;

    /// Toggle the actor's like; fails with `PostNotFound`
    async fn toggle_like(&self, post_id: &PostId, actor: &AccountId) -> ForumResult<Engagement>;

    /// Append a comment; fails with `PostNotFound`
    async fn add_comment(&self, post_id: &PostId, comment: &Comment) -> ForumResult<()>;

    /// Remove a comment from its post. `false` when absent.
    async fn delete_comment(&self, post_id: &PostId, comment_id: &CommentId) -> ForumResult<bool>;
}
