//! Comment Use Cases

use std::sync::Arc;

use auth::Principal;
use kernel::id::{CommentId, PostId};
use relay::{NotificationRelay, RelayEvent};

use crate::domain::post::Comment;
use crate::domain::repository::PostRepository;
use crate::error::{ForumError, ForumResult};

pub struct CommentUseCase<R>
where
    R: PostRepository,
{
    repo: Arc<R>,
    relay: Arc<NotificationRelay>,
}

impl<R> CommentUseCase<R>
where
    R: PostRepository,
{
    pub fn new(repo: Arc<R>, relay: Arc<NotificationRelay>) -> Self {
        Self { repo, relay }
    }

    /// Append a comment to an existing post
    pub async fn add(&self, author: &Principal, post_id: &PostId, text: &str) -> ForumResult<Comment> {
        let comment = Comment::new(author.account_id, text)?;
        self.repo.add_comment(post_id, &comment).await?;

        tracing::debug!(post_id = %post_id, comment_id = %comment.comment_id, "Comment added");

        self.relay.publish(RelayEvent::CommentAdded {
            post: *post_id,
            comment: comment.comment_id,
            author: author.account_id,
        });

        Ok(comment)
    }

    /// Delete as the comment's author or an administrator
    pub async fn delete(
        &self,
        principal: &Principal,
        post_id: &PostId,
        comment_id: &CommentId,
    ) -> ForumResult<()> {
        let post = self
            .repo
            .find_by_id(post_id)
            .await?
            .ok_or(ForumError::PostNotFound)?;
        let comment = post
            .comment(comment_id)
            .ok_or(ForumError::CommentNotFound)?;

        if comment.author_id != principal.account_id && !principal.is_admin() {
            return Err(ForumError::NotOwner {
                action: "delete",
                target: "comment",
            });
        }

        self.remove(post_id, comment_id).await
    }

    /// Delete without an ownership check; callers authorize first
    pub(crate) async fn remove(&self, post_id: &PostId, comment_id: &CommentId) -> ForumResult<()> {
        if !self.repo.delete_comment(post_id, comment_id).await? {
            return Err(ForumError::CommentNotFound);
        }

        tracing::debug!(post_id = %post_id, comment_id = %comment_id, "Comment deleted");

        self.relay.publish(RelayEvent::CommentRemoved {
            post: *post_id,
            comment: *comment_id,
        });
        Ok(())
    }
}
