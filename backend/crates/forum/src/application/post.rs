//! Post Use Cases

use std::sync::Arc;

use auth::Principal;
use kernel::id::{AccountId, CategoryId, PostId};
use kernel::pagination::{PageRequest, Paginated};
use relay::{NotificationRelay, RelayEvent};

use crate::domain::post::{Post, PostFilter};
use crate::domain::repository::PostRepository;
use crate::error::{ForumError, ForumResult};

pub struct CreatePostInput {
    pub category_id: CategoryId,
    pub title: String,
    pub content: String,
}

/// Replacement title and content; the category stays unless given
pub struct UpdatePostInput {
    pub title: String,
    pub content: String,
    pub category_id: Option<CategoryId>,
}

pub struct PostUseCase<R>
where
    R: PostRepository,
{
    repo: Arc<R>,
    relay: Arc<NotificationRelay>,
}

impl<R> PostUseCase<R>
where
    R: PostRepository,
{
    pub fn new(repo: Arc<R>, relay: Arc<NotificationRelay>) -> Self {
        Self { repo, relay }
    }

    pub async fn create(&self, author: &Principal, input: CreatePostInput) -> ForumResult<Post> {
        let post = Post::new(
            author.account_id,
            input.category_id,
            &input.title,
            &input.content,
        )?;
        self.repo.create(&post).await?;

        tracing::info!(post_id = %post.post_id, author = %author.account_id, "Post created");
        Ok(post)
    }

    pub async fn get(&self, post_id: &PostId) -> ForumResult<Post> {
        self.repo
            .find_by_id(post_id)
            .await?
            .ok_or(ForumError::PostNotFound)
    }

    pub async fn list(&self, filter: &PostFilter, page: PageRequest) -> ForumResult<Paginated<Post>> {
        self.repo.list(filter, page).await
    }

    pub async fn list_by_author(
        &self,
        author: &AccountId,
        page: PageRequest,
    ) -> ForumResult<Paginated<Post>> {
        let filter = PostFilter {
            author: Some(*author),
            ..Default::default()
        };
        self.repo.list(&filter, page).await
    }

    /// Posts `account` has liked, newest first
    pub async fn list_liked(
        &self,
        account: &AccountId,
        page: PageRequest,
    ) -> ForumResult<Paginated<Post>> {
        let filter = PostFilter {
            liked_by: Some(*account),
            ..Default::default()
        };
        self.repo.list(&filter, page).await
    }

    /// Edit as the post's author. Administrators may delete but not edit.
    pub async fn update(
        &self,
        principal: &Principal,
        post_id: &PostId,
        input: UpdatePostInput,
    ) -> ForumResult<Post> {
        let mut post = self.get(post_id).await?;
        if post.author_id != principal.account_id {
            return Err(ForumError::NotOwner {
                action: "update",
                target: "post",
            });
        }

        post.revise(&input.title, &input.content, input.category_id)?;
        if !self.repo.update(&post).await? {
            return Err(ForumError::PostNotFound);
        }

        tracing::info!(post_id = %post.post_id, author = %principal.account_id, "Post updated");
        Ok(post)
    }

    /// Delete as the post's author or an administrator
    pub async fn delete(&self, principal: &Principal, post_id: &PostId) -> ForumResult<()> {
        let post = self.get(post_id).await?;
        if post.author_id != principal.account_id && !principal.is_admin() {
            return Err(ForumError::NotOwner {
                action: "delete",
                target: "post",
            });
        }
        self.remove(post_id).await
    }

    /// Delete without an ownership check; callers authorize first
    pub(crate) async fn remove(&self, post_id: &PostId) -> ForumResult<()> {
        if !self.repo.delete(post_id).await? {
            return Err(ForumError::PostNotFound);
        }

        tracing::info!(post_id = %post_id, "Post deleted");
        self.relay.publish(RelayEvent::PostRemoved { post: *post_id });
        Ok(())
    }
}
