//! In-Memory Repository Implementation
//!
//! Ledger and posts share one write lock, so every check-then-write below
//! is atomic with respect to other requests.

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::{AccountId, CommentId, PostId};
use kernel::pagination::{PageRequest, Paginated};
use tokio::sync::RwLock;

use crate::domain::engagement::{Engagement, VoteDirection};
use crate::domain::post::{Comment, Post, PostFilter};
use crate::domain::relationship::{FollowPair, FollowSets, RelationshipLedger};
use crate::domain::repository::{PostRepository, RelationshipRepository};
use crate::error::{ForumError, ForumResult};

#[derive(Default)]
struct ForumState {
    ledger: RelationshipLedger,
    posts: HashMap<PostId, Post>,
}

#[derive(Clone, Default)]
pub struct MemoryForumRepository {
    state: Arc<RwLock<ForumState>>,
}

impl MemoryForumRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RelationshipRepository for MemoryForumRepository {
    async fn follow(&self, actor: &AccountId, target: &AccountId) -> ForumResult<FollowPair> {
        Ok(self.state.write().await.ledger.follow(*actor, *target)?)
    }

    async fn unfollow(&self, actor: &AccountId, target: &AccountId) -> ForumResult<FollowPair> {
        Ok(self.state.write().await.ledger.unfollow(*actor, *target)?)
    }

    async fn follow_sets(&self, account: &AccountId) -> ForumResult<FollowSets> {
        Ok(self.state.read().await.ledger.sets(account))
    }
}

impl PostRepository for MemoryForumRepository {
    async fn create(&self, post: &Post) -> ForumResult<()> {
        self.state
            .write()
            .await
            .posts
            .insert(post.post_id, post.clone());
        Ok(())
    }

    async fn find_by_id(&self, post_id: &PostId) -> ForumResult<Option<Post>> {
        Ok(self.state.read().await.posts.get(post_id).cloned())
    }

    async fn list(&self, filter: &PostFilter, page: PageRequest) -> ForumResult<Paginated<Post>> {
        let state = self.state.read().await;
        let mut matched: Vec<&Post> = state
            .posts
            .values()
            .filter(|p| filter.category.is_none_or(|c| p.category_id == c))
            .filter(|p| filter.author.is_none_or(|a| p.author_id == a))
            .filter(|p| filter.liked_by.is_none_or(|a| p.engagement.is_liked_by(&a)))
            .collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.post_id.cmp(&b.post_id))
        });

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok(Paginated::new(items, total, page))
    }

    async fn update(&self, post: &Post) -> ForumResult<bool> {
        let mut state = self.state.write().await;
        let Some(stored) = state.posts.get_mut(&post.post_id) else {
            return Ok(false);
        };
        stored.title = post.title.clone();
        stored.content = post.content.clone();
        stored.category_id = post.category_id;
        stored.updated_at = post.updated_at;
        Ok(true)
    }

    async fn delete(&self, post_id: &PostId) -> ForumResult<bool> {
        Ok(self.state.write().await.posts.remove(post_id).is_some())
    }

    async fn vote(
        &self,
        post_id: &PostId,
        actor: &AccountId,
        direction: VoteDirection,
    ) -> ForumResult<Engagement> {
        let mut state = self.state.write().await;
        let post = state
            .posts
            .get_mut(post_id)
            .ok_or(ForumError::PostNotFound)?;
        post.engagement.vote(*actor, direction);
        Ok(post.engagement.clone())
    }

    async fn toggle_like(&self, post_id: &PostId, actor: &AccountId) -> ForumResult<Engagement> {
        let mut state = self.state.write().await;
        let post = state
            .posts
            .get_mut(post_id)
            .ok_or(ForumError::PostNotFound)?;
        post.engagement.toggle_like(*actor);
        Ok(post.engagement.clone())
    }

    async fn add_comment(&self, post_id: &PostId, comment: &Comment) -> ForumResult<()> {
        let mut state = self.state.write().await;
        let post = state
            .posts
            .get_mut(post_id)
            .ok_or(ForumError::PostNotFound)?;
        post.comments.push(comment.clone());
        Ok(())
    }

    async fn delete_comment(&self, post_id: &PostId, comment_id: &CommentId) -> ForumResult<bool> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.get_mut(post_id) else {
            return Ok(false);
        };
        let before = post.comments.len();
        post.comments.retain(|c| &c.comment_id != comment_id);
        Ok(post.comments.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::Id;

    fn post(author: AccountId) -> Post {
        Post::new(author, Id::new(), "Title", "Body").unwrap()
    }

    #[tokio::test]
    async fn test_vote_on_missing_post() {
        let repo = MemoryForumRepository::new();
        let err = repo
            .vote(&Id::new(), &Id::new(), VoteDirection::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, ForumError::PostNotFound));
    }

    #[tokio::test]
    async fn test_comments_keep_insertion_order() {
        let repo = MemoryForumRepository::new();
        let author: AccountId = Id::new();
        let p = post(author);
        repo.create(&p).await.unwrap();

        let first = Comment::new(author, "first").unwrap();
        let second = Comment::new(author, "second").unwrap();
        repo.add_comment(&p.post_id, &first).await.unwrap();
        repo.add_comment(&p.post_id, &second).await.unwrap();

        let stored = repo.find_by_id(&p.post_id).await.unwrap().unwrap();
        let texts: Vec<&str> = stored.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);

        assert!(repo.delete_comment(&p.post_id, &first.comment_id).await.unwrap());
        assert!(!repo.delete_comment(&p.post_id, &first.comment_id).await.unwrap());
        let stored = repo.find_by_id(&p.post_id).await.unwrap().unwrap();
        assert_eq!(stored.comments.len(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_author() {
        let repo = MemoryForumRepository::new();
        let (a, b): (AccountId, AccountId) = (Id::new(), Id::new());
        for author in [a, a, b] {
            repo.create(&post(author)).await.unwrap();
        }

        let filter = PostFilter {
            author: Some(a),
            ..Default::default()
        };
        let page = repo
            .list(&filter, PageRequest::new(None, Some(1), 10, 100))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.pages, 2);
    }

    #[tokio::test]
    async fn test_list_liked_by() {
        let repo = MemoryForumRepository::new();
        let fan: AccountId = Id::new();
        let liked = post(Id::new());
        let other = post(Id::new());
        repo.create(&liked).await.unwrap();
        repo.create(&other).await.unwrap();
        repo.toggle_like(&liked.post_id, &fan).await.unwrap();

        let filter = PostFilter {
            liked_by: Some(fan),
            ..Default::default()
        };
        let page = repo
            .list(&filter, PageRequest::new(None, None, 10, 100))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.items[0].post_id, liked.post_id);
    }

    #[tokio::test]
    async fn test_update_keeps_engagement() {
        let repo = MemoryForumRepository::new();
        let voter: AccountId = Id::new();
        let mut p = post(Id::new());
        repo.create(&p).await.unwrap();
        repo.vote(&p.post_id, &voter, VoteDirection::Up).await.unwrap();

        p.revise("Edited", "Edited body", None).unwrap();
        assert!(repo.update(&p).await.unwrap());

        let stored = repo.find_by_id(&p.post_id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Edited");
        assert_eq!(stored.engagement.score(), 1);

        assert!(!repo.update(&post(Id::new())).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_follows_write_one_edge() {
        let repo = MemoryForumRepository::new();
        let (u1, u2): (AccountId, AccountId) = (Id::new(), Id::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.follow(&u1, &u2).await.is_ok() })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(repo.follow_sets(&u2).await.unwrap().followers.len(), 1);
    }
}
