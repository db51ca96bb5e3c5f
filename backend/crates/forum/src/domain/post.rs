//! Post and Comment Entities

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, CategoryId, CommentId, PostId};
use thiserror::Error;

use crate::domain::engagement::Engagement;

pub const TITLE_MAX_LENGTH: usize = 200;
pub const CONTENT_MAX_LENGTH: usize = 20_000;
pub const COMMENT_MAX_LENGTH: usize = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("{field} is required")]
    Empty { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Trim and check a text field's length in characters
pub fn validate_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, ContentError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ContentError::Empty { field });
    }
    if value.chars().count() > max {
        return Err(ContentError::TooLong { field, max });
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub comment_id: CommentId,
    pub author_id: AccountId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author_id: AccountId, text: &str) -> Result<Self, ContentError> {
        Ok(Self {
            comment_id: CommentId::new(),
            author_id,
            text: validate_text("Comment text", text, COMMENT_MAX_LENGTH)?,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Post {
    pub post_id: PostId,
    pub author_id: AccountId,
    pub category_id: CategoryId,
    pub title: String,
    pub content: String,
    pub engagement: Engagement,
    /// Oldest first
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        author_id: AccountId,
        category_id: CategoryId,
        title: &str,
        content: &str,
    ) -> Result<Self, ContentError> {
        let now = Utc::now();
        Ok(Self {
            post_id: PostId::new(),
            author_id,
            category_id,
            title: validate_text("Title", title, TITLE_MAX_LENGTH)?,
            content: validate_text("Content", content, CONTENT_MAX_LENGTH)?,
            engagement: Engagement::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace title, content and (optionally) category with the same checks
    /// as [`Post::new`]. Nothing changes when a field is invalid.
    pub fn revise(
        &mut self,
        title: &str,
        content: &str,
        category_id: Option<CategoryId>,
    ) -> Result<(), ContentError> {
        let title = validate_text("Title", title, TITLE_MAX_LENGTH)?;
        let content = validate_text("Content", content, CONTENT_MAX_LENGTH)?;
        self.title = title;
        self.content = content;
        if let Some(category_id) = category_id {
            self.category_id = category_id;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn comment(&self, comment_id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| &c.comment_id == comment_id)
    }
}

/// Listing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub category: Option<CategoryId>,
    pub author: Option<AccountId>,
    /// Only posts this account has liked
    pub liked_by: Option<AccountId>,
}
