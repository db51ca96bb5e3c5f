//! API DTOs (Data Transfer Objects)

use auth::Account;
use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::Profile;
use crate::domain::engagement::Engagement;
use crate::domain::post::{Comment, Post};
use crate::domain::relationship::FollowPair;

fn sorted_ids<'a>(ids: impl IntoIterator<Item = &'a AccountId>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.into_iter().map(|id| id.into_uuid()).collect();
    ids.sort();
    ids
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(alias = "category")]
    pub category_id: Option<String>,
    #[serde(alias = "userId")]
    pub author_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(alias = "category")]
    pub category_id: String,
    pub title: String,
    pub content: String,
}

/// Full replacement of title and content; the category is kept when omitted
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default, alias = "category")]
    pub category_id: Option<String>,
}

/// `{"direction": "up"}`; `voteType: "upvote"` is accepted as well
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(alias = "voteType")]
    pub direction: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanRequest {
    pub is_banned: bool,
    #[serde(default)]
    pub ban_reason: Option<String>,
    #[serde(default)]
    pub ban_expires_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Responses
// ============================================================================

/// Public profile (no email, no ban details)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub followers_count: usize,
    pub following_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        let account = &profile.account;
        Self {
            id: account.account_id.into_uuid(),
            username: account.handle.original().to_string(),
            role: account.role.code().to_string(),
            bio: account.bio.clone(),
            avatar: account.avatar.clone(),
            followers_count: profile.followers,
            following_count: profile.following,
            created_at: account.created_at,
        }
    }
}

/// Entry of a followers/following listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.account_id.into_uuid(),
            username: account.handle.original().to_string(),
            avatar: account.avatar.clone(),
        }
    }
}

/// Actor's `following` and target's `followers` after a follow/unfollow
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub following: Vec<Uuid>,
    pub followers: Vec<Uuid>,
}

impl From<&FollowPair> for FollowResponse {
    fn from(pair: &FollowPair) -> Self {
        Self {
            following: sorted_ids(&pair.following),
            followers: sorted_ids(&pair.followers),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementResponse {
    pub upvotes: Vec<Uuid>,
    pub downvotes: Vec<Uuid>,
    pub likes: Vec<Uuid>,
    pub upvote_count: usize,
    pub downvote_count: usize,
    pub like_count: usize,
    pub score: i64,
}

impl From<&Engagement> for EngagementResponse {
    fn from(engagement: &Engagement) -> Self {
        Self {
            upvotes: sorted_ids(engagement.upvotes()),
            downvotes: sorted_ids(engagement.downvotes()),
            likes: sorted_ids(engagement.likes()),
            upvote_count: engagement.upvotes().len(),
            downvote_count: engagement.downvotes().len(),
            like_count: engagement.likes().len(),
            score: engagement.score(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.comment_id.into_uuid(),
            author_id: comment.author_id.into_uuid(),
            text: comment.text.clone(),
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(flatten)]
    pub engagement: EngagementResponse,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.post_id.into_uuid(),
            author_id: post.author_id.into_uuid(),
            category_id: post.category_id.into_uuid(),
            title: post.title.clone(),
            content: post.content.clone(),
            engagement: EngagementResponse::from(&post.engagement),
            comments: post.comments.iter().map(CommentResponse::from).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
