//! HTTP Handlers

use std::sync::Arc;

use auth::models::{AccountResponse, UpdateDetailsRequest};
use auth::{AccountRepository, Principal};
use axum::extract::{Extension, Path, State};
use kernel::id::Id;
use kernel::response::ApiResponse;
use relay::NotificationRelay;

use crate::application::config::ForumConfig;
use crate::application::{
    BanInput, CommentUseCase, CreatePostInput, EngagementUseCase, FollowDirection,
    FollowListUseCase, FollowUseCase, ModerationUseCase, PostUseCase, ProfileUseCase,
    UpdatePostInput,
};
use crate::domain::engagement::VoteDirection;
use crate::domain::post::PostFilter;
use crate::domain::repository::{PostRepository, RelationshipRepository};
use crate::error::{ForumError, ForumResult};
use crate::presentation::dto::{
    AccountSummary, BanRequest, CommentRequest, CommentResponse, CreatePostRequest,
    EngagementResponse, FollowResponse, ListAccountsQuery, ListPostsQuery, PostResponse,
    PageQuery, ProfileResponse, UpdatePostRequest, VoteRequest,
};
use crate::presentation::extract::{Json, Query};

/// Shared state for forum handlers
pub struct ForumAppState<A, R>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    pub accounts: Arc<A>,
    pub repo: Arc<R>,
    pub relay: Arc<NotificationRelay>,
    pub config: Arc<ForumConfig>,
}

impl<A, R> ForumAppState<A, R>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    pub fn new(
        accounts: Arc<A>,
        repo: Arc<R>,
        relay: Arc<NotificationRelay>,
        config: Arc<ForumConfig>,
    ) -> Self {
        Self {
            accounts,
            repo,
            relay,
            config,
        }
    }
}

impl<A, R> Clone for ForumAppState<A, R>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            accounts: self.accounts.clone(),
            repo: self.repo.clone(),
            relay: self.relay.clone(),
            config: self.config.clone(),
        }
    }
}

/// Path segments are parsed here so a bad id gets the usual envelope
fn parse_id<T>(raw: &str) -> ForumResult<Id<T>> {
    Ok(raw.parse()?)
}

fn parse_optional_id<T>(raw: Option<&str>) -> ForumResult<Option<Id<T>>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_id)
        .transpose()
}

// ============================================================================
// Users & relationships
// ============================================================================

/// GET /api/users/{id}
pub async fn get_profile<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Path(id): Path<String>,
) -> ForumResult<ApiResponse<ProfileResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let profile = ProfileUseCase::new(state.accounts.clone(), state.repo.clone())
        .execute(&parse_id(&id)?)
        .await?;

    Ok(ApiResponse::ok(ProfileResponse::from(&profile)))
}

/// PUT /api/users/{id}
pub async fn update_profile<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDetailsRequest>,
) -> ForumResult<ApiResponse<AccountResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let account = ProfileUseCase::new(state.accounts.clone(), state.repo.clone())
        .update(&principal, &parse_id(&id)?, req.into())
        .await?;

    Ok(ApiResponse::ok(AccountResponse::from(&account)))
}

async fn follow_list<A, R>(
    state: ForumAppState<A, R>,
    id: String,
    direction: FollowDirection,
) -> ForumResult<ApiResponse<Vec<AccountSummary>>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let accounts = FollowListUseCase::new(state.accounts.clone(), state.repo.clone())
        .execute(&parse_id(&id)?, direction)
        .await?;

    Ok(ApiResponse::ok(
        accounts.iter().map(AccountSummary::from).collect(),
    ))
}

/// GET /api/users/{id}/followers
pub async fn followers<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Path(id): Path<String>,
) -> ForumResult<ApiResponse<Vec<AccountSummary>>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    follow_list(state, id, FollowDirection::Followers).await
}

/// GET /api/users/{id}/following
pub async fn following<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Path(id): Path<String>,
) -> ForumResult<ApiResponse<Vec<AccountSummary>>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    follow_list(state, id, FollowDirection::Following).await
}

/// POST /api/users/{id}/follow
pub async fn follow<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ForumResult<ApiResponse<FollowResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let pair = FollowUseCase::new(
        state.accounts.clone(),
        state.repo.clone(),
        state.relay.clone(),
    )
    .follow(&principal, &parse_id(&id)?)
    .await?;

    Ok(ApiResponse::ok(FollowResponse::from(&pair)).with_message("User followed successfully"))
}

/// POST /api/users/{id}/unfollow
pub async fn unfollow<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ForumResult<ApiResponse<FollowResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let pair = FollowUseCase::new(
        state.accounts.clone(),
        state.repo.clone(),
        state.relay.clone(),
    )
    .unfollow(&principal, &parse_id(&id)?)
    .await?;

    Ok(ApiResponse::ok(FollowResponse::from(&pair)).with_message("User unfollowed successfully"))
}

// ============================================================================
// Posts
// ============================================================================

/// GET /api/posts
pub async fn list_posts<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Query(query): Query<ListPostsQuery>,
) -> ForumResult<ApiResponse<Vec<PostResponse>>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let filter = PostFilter {
        category: parse_optional_id(query.category_id.as_deref())?,
        author: parse_optional_id(query.author_id.as_deref())?,
        ..Default::default()
    };
    let page = state.config.page(query.page, query.limit);

    let posts = PostUseCase::new(state.repo.clone(), state.relay.clone())
        .list(&filter, page)
        .await?;

    Ok(ApiResponse::page(posts.map(|p| PostResponse::from(&p))))
}

/// GET /api/posts/{id}
pub async fn get_post<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Path(id): Path<String>,
) -> ForumResult<ApiResponse<PostResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let post = PostUseCase::new(state.repo.clone(), state.relay.clone())
        .get(&parse_id(&id)?)
        .await?;

    Ok(ApiResponse::ok(PostResponse::from(&post)))
}

/// GET /api/posts/user/{user_id}
pub async fn user_posts<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ForumResult<ApiResponse<Vec<PostResponse>>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let page = state.config.page(query.page, query.limit);
    let posts = PostUseCase::new(state.repo.clone(), state.relay.clone())
        .list_by_author(&parse_id(&user_id)?, page)
        .await?;

    Ok(ApiResponse::page(posts.map(|p| PostResponse::from(&p))))
}

/// GET /api/posts/liked/{user_id}
pub async fn liked_posts<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ForumResult<ApiResponse<Vec<PostResponse>>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let page = state.config.page(query.page, query.limit);
    let posts = PostUseCase::new(state.repo.clone(), state.relay.clone())
        .list_liked(&parse_id(&user_id)?, page)
        .await?;

    Ok(ApiResponse::page(posts.map(|p| PostResponse::from(&p))))
}

/// POST /api/posts
pub async fn create_post<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreatePostRequest>,
) -> ForumResult<ApiResponse<PostResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let post = PostUseCase::new(state.repo.clone(), state.relay.clone())
        .create(
            &principal,
            CreatePostInput {
                category_id: parse_id(&req.category_id)?,
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    Ok(ApiResponse::created(PostResponse::from(&post)))
}

/// PUT /api/posts/{id}
pub async fn update_post<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> ForumResult<ApiResponse<PostResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let post_id = parse_id(&id)?;
    let post = PostUseCase::new(state.repo.clone(), state.relay.clone())
        .update(
            &principal,
            &post_id,
            UpdatePostInput {
                title: req.title,
                content: req.content,
                category_id: parse_optional_id(req.category_id.as_deref())?,
            },
        )
        .await?;

    Ok(ApiResponse::ok(PostResponse::from(&post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ForumResult<ApiResponse<()>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    PostUseCase::new(state.repo.clone(), state.relay.clone())
        .delete(&principal, &parse_id(&id)?)
        .await?;

    Ok(ApiResponse::message("Post deleted successfully"))
}

/// PUT /api/posts/{id}/vote
pub async fn vote<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> ForumResult<ApiResponse<EngagementResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let post_id = parse_id(&id)?;
    let direction: VoteDirection = req.direction.parse().map_err(ForumError::Validation)?;

    let engagement = EngagementUseCase::new(state.repo.clone(), state.relay.clone())
        .vote(&principal, &post_id, direction)
        .await?;

    Ok(ApiResponse::ok(EngagementResponse::from(&engagement)))
}

/// PUT /api/posts/{id}/like
pub async fn like<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ForumResult<ApiResponse<EngagementResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let engagement = EngagementUseCase::new(state.repo.clone(), state.relay.clone())
        .toggle_like(&principal, &parse_id(&id)?)
        .await?;

    Ok(ApiResponse::ok(EngagementResponse::from(&engagement)))
}

// ============================================================================
// Comments
// ============================================================================

/// POST /api/posts/{id}/comments
pub async fn add_comment<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> ForumResult<ApiResponse<CommentResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let comment = CommentUseCase::new(state.repo.clone(), state.relay.clone())
        .add(&principal, &parse_id(&id)?, &req.text)
        .await?;

    Ok(ApiResponse::created(CommentResponse::from(&comment)))
}

/// DELETE /api/posts/{id}/comments/{comment_id}
pub async fn delete_comment<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> ForumResult<ApiResponse<()>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    CommentUseCase::new(state.repo.clone(), state.relay.clone())
        .delete(&principal, &parse_id(&post_id)?, &parse_id(&comment_id)?)
        .await?;

    Ok(ApiResponse::message("Comment deleted successfully"))
}

// ============================================================================
// Admin
// ============================================================================

fn moderation<A, R>(state: &ForumAppState<A, R>) -> ModerationUseCase<A, R>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    ModerationUseCase::new(
        state.accounts.clone(),
        state.repo.clone(),
        state.relay.clone(),
    )
}

/// GET /api/admin/users
pub async fn admin_list_accounts<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListAccountsQuery>,
) -> ForumResult<ApiResponse<Vec<AccountResponse>>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let page = state.config.page(query.page, query.limit);
    let accounts = moderation(&state)
        .list_accounts(&principal, query.search.as_deref(), page)
        .await?;

    Ok(ApiResponse::page(
        accounts.map(|a| AccountResponse::from(&a)),
    ))
}

/// PUT /api/admin/users/{id}/ban
pub async fn admin_set_ban<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<BanRequest>,
) -> ForumResult<ApiResponse<AccountResponse>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let account = moderation(&state)
        .set_ban(
            &principal,
            &parse_id(&id)?,
            BanInput {
                banned: req.is_banned,
                reason: req.ban_reason,
                expires_at: req.ban_expires_at,
            },
        )
        .await?;

    Ok(ApiResponse::ok(AccountResponse::from(&account)))
}

/// GET /api/admin/posts
pub async fn admin_list_posts<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListPostsQuery>,
) -> ForumResult<ApiResponse<Vec<PostResponse>>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    let author = parse_optional_id(query.author_id.as_deref())?;
    let page = state.config.page(query.page, query.limit);

    let posts = moderation(&state)
        .list_posts(&principal, author, page)
        .await?;

    Ok(ApiResponse::page(posts.map(|p| PostResponse::from(&p))))
}

/// DELETE /api/admin/posts/{id}
pub async fn admin_delete_post<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ForumResult<ApiResponse<()>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    moderation(&state)
        .remove_post(&principal, &parse_id(&id)?)
        .await?;

    Ok(ApiResponse::message("Post deleted successfully"))
}

/// DELETE /api/admin/posts/{id}/comments/{comment_id}
pub async fn admin_delete_comment<A, R>(
    State(state): State<ForumAppState<A, R>>,
    Extension(principal): Extension<Principal>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> ForumResult<ApiResponse<()>>
where
    A: AccountRepository + Send + Sync + 'static,
    R: RelationshipRepository + PostRepository + Send + Sync + 'static,
{
    moderation(&state)
        .remove_comment(&principal, &parse_id(&post_id)?, &parse_id(&comment_id)?)
        .await?;

    Ok(ApiResponse::message("Comment deleted successfully"))
}
