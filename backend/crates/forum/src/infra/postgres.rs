//! PostgreSQL Repository Implementation
//!
//! Edges (follows, votes, likes) are rows with composite primary keys, so a
//! set can never hold the same account twice. Two-record mutations run in a
//! transaction that locks the rows involved in a fixed order.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, CommentId, PostId};
use kernel::pagination::{PageRequest, Paginated};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::engagement::{Engagement, VoteDirection};
use crate::domain::post::{Comment, Post, PostFilter};
use crate::domain::relationship::{FollowPair, FollowSets};
use crate::domain::repository::{PostRepository, RelationshipRepository};
use crate::error::{ForumError, ForumResult};

const POST_COLUMNS: &str = r#"
    post_id,
    author_id,
    category_id,
    title,
    content,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed forum repository
#[derive(Clone)]
pub struct PgForumRepository {
    pool: PgPool,
}

impl PgForumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ============================================================================
// Relationship Ledger
// ============================================================================

/// Lock both account rows (ordered by id) for the rest of the transaction.
/// Returns `false` if either account is missing.
async fn lock_accounts(conn: &mut PgConnection, a: &AccountId, b: &AccountId) -> ForumResult<bool> {
    let ids = [a.into_uuid(), b.into_uuid()];
    let locked: Vec<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT account_id FROM accounts
        WHERE account_id = ANY($1)
        ORDER BY account_id
        FOR UPDATE
        "#,
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await?;

    Ok(locked.len() == 2)
}

async fn following_of(conn: &mut PgConnection, account: &AccountId) -> ForumResult<HashSet<AccountId>> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT followee_id FROM account_follows WHERE follower_id = $1")
            .bind(account.as_uuid())
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows.into_iter().map(|(id,)| AccountId::from_uuid(id)).collect())
}

async fn followers_of(conn: &mut PgConnection, account: &AccountId) -> ForumResult<HashSet<AccountId>> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT follower_id FROM account_follows WHERE followee_id = $1")
            .bind(account.as_uuid())
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows.into_iter().map(|(id,)| AccountId::from_uuid(id)).collect())
}

impl RelationshipRepository for PgForumRepository {
    async fn follow(&self, actor: &AccountId, target: &AccountId) -> ForumResult<FollowPair> {
        if actor == target {
            return Err(ForumError::SelfFollow);
        }

        let mut tx = self.pool.begin().await?;
        if !lock_accounts(&mut tx, actor, target).await? {
            return Err(ForumError::AccountNotFound);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO account_follows (follower_id, followee_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            "#,
        )
        .bind(actor.as_uuid())
        .bind(target.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            // dropping `tx` rolls back
            return Err(ForumError::AlreadyFollowing);
        }

        let pair = FollowPair {
            following: following_of(&mut tx, actor).await?,
            followers: followers_of(&mut tx, target).await?,
        };
        tx.commit().await?;
        Ok(pair)
    }

    async fn unfollow(&self, actor: &AccountId, target: &AccountId) -> ForumResult<FollowPair> {
        if actor == target {
            return Err(ForumError::SelfFollow);
        }

        let mut tx = self.pool.begin().await?;
        if !lock_accounts(&mut tx, actor, target).await? {
            return Err(ForumError::AccountNotFound);
        }

        let deleted = sqlx::query(
            "DELETE FROM account_follows WHERE follower_id = $1 AND followee_id = $2",
        )
        .bind(actor.as_uuid())
        .bind(target.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if deleted == 0 {
            return Err(ForumError::NotFollowing);
        }

        let pair = FollowPair {
            following: following_of(&mut tx, actor).await?,
            followers: followers_of(&mut tx, target).await?,
        };
        tx.commit().await?;
        Ok(pair)
    }

    async fn follow_sets(&self, account: &AccountId) -> ForumResult<FollowSets> {
        let mut conn = self.pool.acquire().await?;
        Ok(FollowSets {
            followers: followers_of(&mut conn, account).await?,
            following: following_of(&mut conn, account).await?,
        })
    }
}

// ============================================================================
// Posts
// ============================================================================

#[derive(sqlx::FromRow)]
struct PostRow {
    post_id: Uuid,
    author_id: Uuid,
    category_id: Uuid,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    comment_id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    body: String,
    created_at: DateTime<Utc>,
}

/// Lock a post row; `PostNotFound` if it does not exist
async fn lock_post(conn: &mut PgConnection, post_id: &PostId) -> ForumResult<()> {
    sqlx::query("SELECT post_id FROM posts WHERE post_id = $1 FOR UPDATE")
        .bind(post_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await?
        .map(|_| ())
        .ok_or(ForumError::PostNotFound)
}

/// Engagement of several posts at once
async fn load_engagements(
    conn: &mut PgConnection,
    post_ids: &[Uuid],
) -> ForumResult<HashMap<Uuid, Engagement>> {
    let mut engagements: HashMap<Uuid, Engagement> = HashMap::new();

    let votes: Vec<(Uuid, Uuid, i16)> = sqlx::query_as(
        "SELECT post_id, account_id, direction FROM post_votes WHERE post_id = ANY($1)",
    )
    .bind(post_ids)
    .fetch_all(&mut *conn)
    .await?;

    for (post_id, account_id, direction) in votes {
        let direction = VoteDirection::from_i16(direction).ok_or_else(|| {
            ForumError::Internal(format!("Invalid vote direction {direction} on post {post_id}"))
        })?;
        engagements
            .entry(post_id)
            .or_default()
            .set_vote(AccountId::from_uuid(account_id), Some(direction));
    }

    let likes: Vec<(Uuid, Uuid)> =
        sqlx::query_as("SELECT post_id, account_id FROM post_likes WHERE post_id = ANY($1)")
            .bind(post_ids)
            .fetch_all(&mut *conn)
            .await?;

    for (post_id, account_id) in likes {
        engagements
            .entry(post_id)
            .or_default()
            .add_like(AccountId::from_uuid(account_id));
    }

    Ok(engagements)
}

async fn load_engagement(conn: &mut PgConnection, post_id: &PostId) -> ForumResult<Engagement> {
    let id = post_id.into_uuid();
    Ok(load_engagements(conn, &[id])
        .await?
        .remove(&id)
        .unwrap_or_default())
}

/// Comments of several posts, oldest first within each post
async fn load_comments(
    conn: &mut PgConnection,
    post_ids: &[Uuid],
) -> ForumResult<HashMap<Uuid, Vec<Comment>>> {
    let rows: Vec<CommentRow> = sqlx::query_as(
        r#"
        SELECT comment_id, post_id, author_id, body, created_at
        FROM post_comments
        WHERE post_id = ANY($1)
        ORDER BY seq
        "#,
    )
    .bind(post_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut comments: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for row in rows {
        comments.entry(row.post_id).or_default().push(Comment {
            comment_id: CommentId::from_uuid(row.comment_id),
            author_id: AccountId::from_uuid(row.author_id),
            text: row.body,
            created_at: row.created_at,
        });
    }
    Ok(comments)
}

/// Attach engagement and comments to post rows, keeping row order
async fn hydrate(conn: &mut PgConnection, rows: Vec<PostRow>) -> ForumResult<Vec<Post>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|r| r.post_id).collect();
    let mut engagements = load_engagements(conn, &ids).await?;
    let mut comments = load_comments(conn, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| Post {
            post_id: PostId::from_uuid(row.post_id),
            author_id: AccountId::from_uuid(row.author_id),
            category_id: row.category_id.into(),
            title: row.title,
            content: row.content,
            engagement: engagements.remove(&row.post_id).unwrap_or_default(),
            comments: comments.remove(&row.post_id).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect())
}

impl PostRepository for PgForumRepository {
    async fn create(&self, post: &Post) -> ForumResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                post_id,
                author_id,
                category_id,
                title,
                content,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(post.post_id.as_uuid())
        .bind(post.author_id.as_uuid())
        .bind(post.category_id.as_uuid())
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, post_id: &PostId) -> ForumResult<Option<Post>> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE post_id = $1"
        ))
        .bind(post_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => Ok(hydrate(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &PostFilter, page: PageRequest) -> ForumResult<Paginated<Post>> {
        let category = filter.category.map(|c| c.into_uuid());
        let author = filter.author.map(|a| a.into_uuid());
        let liked_by = filter.liked_by.map(|a| a.into_uuid());

        let mut conn = self.pool.acquire().await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE ($1::uuid IS NULL OR category_id = $1)
              AND ($2::uuid IS NULL OR author_id = $2)
              AND ($3::uuid IS NULL OR EXISTS (
                  SELECT 1 FROM post_likes l
                  WHERE l.post_id = posts.post_id AND l.account_id = $3
              ))
            "#,
        )
        .bind(category)
        .bind(author)
        .bind(liked_by)
        .fetch_one(&mut *conn)
        .await?;

        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE ($1::uuid IS NULL OR category_id = $1)
              AND ($2::uuid IS NULL OR author_id = $2)
              AND ($3::uuid IS NULL OR EXISTS (
                  SELECT 1 FROM post_likes l
                  WHERE l.post_id = posts.post_id AND l.account_id = $3
              ))
            ORDER BY created_at DESC, post_id
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(category)
        .bind(author)
        .bind(liked_by)
        .bind(i64::from(page.limit))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&mut *conn)
        .await?;

        let posts = hydrate(&mut conn, rows).await?;
        Ok(Paginated::new(posts, total.max(0) as u64, page))
    }

    async fn update(&self, post: &Post) -> ForumResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, content = $3, category_id = $4, updated_at = $5
            WHERE post_id = $1
            "#,
        )
        .bind(post.post_id.as_uuid())
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.category_id.as_uuid())
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, post_id: &PostId) -> ForumResult<bool> {
        // votes, likes and comments go with the post (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM posts WHERE post_id = $1")
            .bind(post_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn vote(
        &self,
        post_id: &PostId,
        actor: &AccountId,
        direction: VoteDirection,
    ) -> ForumResult<Engagement> {
        let mut tx = self.pool.begin().await?;
        lock_post(&mut tx, post_id).await?;

        let current: Option<i16> = sqlx::query_scalar(
            "SELECT direction FROM post_votes WHERE post_id = $1 AND account_id = $2",
        )
        .bind(post_id.as_uuid())
        .bind(actor.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        match VoteDirection::resolve(current.and_then(VoteDirection::from_i16), direction) {
            Some(next) => {
                sqlx::query(
                    r#"
                    INSERT INTO post_votes (post_id, account_id, direction, created_at)
                    VALUES ($1, $2, $3, NOW())
                    ON CONFLICT (post_id, account_id)
                    DO UPDATE SET direction = EXCLUDED.direction, created_at = NOW()
                    "#,
                )
                .bind(post_id.as_uuid())
                .bind(actor.as_uuid())
                .bind(next.as_i16())
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM post_votes WHERE post_id = $1 AND account_id = $2")
                    .bind(post_id.as_uuid())
                    .bind(actor.as_uuid())
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let engagement = load_engagement(&mut tx, post_id).await?;
        tx.commit().await?;
        Ok(engagement)
    }

    async fn toggle_like(&self, post_id: &PostId, actor: &AccountId) -> ForumResult<Engagement> {
        let mut tx = self.pool.begin().await?;
        lock_post(&mut tx, post_id).await?;

        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND account_id = $2")
            .bind(post_id.as_uuid())
            .bind(actor.as_uuid())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            sqlx::query(
                "INSERT INTO post_likes (post_id, account_id, created_at) VALUES ($1, $2, NOW())",
            )
            .bind(post_id.as_uuid())
            .bind(actor.as_uuid())
            .execute(&mut *tx)
            .await?;
        }

        let engagement = load_engagement(&mut tx, post_id).await?;
        tx.commit().await?;
        Ok(engagement)
    }

    async fn add_comment(&self, post_id: &PostId, comment: &Comment) -> ForumResult<()> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO post_comments (comment_id, post_id, author_id, body, created_at)
            SELECT $1, $2, $3, $4, $5
            WHERE EXISTS (SELECT 1 FROM posts WHERE post_id = $2)
            "#,
        )
        .bind(comment.comment_id.as_uuid())
        .bind(post_id.as_uuid())
        .bind(comment.author_id.as_uuid())
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Err(ForumError::PostNotFound);
        }
        Ok(())
    }

    async fn delete_comment(&self, post_id: &PostId, comment_id: &CommentId) -> ForumResult<bool> {
        let result =
            sqlx::query("DELETE FROM post_comments WHERE post_id = $1 AND comment_id = $2")
                .bind(post_id.as_uuid())
                .bind(comment_id.as_uuid())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}
