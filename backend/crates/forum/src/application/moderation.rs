//! Moderation Use Cases
//!
//! 管理者のみが実行できる操作（BAN / 解除 / 投稿・コメントの削除 / 一覧）。
//!
//! ## 方針
//! - 権限チェックは各操作の先頭で行い、失敗時は何も変更しない
//! - BAN は既発行トークンを失効させない。次回の Guard 通過時に拒否される
//! - 解除は冪等

use std::sync::Arc;

use auth::domain::value_object::ban_state::BanState;
use auth::{Account, AccountRepository, Principal};
use chrono::{DateTime, Utc};
use kernel::id::{AccountId, CommentId, PostId};
use kernel::pagination::{PageRequest, Paginated};
use relay::NotificationRelay;

use crate::application::comment::CommentUseCase;
use crate::application::post::PostUseCase;
use crate::domain::post::{Post, PostFilter};
use crate::domain::repository::PostRepository;
use crate::error::{ForumError, ForumResult};

/// Fail with `AdminRequired` unless the principal is an administrator
pub fn require_admin(principal: &Principal) -> ForumResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        tracing::warn!(account_id = %principal.account_id, "Admin operation refused");
        Err(ForumError::AdminRequired)
    }
}

/// Ban toggle as sent by the admin panel
#[derive(Debug, Clone, Default)]
pub struct BanInput {
    pub banned: bool,
    pub reason: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct ModerationUseCase<A, R>
where
    A: AccountRepository,
    R: PostRepository,
{
    accounts: Arc<A>,
    repo: Arc<R>,
    relay: Arc<NotificationRelay>,
}

impl<A, R> ModerationUseCase<A, R>
where
    A: AccountRepository,
    R: PostRepository,
{
    pub fn new(accounts: Arc<A>, repo: Arc<R>, relay: Arc<NotificationRelay>) -> Self {
        Self {
            accounts,
            repo,
            relay,
        }
    }

    /// Ban or unban `target`, returning the updated account
    pub async fn set_ban(
        &self,
        admin: &Principal,
        target: &AccountId,
        input: BanInput,
    ) -> ForumResult<Account> {
        require_admin(admin)?;

        let ban = if input.banned {
            if &admin.account_id == target {
                return Err(ForumError::SelfBan);
            }
            if input.expires_at.is_some_and(|at| at <= Utc::now()) {
                return Err(ForumError::Validation(
                    "Ban expiry must be in the future".to_string(),
                ));
            }
            BanState::banned(input.reason, input.expires_at)
        } else {
            BanState::Active
        };

        if !self.accounts.update_ban(target, &ban).await? {
            return Err(ForumError::AccountNotFound);
        }

        let account = self
            .accounts
            .find_by_id(target)
            .await?
            .ok_or(ForumError::AccountNotFound)?;

        tracing::info!(
            admin = %admin.account_id,
            target = %target,
            banned = ban.is_banned(),
            reason = ban.reason().unwrap_or(""),
            "Ban state updated"
        );

        Ok(account)
    }

    pub async fn ban(
        &self,
        admin: &Principal,
        target: &AccountId,
        reason: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> ForumResult<Account> {
        self.set_ban(
            admin,
            target,
            BanInput {
                banned: true,
                reason,
                expires_at,
            },
        )
        .await
    }

    pub async fn unban(&self, admin: &Principal, target: &AccountId) -> ForumResult<Account> {
        self.set_ban(admin, target, BanInput::default()).await
    }

    pub async fn remove_post(&self, admin: &Principal, post_id: &PostId) -> ForumResult<()> {
        require_admin(admin)?;
        PostUseCase::new(self.repo.clone(), self.relay.clone())
            .remove(post_id)
            .await
    }

    pub async fn remove_comment(
        &self,
        admin: &Principal,
        post_id: &PostId,
        comment_id: &CommentId,
    ) -> ForumResult<()> {
        require_admin(admin)?;
        if self.repo.find_by_id(post_id).await?.is_none() {
            return Err(ForumError::PostNotFound);
        }
        CommentUseCase::new(self.repo.clone(), self.relay.clone())
            .remove(post_id, comment_id)
            .await
    }

    /// Accounts matching `search` on handle or email, newest first
    pub async fn list_accounts(
        &self,
        admin: &Principal,
        search: Option<&str>,
        page: PageRequest,
    ) -> ForumResult<Paginated<Account>> {
        require_admin(admin)?;
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.accounts.list(search, page).await?)
    }

    pub async fn list_posts(
        &self,
        admin: &Principal,
        author: Option<AccountId>,
        page: PageRequest,
    ) -> ForumResult<Paginated<Post>> {
        require_admin(admin)?;
        let filter = PostFilter {
            author,
            ..Default::default()
        };
        self.repo.list(&filter, page).await
    }
}
