//! Profile Use Case
//!
//! Public view of an account with its follower counts, and profile edits
//! by the account itself or an administrator.

use std::sync::Arc;

use auth::application::{UpdateProfileInput, UpdateProfileUseCase};
use auth::{Account, AccountRepository, AuthError, Principal};
use kernel::id::AccountId;

use crate::domain::repository::RelationshipRepository;
use crate::error::{ForumError, ForumResult};

pub struct Profile {
    pub account: Account,
    pub followers: usize,
    pub following: usize,
}

pub struct ProfileUseCase<A, R>
where
    A: AccountRepository,
    R: RelationshipRepository,
{
    accounts: Arc<A>,
    repo: Arc<R>,
}

impl<A, R> ProfileUseCase<A, R>
where
    A: AccountRepository,
    R: RelationshipRepository,
{
    pub fn new(accounts: Arc<A>, repo: Arc<R>) -> Self {
        Self { accounts, repo }
    }

    pub async fn execute(&self, account_id: &AccountId) -> ForumResult<Profile> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(ForumError::AccountNotFound)?;
        let sets = self.repo.follow_sets(account_id).await?;

        Ok(Profile {
            account,
            followers: sets.followers.len(),
            following: sets.following.len(),
        })
    }

    pub async fn update(
        &self,
        principal: &Principal,
        account_id: &AccountId,
        input: UpdateProfileInput,
    ) -> ForumResult<Account> {
        if &principal.account_id != account_id && !principal.is_admin() {
            return Err(ForumError::NotOwner {
                action: "update",
                target: "profile",
            });
        }

        UpdateProfileUseCase::new(self.accounts.clone())
            .execute(account_id, input)
            .await
            .map_err(|e| match e {
                AuthError::AccountNotFound => ForumError::AccountNotFound,
                other => other.into(),
            })
    }
}
