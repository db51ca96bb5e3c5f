//! Relationship Use Cases
//!
//! Follow / unfollow between accounts, and the follower listings.

use std::sync::Arc;

use auth::{Account, AccountRepository, Principal};
use kernel::id::AccountId;
use relay::{NotificationRelay, RelationshipAction, RelayEvent};

use crate::domain::relationship::FollowPair;
use crate::domain::repository::RelationshipRepository;
use crate::error::{ForumError, ForumResult};

/// Follow / unfollow use case
///
/// Both directions share the checks: no self-follow, target must exist.
/// The ledger write itself is atomic in the repository.
pub struct FollowUseCase<A, R>
where
    A: AccountRepository,
    R: RelationshipRepository,
{
    accounts: Arc<A>,
    repo: Arc<R>,
    relay: Arc<NotificationRelay>,
}

impl<A, R> FollowUseCase<A, R>
where
    A: AccountRepository,
    R: RelationshipRepository,
{
    pub fn new(accounts: Arc<A>, repo: Arc<R>, relay: Arc<NotificationRelay>) -> Self {
        Self {
            accounts,
            repo,
            relay,
        }
    }

    pub async fn follow(&self, actor: &Principal, target: &AccountId) -> ForumResult<FollowPair> {
        self.execute(actor, target, RelationshipAction::Follow).await
    }

    pub async fn unfollow(&self, actor: &Principal, target: &AccountId) -> ForumResult<FollowPair> {
        self.execute(actor, target, RelationshipAction::Unfollow)
            .await
    }

    async fn execute(
        &self,
        actor: &Principal,
        target: &AccountId,
        action: RelationshipAction,
    ) -> ForumResult<FollowPair> {
        if &actor.account_id == target {
            return Err(ForumError::SelfFollow);
        }
        if self.accounts.find_by_id(target).await?.is_none() {
            return Err(ForumError::AccountNotFound);
        }

        let pair = match action {
            RelationshipAction::Follow => self.repo.follow(&actor.account_id, target).await?,
            RelationshipAction::Unfollow => self.repo.unfollow(&actor.account_id, target).await?,
        };

        tracing::info!(
            actor = %actor.account_id,
            target = %target,
            action = ?action,
            "Relationship changed"
        );

        self.relay.publish(RelayEvent::RelationshipChanged {
            actor: actor.account_id,
            target: *target,
            action,
        });

        Ok(pair)
    }
}

/// Which side of the ledger to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowDirection {
    Followers,
    Following,
}

/// Accounts following / followed by an account
pub struct FollowListUseCase<A, R>
where
    A: AccountRepository,
    R: RelationshipRepository,
{
    accounts: Arc<A>,
    repo: Arc<R>,
}

impl<A, R> FollowListUseCase<A, R>
where
    A: AccountRepository,
    R: RelationshipRepository,
{
    pub fn new(accounts: Arc<A>, repo: Arc<R>) -> Self {
        Self { accounts, repo }
    }

    /// Ordered by handle so the listing is stable between calls
    pub async fn execute(
        &self,
        account_id: &AccountId,
        direction: FollowDirection,
    ) -> ForumResult<Vec<Account>> {
        if self.accounts.find_by_id(account_id).await?.is_none() {
            return Err(ForumError::AccountNotFound);
        }

        let sets = self.repo.follow_sets(account_id).await?;
        let ids: Vec<AccountId> = match direction {
            FollowDirection::Followers => sets.followers.into_iter().collect(),
            FollowDirection::Following => sets.following.into_iter().collect(),
        };

        let mut accounts = self.accounts.find_by_ids(&ids).await?;
        accounts.sort_by(|a, b| a.handle.canonical().cmp(b.handle.canonical()));
        Ok(accounts)
    }
}
