//! Relationship Ledger
//!
//! Follower/following sets of every account, mutated only in pairs:
//! `B ∈ A.following ⇔ A ∈ B.followers`, and no account follows itself.

use std::collections::{HashMap, HashSet};

use kernel::id::AccountId;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelationshipError {
    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error("You are already following this user")]
    AlreadyFollowing,

    #[error("You are not following this user")]
    NotFollowing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowSets {
    pub followers: HashSet<AccountId>,
    pub following: HashSet<AccountId>,
}

/// Result of a follow/unfollow: the actor's `following` and the target's `followers`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowPair {
    pub following: HashSet<AccountId>,
    pub followers: HashSet<AccountId>,
}

/// In-process ledger (the in-memory store keeps one under its write lock)
#[derive(Debug, Default)]
pub struct RelationshipLedger {
    entries: HashMap<AccountId, FollowSets>,
}

impl RelationshipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sets(&self, account: &AccountId) -> FollowSets {
        self.entries.get(account).cloned().unwrap_or_default()
    }

    pub fn is_following(&self, actor: &AccountId, target: &AccountId) -> bool {
        self.entries
            .get(actor)
            .is_some_and(|s| s.following.contains(target))
    }

    /// Checks first, then writes both sides
    pub fn follow(
        &mut self,
        actor: AccountId,
        target: AccountId,
    ) -> Result<FollowPair, RelationshipError> {
        if actor == target {
            return Err(RelationshipError::SelfFollow);
        }
        if self.is_following(&actor, &target) {
            return Err(RelationshipError::AlreadyFollowing);
        }

        self.entries
            .entry(actor)
            .or_default()
            .following
            .insert(target);
        self.entries
            .entry(target)
            .or_default()
            .followers
            .insert(actor);

        Ok(self.pair(&actor, &target))
    }

    pub fn unfollow(
        &mut self,
        actor: AccountId,
        target: AccountId,
    ) -> Result<FollowPair, RelationshipError> {
        if actor == target {
            return Err(RelationshipError::SelfFollow);
        }
        if !self.is_following(&actor, &target) {
            return Err(RelationshipError::NotFollowing);
        }

        if let Some(sets) = self.entries.get_mut(&actor) {
            sets.following.remove(&target);
        }
        if let Some(sets) = self.entries.get_mut(&target) {
            sets.followers.remove(&actor);
        }

        Ok(self.pair(&actor, &target))
    }

    fn pair(&self, actor: &AccountId, target: &AccountId) -> FollowPair {
        FollowPair {
            following: self.sets(actor).following,
            followers: self.sets(target).followers,
        }
    }
}
