//! Engagement Use Cases
//!
//! Vote (exclusive up/down with toggle-off) and like (independent toggle).

use std::sync::Arc;

use auth::Principal;
use kernel::id::PostId;
use relay::{EngagementKind, EngagementState, NotificationRelay, RelayEvent};

use crate::domain::engagement::{Engagement, VoteDirection};
use crate::domain::repository::PostRepository;
use crate::error::ForumResult;

pub struct EngagementUseCase<R>
where
    R: PostRepository,
{
    repo: Arc<R>,
    relay: Arc<NotificationRelay>,
}

impl<R> EngagementUseCase<R>
where
    R: PostRepository,
{
    pub fn new(repo: Arc<R>, relay: Arc<NotificationRelay>) -> Self {
        Self { repo, relay }
    }

    /// Apply a vote request and return the post's engagement afterwards
    pub async fn vote(
        &self,
        actor: &Principal,
        post_id: &PostId,
        direction: VoteDirection,
    ) -> ForumResult<Engagement> {
        let engagement = self
            .repo
            .vote(post_id, &actor.account_id, direction)
            .await?;

        let new_state = match engagement.vote_of(&actor.account_id) {
            Some(VoteDirection::Up) => EngagementState::Up,
            Some(VoteDirection::Down) => EngagementState::Down,
            None => EngagementState::None,
        };

        tracing::debug!(
            post_id = %post_id,
            actor = %actor.account_id,
            requested = %direction,
            state = ?new_state,
            "Vote applied"
        );

        self.relay.publish(RelayEvent::EngagementChanged {
            post: *post_id,
            actor: actor.account_id,
            kind: EngagementKind::Vote,
            new_state,
        });

        Ok(engagement)
    }

    pub async fn toggle_like(&self, actor: &Principal, post_id: &PostId) -> ForumResult<Engagement> {
        let engagement = self.repo.toggle_like(post_id, &actor.account_id).await?;

        let new_state = if engagement.is_liked_by(&actor.account_id) {
            EngagementState::Liked
        } else {
            EngagementState::Unliked
        };

        tracing::debug!(post_id = %post_id, actor = %actor.account_id, state = ?new_state, "Like toggled");

        self.relay.publish(RelayEvent::EngagementChanged {
            post: *post_id,
            actor: actor.account_id,
            kind: EngagementKind::Like,
            new_state,
        });

        Ok(engagement)
    }
}
