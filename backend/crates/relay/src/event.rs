//! Relay Events
//!
//! Advisory notifications pushed to connected clients. Serialized as
//! `{ "type": "<kebab-name>", "payload": { ... } }`.

use kernel::id::{AccountId, CommentId, PostId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipAction {
    Follow,
    Unfollow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementKind {
    Vote,
    Like,
}

/// Actor's state on the post after the change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementState {
    Up,
    Down,
    None,
    Liked,
    Unliked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum RelayEvent {
    RelationshipChanged {
        actor: AccountId,
        target: AccountId,
        action: RelationshipAction,
    },
    EngagementChanged {
        post: PostId,
        actor: AccountId,
        kind: EngagementKind,
        new_state: EngagementState,
    },
    CommentAdded {
        post: PostId,
        comment: CommentId,
        author: AccountId,
    },
    CommentRemoved {
        post: PostId,
        comment: CommentId,
    },
    PostRemoved {
        post: PostId,
    },
}

impl RelayEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::RelationshipChanged { .. } => "relationship-changed",
            RelayEvent::EngagementChanged { .. } => "engagement-changed",
            RelayEvent::CommentAdded { .. } => "comment-added",
            RelayEvent::CommentRemoved { .. } => "comment-removed",
            RelayEvent::PostRemoved { .. } => "post-removed",
        }
    }
}
