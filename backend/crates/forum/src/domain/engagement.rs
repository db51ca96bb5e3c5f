//! Engagement Ledger
//!
//! 投稿ごとの投票（up/down）といいね。
//!
//! ## 不変条件
//! - 1 アカウントは `upvotes` と `downvotes` の高々一方にのみ属する
//! - `likes` は投票状態と独立
//! - 集合は重複を持たない（追加は必ず所属判定を経由する）

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use kernel::id::AccountId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// 現在の投票と要求から、新しい投票状態を決める
    ///
    /// - 同じ方向を再度要求 → 取り消し (`None`)
    /// - 逆方向 → 付け替え
    /// - 未投票 → 追加
    pub fn resolve(current: Option<VoteDirection>, requested: VoteDirection) -> Option<VoteDirection> {
        match current {
            Some(c) if c == requested => None,
            _ => Some(requested),
        }
    }

    /// DB 表現（+1 / -1）
    pub const fn as_i16(&self) -> i16 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            1 => Some(VoteDirection::Up),
            -1 => Some(VoteDirection::Down),
            _ => None,
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        })
    }
}

impl FromStr for VoteDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "upvote" => Ok(VoteDirection::Up),
            "down" | "downvote" => Ok(VoteDirection::Down),
            other => Err(format!("Invalid vote type '{other}'. Use 'up' or 'down'")),
        }
    }
}

/// Vote and like sets of one post
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Engagement {
    upvotes: HashSet<AccountId>,
    downvotes: HashSet<AccountId>,
    likes: HashSet<AccountId>,
}

impl Engagement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upvotes(&self) -> &HashSet<AccountId> {
        &self.upvotes
    }

    pub fn downvotes(&self) -> &HashSet<AccountId> {
        &self.downvotes
    }

    pub fn likes(&self) -> &HashSet<AccountId> {
        &self.likes
    }

    pub fn vote_of(&self, actor: &AccountId) -> Option<VoteDirection> {
        if self.upvotes.contains(actor) {
            Some(VoteDirection::Up)
        } else if self.downvotes.contains(actor) {
            Some(VoteDirection::Down)
        } else {
            None
        }
    }

    pub fn is_liked_by(&self, actor: &AccountId) -> bool {
        self.likes.contains(actor)
    }

    /// Apply a vote request and return the actor's resulting vote
    pub fn vote(&mut self, actor: AccountId, requested: VoteDirection) -> Option<VoteDirection> {
        let next = VoteDirection::resolve(self.vote_of(&actor), requested);
        self.set_vote(actor, next);
        next
    }

    /// Set the actor's vote directly (used when rebuilding from storage)
    pub fn set_vote(&mut self, actor: AccountId, vote: Option<VoteDirection>) {
        self.upvotes.remove(&actor);
        self.downvotes.remove(&actor);
        match vote {
            Some(VoteDirection::Up) => {
                self.upvotes.insert(actor);
            }
            Some(VoteDirection::Down) => {
                self.downvotes.insert(actor);
            }
            None => {}
        }
    }

    /// Toggle the actor's like; returns `true` when the post is now liked
    pub fn toggle_like(&mut self, actor: AccountId) -> bool {
        if self.likes.remove(&actor) {
            false
        } else {
            self.likes.insert(actor);
            true
        }
    }

    pub fn add_like(&mut self, actor: AccountId) {
        self.likes.insert(actor);
    }

    /// up − down
    pub fn score(&self) -> i64 {
        self.upvotes.len() as i64 - self.downvotes.len() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::Id;

    #[test]
    fn test_resolve_table() {
        use VoteDirection::*;
        assert_eq!(VoteDirection::resolve(None, Up), Some(Up));
        assert_eq!(VoteDirection::resolve(None, Down), Some(Down));
        assert_eq!(VoteDirection::resolve(Some(Up), Up), None);
        assert_eq!(VoteDirection::resolve(Some(Down), Down), None);
        assert_eq!(VoteDirection::resolve(Some(Up), Down), Some(Down));
        assert_eq!(VoteDirection::resolve(Some(Down), Up), Some(Up));
    }

    #[test]
    fn test_up_then_down_swaps() {
        let u: AccountId = Id::new();
        let mut e = Engagement::new();

        e.vote(u, VoteDirection::Up);
        assert!(e.upvotes().contains(&u));
        assert!(e.downvotes().is_empty());

        e.vote(u, VoteDirection::Down);
        assert!(e.upvotes().is_empty());
        assert!(e.downvotes().contains(&u));
    }

    #[test]
    fn test_repeat_vote_toggles_off() {
        let u: AccountId = Id::new();
        let mut e = Engagement::new();

        assert_eq!(e.vote(u, VoteDirection::Up), Some(VoteDirection::Up));
        assert_eq!(e.vote(u, VoteDirection::Up), None);
        assert!(e.upvotes().is_empty());
        assert_eq!(e.score(), 0);
    }

    #[test]
    fn test_likes_are_independent_of_votes() {
        let u: AccountId = Id::new();
        let mut e = Engagement::new();

        e.vote(u, VoteDirection::Down);
        assert!(e.toggle_like(u));
        assert_eq!(e.vote_of(&u), Some(VoteDirection::Down));

        e.vote(u, VoteDirection::Down);
        assert!(e.is_liked_by(&u));

        assert!(!e.toggle_like(u));
        assert!(e.likes().is_empty());
    }

    #[test]
    fn test_score() {
        let mut e = Engagement::new();
        for _ in 0..3 {
            e.vote(Id::new(), VoteDirection::Up);
        }
        e.vote(Id::new(), VoteDirection::Down);
        assert_eq!(e.score(), 2);
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!("UP".parse::<VoteDirection>(), Ok(VoteDirection::Up));
        assert_eq!("downvote".parse::<VoteDirection>(), Ok(VoteDirection::Down));
        assert!("sideways".parse::<VoteDirection>().is_err());
    }
}
