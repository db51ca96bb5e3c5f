//! Ban State Value Object
//!
//! アカウントの利用停止状態。
//!
//! ## 設計方針
//! - `Active` と `Banned` の 2 状態のみ
//! - `Banned` は理由・期限を任意で持つ
//! - 期限切れの判定は Guard 側で行い、期限切れなら遅延解除して永続化する

use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BanState {
    #[default]
    Active,
    Banned {
        reason: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    },
}

impl BanState {
    pub fn banned(reason: Option<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        BanState::Banned { reason, expires_at }
    }

    #[inline]
    pub fn is_banned(&self) -> bool {
        matches!(self, BanState::Banned { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            BanState::Banned { reason, .. } => reason.as_deref(),
            BanState::Active => None,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            BanState::Banned { expires_at, .. } => *expires_at,
            BanState::Active => None,
        }
    }

    /// 期限付き BAN が `now` の時点で失効しているか
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }

    /// DB の列 (`is_banned`, `ban_reason`, `ban_expires_at`) から復元
    pub fn from_db(
        is_banned: bool,
        reason: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        if is_banned {
            BanState::Banned { reason, expires_at }
        } else {
            BanState::Active
        }
    }
}

/// Message shown to a banned account
impl fmt::Display for BanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BanState::Active => f.write_str("Account is active"),
            BanState::Banned { reason, expires_at } => {
                f.write_str("Your account has been banned.")?;
                if let Some(reason) = reason {
                    write!(f, " Reason: {reason}")?;
                }
                if let Some(at) = expires_at {
                    write!(f, " Ban expires: {}", at.to_rfc3339())?;
                }
                Ok(())
            }
        }
    }
}
