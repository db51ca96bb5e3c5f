//! Account Entity
//!
//! Registered forum account: identity, credential hash, role and ban state.
//! Follow relationships live in the forum crate.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;

use crate::domain::value_object::{
    account_role::AccountRole, ban_state::BanState, email::Email, handle::Handle,
};

#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    /// Unique handle (case-insensitive)
    pub handle: Handle,
    /// Unique email (stored lowercased)
    pub email: Email,
    pub password_hash: HashedPassword,
    pub role: AccountRole,
    pub ban: BanState,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(handle: Handle, email: Email, password_hash: HashedPassword) -> Self {
        let now = Utc::now();
        Self {
            account_id: AccountId::new(),
            handle,
            email,
            password_hash,
            role: AccountRole::default(),
            ban: BanState::default(),
            bio: None,
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn set_ban(&mut self, ban: BanState) {
        self.ban = ban;
        self.updated_at = Utc::now();
    }

    /// 期限切れの BAN を解除する。解除した場合 `true`
    pub fn lift_expired_ban(&mut self, now: DateTime<Utc>) -> bool {
        if self.ban.is_banned() && self.ban.has_expired(now) {
            self.ban = BanState::Active;
            self.updated_at = now;
            true
        } else {
            false
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            account_id: self.account_id,
            handle: self.handle.original().to_string(),
            role: self.role,
        }
    }
}

/// Authenticated caller, attached to the request by the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub account_id: AccountId,
    pub handle: String,
    pub role: AccountRole,
}

impl Principal {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use platform::password::ClearTextPassword;

    fn account() -> Account {
        let hash = ClearTextPassword::new("forum-hub-2024!".to_string())
            .unwrap()
            .hash(None)
            .unwrap();
        Account::new(
            Handle::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            hash,
        )
    }

    #[test]
    fn test_new_account_defaults() {
        let account = account();
        assert_eq!(account.role, AccountRole::User);
        assert!(!account.ban.is_banned());
        assert!(!account.is_admin());
    }

    #[test]
    fn test_lift_expired_ban() {
        let now = Utc::now();
        let mut account = account();

        account.set_ban(BanState::banned(None, Some(now + Duration::hours(1))));
        assert!(!account.lift_expired_ban(now));
        assert!(account.ban.is_banned());

        assert!(account.lift_expired_ban(now + Duration::hours(2)));
        assert!(!account.ban.is_banned());
    }

    #[test]
    fn test_permanent_ban_is_never_lifted() {
        let mut account = account();
        account.set_ban(BanState::banned(Some("spam".to_string()), None));
        assert!(!account.lift_expired_ban(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn test_principal() {
        let account = account();
        let principal = account.principal();
        assert_eq!(principal.account_id, account.account_id);
        assert_eq!(principal.handle, "alice");
        assert!(!principal.is_admin());
    }
}
