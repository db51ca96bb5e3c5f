//! In-Memory Repository Implementation
//!
//! Process-local store used when no database is configured, and by tests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use kernel::pagination::{PageRequest, Paginated};
use tokio::sync::RwLock;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{ban_state::BanState, email::Email, handle::Handle};
use crate::error::{AuthError, AuthResult};

#[derive(Clone, Default)]
pub struct MemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an account wholesale (seeding and tests)
    pub async fn put(&self, account: Account) {
        self.accounts
            .write()
            .await
            .insert(account.account_id, account);
    }
}

impl AccountRepository for MemoryAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let mut accounts = self.accounts.write().await;

        if accounts
            .values()
            .any(|a| a.handle.canonical() == account.handle.canonical())
        {
            return Err(AuthError::HandleTaken);
        }
        if accounts.values().any(|a| a.email == account.email) {
            return Err(AuthError::EmailTaken);
        }

        accounts.insert(account.account_id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self.accounts.read().await.get(account_id).cloned())
    }

    async fn find_by_ids(&self, account_ids: &[AccountId]) -> AuthResult<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(account_ids
            .iter()
            .filter_map(|id| accounts.get(id).cloned())
            .collect())
    }

    async fn find_by_handle(&self, handle: &Handle) -> AuthResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.handle.canonical() == handle.canonical())
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| &a.email == email)
            .cloned())
    }

    async fn update_profile(&self, account: &Account) -> AuthResult<bool> {
        let mut accounts = self.accounts.write().await;

        let others = || accounts.values().filter(|a| a.account_id != account.account_id);
        if others().any(|a| a.handle.canonical() == account.handle.canonical()) {
            return Err(AuthError::HandleTaken);
        }
        if others().any(|a| a.email == account.email) {
            return Err(AuthError::EmailTaken);
        }

        match accounts.get_mut(&account.account_id) {
            Some(stored) => {
                stored.handle = account.handle.clone();
                stored.email = account.email.clone();
                stored.bio = account.bio.clone();
                stored.avatar = account.avatar.clone();
                stored.updated_at = account.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_ban(&self, account_id: &AccountId, ban: &BanState) -> AuthResult<bool> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(account_id) {
            Some(account) => {
                account.set_ban(ban.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn lift_expired_ban(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts
            .get_mut(account_id)
            .is_some_and(|account| account.lift_expired_ban(now)))
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> AuthResult<Paginated<Account>> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let accounts = self.accounts.read().await;
        let mut matched: Vec<&Account> = accounts
            .values()
            .filter(|a| match &needle {
                Some(n) => a.handle.canonical().contains(n.as_str()) || a.email.as_str().contains(n.as_str()),
                None => true,
            })
            .collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.account_id.cmp(&b.account_id))
        });

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok(Paginated::new(items, total, page))
    }
}
