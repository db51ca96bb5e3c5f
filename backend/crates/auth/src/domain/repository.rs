//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use kernel::pagination::{PageRequest, Paginated};

use crate::domain::entity::account::Account;
use crate::domain::value_object::{ban_state::BanState, email::Email, handle::Handle};
use crate::error::AuthResult;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert a new account
    ///
    /// Fails with `HandleTaken` / `EmailTaken` when either is already in use.
    async fn create(&self, account: &Account) -> AuthResult<()>;

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// Unknown ids are skipped; order follows `account_ids`
    async fn find_by_ids(&self, account_ids: &[AccountId]) -> AuthResult<Vec<Account>>;

    /// Case-insensitive lookup
    async fn find_by_handle(&self, handle: &Handle) -> AuthResult<Option<Account>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    /// Write handle, email, bio, avatar and `updated_at`
    ///
    /// Returns `false` when the account does not exist; fails with
    /// `HandleTaken` / `EmailTaken` on a unique conflict.
    async fn update_profile(&self, account: &Account) -> AuthResult<bool>;

    /// Replace the ban state. Returns `false` when the account does not exist.
    async fn update_ban(&self, account_id: &AccountId, ban: &BanState) -> AuthResult<bool>;

    /// Clear the ban only if it is still banned with an expiry at or before `now`
    async fn lift_expired_ban(&self, account_id: &AccountId, now: DateTime<Utc>)
    -> AuthResult<bool>;

    /// Newest first, optionally filtered by a case-insensitive substring of handle or email
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> AuthResult<Paginated<Account>>;
}
