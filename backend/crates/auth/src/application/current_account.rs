//! Current Account Use Case

use std::sync::Arc;

use kernel::id::AccountId;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};

pub struct CurrentAccountUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
}

impl<R> CurrentAccountUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, account_id: &AccountId) -> AuthResult<Account> {
        self.repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }
}
