//! Register Use Case
//!
//! Creates a new account and signs it in.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::sign_in::{IssuedToken, issue_token};
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{email::Email, handle::Handle};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub handle: String,
    pub email: String,
    pub password: String,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub account: Account,
    pub token: IssuedToken,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> RegisterUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let handle = Handle::new(&input.handle)?;
        let email = Email::new(&input.email)?;
        let password = ClearTextPassword::new(input.password)?;

        if self.repo.find_by_handle(&handle).await?.is_some() {
            return Err(AuthError::HandleTaken);
        }
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let pepper = self.config.password_pepper.clone();
        let password_hash = tokio::task::spawn_blocking(move || password.hash(pepper.as_deref()))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let account = Account::new(handle, email, password_hash);

        // The unique indexes still close the race between the checks above and this insert
        self.repo.create(&account).await?;

        let token = issue_token(&self.config, &account)?;

        tracing::info!(
            account_id = %account.account_id,
            handle = %account.handle,
            "Account registered"
        );

        Ok(RegisterOutput { account, token })
    }
}
