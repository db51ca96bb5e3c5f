//! Sign In Use Case
//!
//! Authenticates a user by handle or email and issues a bearer token.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{email::Email, handle::Handle};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    /// Handle or email
    pub identifier: String,
    pub password: String,
}

/// Signed bearer token handed to the client
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub account: Account,
    pub token: IssuedToken,
}

/// Issue a bearer token for `account`
pub(crate) fn issue_token(config: &AuthConfig, account: &Account) -> AuthResult<IssuedToken> {
    let (token, claims) = config
        .token_signer()
        .issue(account.account_id.into_uuid())?;
    let expires_at = DateTime::from_timestamp(claims.exp, 0)
        .ok_or_else(|| AuthError::Internal("Token expiry out of range".to_string()))?;
    Ok(IssuedToken { token, expires_at })
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> SignInUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let identifier = input.identifier.trim();

        // 入力形式の誤りも「資格情報が無効」として扱う（アカウントの存在を漏らさない）
        let account = if identifier.contains('@') {
            let email = Email::new(identifier).map_err(|_| AuthError::InvalidCredentials)?;
            self.repo.find_by_email(&email).await?
        } else {
            let handle = Handle::new(identifier).map_err(|_| AuthError::InvalidCredentials)?;
            self.repo.find_by_handle(&handle).await?
        };

        let account = account.ok_or(AuthError::InvalidCredentials)?;

        let password = ClearTextPassword::for_verification(input.password);
        let hash = account.password_hash.clone();
        let pepper = self.config.password_pepper.clone();

        // Argon2 is CPU-bound; keep it off the async workers
        let valid =
            tokio::task::spawn_blocking(move || hash.verify(&password, pepper.as_deref()))
                .await
                .map_err(|e| AuthError::Internal(format!("Password verification task failed: {e}")))?;

        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        // BAN 中でもサインインは可能。保護されたルートで Guard が拒否する
        let token = issue_token(&self.config, &account)?;

        tracing::info!(
            account_id = %account.account_id,
            handle = %account.handle,
            "Account signed in"
        );

        Ok(SignInOutput { account, token })
    }
}
