//! Authenticate Use Case
//!
//! Resolves a bearer token to exactly one usable account, or fails.
//! Runs on every protected request via the guard middleware.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::AccountId;

use crate::application::config::AuthConfig;
use crate::domain::entity::account::{Account, Principal};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::ban_state::BanState;
use crate::error::{AuthError, AuthResult};

pub struct AuthenticateUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> AuthenticateUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Verify `token` and return the principal
    ///
    /// - signature/expiry failures: `InvalidToken` / `TokenExpired`
    /// - unknown account: `AccountNotFound`
    /// - banned account: `Banned` (expired bans are lifted first)
    pub async fn execute(&self, token: &str) -> AuthResult<Principal> {
        let claims = self.config.token_signer().verify(token)?;
        let account_id = AccountId::from_uuid(claims.sub);

        let account = self.load(&account_id).await?;
        let account = self.lift_expired_ban(account).await?;

        if account.ban.is_banned() {
            return Err(account.ban.into());
        }

        Ok(account.principal())
    }

    async fn load(&self, account_id: &AccountId) -> AuthResult<Account> {
        self.repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    async fn lift_expired_ban(&self, mut account: Account) -> AuthResult<Account> {
        let now = Utc::now();
        if !(account.ban.is_banned() && account.ban.has_expired(now)) {
            return Ok(account);
        }

        if self
            .repo
            .lift_expired_ban(&account.account_id, now)
            .await?
        {
            tracing::info!(account_id = %account.account_id, "Expired ban lifted");
            account.ban = BanState::Active;
            Ok(account)
        } else {
            // 他のリクエストで BAN が更新された。最新の状態を読み直す
            self.load(&account.account_id).await
        }
    }
}
