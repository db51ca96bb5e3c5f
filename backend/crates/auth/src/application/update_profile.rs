//! Update Profile Use Case
//!
//! Changes an account's handle, email, bio or avatar. Omitted fields stay
//! as they are; an empty bio or avatar clears it.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::AccountId;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{email::Email, handle::Handle};
use crate::error::{AuthError, AuthResult};

pub const BIO_MAX_LENGTH: usize = 500;
pub const AVATAR_MAX_LENGTH: usize = 2048;

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub handle: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

/// Trimmed optional text; `Some("")` becomes `None`
fn optional_text(field: &str, value: &str, max: usize) -> AuthResult<Option<String>> {
    let value = value.trim();
    if value.chars().count() > max {
        return Err(AuthError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok((!value.is_empty()).then(|| value.to_string()))
}

pub struct UpdateProfileUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
}

impl<R> UpdateProfileUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        account_id: &AccountId,
        input: UpdateProfileInput,
    ) -> AuthResult<Account> {
        let mut account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if let Some(raw) = input.handle.as_deref() {
            let handle = Handle::new(raw)?;
            if handle.canonical() != account.handle.canonical() {
                if let Some(other) = self.repo.find_by_handle(&handle).await? {
                    if other.account_id != account.account_id {
                        return Err(AuthError::HandleTaken);
                    }
                }
            }
            account.handle = handle;
        }

        if let Some(raw) = input.email.as_deref() {
            let email = Email::new(raw)?;
            if email != account.email {
                if let Some(other) = self.repo.find_by_email(&email).await? {
                    if other.account_id != account.account_id {
                        return Err(AuthError::EmailTaken);
                    }
                }
            }
            account.email = email;
        }

        if let Some(bio) = input.bio.as_deref() {
            account.bio = optional_text("Bio", bio, BIO_MAX_LENGTH)?;
        }
        if let Some(avatar) = input.avatar.as_deref() {
            account.avatar = optional_text("Avatar", avatar, AVATAR_MAX_LENGTH)?;
        }

        account.updated_at = Utc::now();

        // The unique indexes still close the race with a concurrent registration
        if !self.repo.update_profile(&account).await? {
            return Err(AuthError::AccountNotFound);
        }

        tracing::info!(
            account_id = %account.account_id,
            handle = %account.handle,
            "Profile updated"
        );

        Ok(account)
    }
}
