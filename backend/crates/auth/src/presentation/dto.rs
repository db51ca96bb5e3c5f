//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{IssuedToken, UpdateProfileInput};
use crate::domain::entity::account::Account;

// ============================================================================
// Register
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(alias = "handle")]
    pub username: String,
    pub email: String,
    pub password: String,
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Handle or email
    #[serde(alias = "email", alias = "username")]
    pub identifier: String,
    pub password: String,
}

// ============================================================================
// Profile
// ============================================================================

/// Omitted fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetailsRequest {
    #[serde(alias = "handle")]
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl From<UpdateDetailsRequest> for UpdateProfileInput {
    fn from(req: UpdateDetailsRequest) -> Self {
        Self {
            handle: req.username,
            email: req.email,
            bio: req.bio,
            avatar: req.avatar,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Account as seen by its owner or an administrator
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_banned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_expires_at: Option<DateTime<Utc>>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.account_id.into_uuid(),
            username: account.handle.original().to_string(),
            email: account.email.as_str().to_string(),
            role: account.role.code().to_string(),
            is_banned: account.ban.is_banned(),
            ban_reason: account.ban.reason().map(str::to_owned),
            ban_expires_at: account.ban.expires_at(),
            bio: account.bio.clone(),
            avatar: account.avatar.clone(),
            created_at: account.created_at,
        }
    }
}

/// Register / login response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AccountResponse,
}

impl AuthResponse {
    pub fn new(token: IssuedToken, account: &Account) -> Self {
        Self {
            token: token.token,
            expires_at: token.expires_at,
            user: AccountResponse::from(account),
        }
    }
}
