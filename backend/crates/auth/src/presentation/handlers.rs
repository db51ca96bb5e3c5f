//! HTTP Handlers

use axum::extract::{Extension, State};
use kernel::response::ApiResponse;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    CurrentAccountUseCase, RegisterInput, RegisterUseCase, SignInInput, SignInUseCase,
    UpdateProfileUseCase,
};
use crate::domain::entity::account::Principal;
use crate::domain::repository::AccountRepository;
use crate::error::AuthResult;
use crate::presentation::dto::{
    AccountResponse, AuthResponse, LoginRequest, RegisterRequest, UpdateDetailsRequest,
};
use crate::presentation::extract::Json;

/// Shared state for auth handlers and the guard middleware
pub struct AuthAppState<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> AuthAppState<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }
}

// derive(Clone) would require `R: Clone`
impl<R> Clone for AuthAppState<R>
where
    R: AccountRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<ApiResponse<AuthResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(RegisterInput {
            handle: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(ApiResponse::created(AuthResponse::new(
        output.token,
        &output.account,
    )))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<ApiResponse<AuthResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(SignInInput {
            identifier: req.identifier,
            password: req.password,
        })
        .await?;

    Ok(ApiResponse::ok(AuthResponse::new(
        output.token,
        &output.account,
    )))
}

// ============================================================================
// Me
// ============================================================================

/// GET /api/auth/me
pub async fn me<R>(
    State(state): State<AuthAppState<R>>,
    Extension(principal): Extension<Principal>,
) -> AuthResult<ApiResponse<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let account = CurrentAccountUseCase::new(state.repo.clone())
        .execute(&principal.account_id)
        .await?;

    Ok(ApiResponse::ok(AccountResponse::from(&account)))
}

/// PUT /api/auth/updatedetails
pub async fn update_details<R>(
    State(state): State<AuthAppState<R>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateDetailsRequest>,
) -> AuthResult<ApiResponse<AccountResponse>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let account = UpdateProfileUseCase::new(state.repo.clone())
        .execute(&principal.account_id, req.into())
        .await?;

    Ok(ApiResponse::ok(AccountResponse::from(&account)))
}
