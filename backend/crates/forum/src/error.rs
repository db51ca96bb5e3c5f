//! Forum Error Types
//!
//! Forum-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use auth::AuthError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use kernel::error::conversions::classify_sqlx_error;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::post::ContentError;
use crate::domain::relationship::RelationshipError;

/// Forum-specific result type alias
pub type ForumResult<T> = Result<T, ForumError>;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error("You are already following this user")]
    AlreadyFollowing,

    #[error("You are not following this user")]
    NotFollowing,

    #[error("User not found")]
    AccountNotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    /// Changing someone else's post, comment or profile
    #[error("Not authorized to {action} this {target}")]
    NotOwner {
        action: &'static str,
        target: &'static str,
    },

    #[error("Not authorized as an admin")]
    AdminRequired,

    #[error("You cannot ban yourself")]
    SelfBan,

    #[error("{0}")]
    Validation(String),

    /// Failure from the account store
    #[error(transparent)]
    Account(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ForumError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForumError::SelfFollow | ForumError::SelfBan | ForumError::Validation(_) => {
                ErrorKind::Validation
            }
            ForumError::AlreadyFollowing | ForumError::NotFollowing => ErrorKind::Conflict,
            ForumError::AccountNotFound
            | ForumError::PostNotFound
            | ForumError::CommentNotFound => ErrorKind::NotFound,
            ForumError::NotOwner { .. } | ForumError::AdminRequired => ErrorKind::Forbidden,
            ForumError::Account(e) => e.kind(),
            ForumError::Database(e) => classify_sqlx_error(e).0,
            ForumError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            ForumError::Account(e) => e.into_app_error(),
            ForumError::Database(e) => {
                let (kind, message) = classify_sqlx_error(&e);
                AppError::new(kind, message).with_source(e)
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ForumError::Database(e) => {
                tracing::error!(error = %e, "Forum database error");
            }
            ForumError::Internal(msg) => {
                tracing::error!(message = %msg, "Forum internal error");
            }
            ForumError::Account(e) if e.kind().is_server_error() => {
                tracing::error!(error = %e, "Account store error");
            }
            ForumError::AdminRequired | ForumError::NotOwner { .. } => {
                tracing::warn!(error = %self, "Forbidden forum operation");
            }
            _ => {
                tracing::debug!(error = %self, "Forum error");
            }
        }
    }
}

impl IntoResponse for ForumError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<RelationshipError> for ForumError {
    fn from(err: RelationshipError) -> Self {
        match err {
            RelationshipError::SelfFollow => ForumError::SelfFollow,
            RelationshipError::AlreadyFollowing => ForumError::AlreadyFollowing,
            RelationshipError::NotFollowing => ForumError::NotFollowing,
        }
    }
}

impl From<ContentError> for ForumError {
    fn from(err: ContentError) -> Self {
        ForumError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ForumError {
    fn from(rejection: JsonRejection) -> Self {
        ForumError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ForumError {
    fn from(rejection: QueryRejection) -> Self {
        ForumError::Validation(rejection.body_text())
    }
}

impl From<uuid::Error> for ForumError {
    fn from(_: uuid::Error) -> Self {
        ForumError::Validation("Invalid identifier format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ForumError::SelfFollow.status_code(), 400);
        assert_eq!(ForumError::AlreadyFollowing.status_code(), 409);
        assert_eq!(ForumError::NotFollowing.status_code(), 409);
        assert_eq!(ForumError::PostNotFound.status_code(), 404);
        assert_eq!(ForumError::AdminRequired.status_code(), 403);
        let not_owner = ForumError::NotOwner {
            action: "delete",
            target: "post",
        };
        assert_eq!(not_owner.status_code(), 403);
        assert_eq!(ForumError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_account_errors_keep_their_status() {
        let err = ForumError::from(AuthError::MissingCredential);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.into_app_error().message(), "Not authorized, no token");
    }

    #[test]
    fn test_relationship_error_mapping() {
        assert!(matches!(
            ForumError::from(RelationshipError::AlreadyFollowing),
            ForumError::AlreadyFollowing
        ));
    }

    #[test]
    fn test_not_owner_message() {
        let err = ForumError::NotOwner {
            action: "update",
            target: "profile",
        };
        assert_eq!(err.to_string(), "Not authorized to update this profile");
    }
}
