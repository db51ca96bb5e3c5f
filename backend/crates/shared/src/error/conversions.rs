//! Error conversions
//!
//! Database error classification, and the HTTP rendering of [`AppError`]
//! as a `{ success: false, message }` envelope.

#[cfg(feature = "axum")]
use super::app_error::AppError;
#[cfg(feature = "sqlx")]
use super::kind::ErrorKind;

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

/// Classify a database error into an [`ErrorKind`] and a client-safe message
///
/// Domain error enums that wrap `sqlx::Error` use this so that store
/// failures map to the same status in every crate.
#[cfg(feature = "sqlx")]
pub fn classify_sqlx_error(err: &sqlx::Error) -> (ErrorKind, &'static str) {
    match err {
        sqlx::Error::RowNotFound => (ErrorKind::NotFound, "Record not found"),
        sqlx::Error::PoolTimedOut => (
            ErrorKind::ServiceUnavailable,
            "Database connection pool exhausted",
        ),
        sqlx::Error::Database(db_err) => {
            // https://www.postgresql.org/docs/current/errcodes-appendix.html
            match db_err.code().as_deref() {
                Some("23505") => (ErrorKind::Conflict, "Duplicate key value"),
                Some("23503") => (ErrorKind::NotFound, "Referenced record does not exist"),
                Some("23502") | Some("23514") => (ErrorKind::Validation, "Constraint violation"),
                Some("40001") | Some("40P01") => {
                    (ErrorKind::Conflict, "Concurrent update, please retry")
                }
                Some("53000" | "53100" | "53200" | "53300") => {
                    (ErrorKind::ServiceUnavailable, "Database resource exhausted")
                }
                Some("57000" | "57014" | "57P01" | "57P02" | "57P03") => {
                    (ErrorKind::ServiceUnavailable, "Database unavailable")
                }
                _ => (ErrorKind::Internal, "Database error"),
            }
        }
        sqlx::Error::Io(_) => (ErrorKind::ServiceUnavailable, "Database connection error"),
        _ => (ErrorKind::Internal, "Database error"),
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = crate::response::ApiResponse::<()>::failure(self.public_message().to_owned());

        (status, Json(body)).into_response()
    }
}
