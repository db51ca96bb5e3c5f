//! Request Extractors
//!
//! `axum::Json` whose rejection renders through [`AuthError`], so malformed
//! bodies get the `{ success: false, message }` envelope.

use axum::extract::FromRequest;

use crate::error::AuthError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AuthError))]
pub struct Json<T>(pub T);
