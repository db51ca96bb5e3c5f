//! Request Extractors
//!
//! `axum::Json` / `axum::extract::Query` whose rejections render through
//! [`ForumError`], so a malformed body or query string gets the envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ForumError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ForumError))]
pub struct Json<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ForumError))]
pub struct Query<T>(pub T);
