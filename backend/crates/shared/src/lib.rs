//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of forum vocabulary:
//! - Common error types and result aliases
//! - Typed entity identifiers (accounts, posts, comments, ...)
//! - The `{ success, data, message }` response envelope
//! - Page/limit pagination primitives
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod pagination;
pub mod response;
