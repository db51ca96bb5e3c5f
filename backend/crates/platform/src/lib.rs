//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, NIST SP 800-63B length rules)
//! - Signed bearer tokens (HS256)
//! - `Authorization: Bearer` header parsing
//! - Fixed-window rate limiting

pub mod bearer;
pub mod password;
pub mod rate_limit;
pub mod token;
