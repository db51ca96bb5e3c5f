//! Value Object Module

pub mod account_role;
pub mod ban_state;
pub mod email;
pub mod handle;
