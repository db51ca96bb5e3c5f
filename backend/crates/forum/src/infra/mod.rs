//! Infrastructure Layer
//!
//! Database implementations of the forum repositories.

pub mod memory;
pub mod postgres;

pub use memory::MemoryForumRepository;
pub use postgres::PgForumRepository;
