//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod current_account;
pub mod register;
pub mod sign_in;
pub mod update_profile;

// Re-exports
pub use authenticate::AuthenticateUseCase;
pub use config::AuthConfig;
pub use current_account::CurrentAccountUseCase;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use sign_in::{IssuedToken, SignInInput, SignInOutput, SignInUseCase};
pub use update_profile::{UpdateProfileInput, UpdateProfileUseCase};
