// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod session;
pub mod token_generator;

pub use password::{hash_password, hash_password_secure, verify_password};
pub use session::{Session, SessionManager, SESSION_COOKIE};
pub use token_generator::generate_reset_password;
