// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
//! Secure generation of replacement passwords.
//!
//! Password reset does not issue a separate one-shot token: the generated
//! value *becomes* the account password and is mailed to the user.
use rand::{rngs::OsRng, RngCore};

/// Entropy bytes behind a generated password (4 bytes = 8 hex characters)
const RESET_PASSWORD_BYTES: usize = 4;

/// Generate a replacement password from OS entropy.
///
/// Returns 8 lowercase hex characters, matching what future logins must
/// present.
pub fn generate_reset_password() -> String {
    let mut buffer = [0u8; RESET_PASSWORD_BYTES];
    OsRng.fill_bytes(&mut buffer);
    hex::encode(buffer)
}
