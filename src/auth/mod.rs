//! Credentials and bearer tokens.
//!
//! Passwords are stored as argon2 PHC strings; tokens are HMAC-SHA256 signed
//! claims carrying the subject email and an expiry.

mod error;
mod password;
mod token;

pub use error::AuthError;
pub(crate) use password::decoy_hash;
pub use password::{hash_password, verify_password, PasswordHash};
pub use token::{Claims, TokenIssuer};
