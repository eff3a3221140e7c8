//! Authentication error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown email. The two cases are deliberately merged.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing bearer token")]
    MissingToken,

    /// Malformed token or bad signature.
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    /// Token was valid but its subject no longer resolves to a user.
    #[error("could not validate credentials")]
    UnknownSubject,

    #[error("password hashing error")]
    PasswordHash,

    #[error("invalid token signing key")]
    SigningKey,

    /// `iat + ttl` does not fit in a timestamp.
    #[error("token expiry out of range")]
    ExpiryOutOfRange,
}
