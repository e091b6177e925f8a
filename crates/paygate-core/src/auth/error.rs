use thiserror::Error;

/// Reasons an authorization request is denied.
///
/// The `Display` strings are returned to the gateway verbatim as the deny
/// message, so they carry no cryptographic detail.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization Token")]
    MissingToken,

    #[error("secret not configured")]
    MissingSecret,

    /// Bad signature, bad structure, disallowed algorithm or header, a
    /// missing `sub`/`exp` claim, or an `iat`/`nbf` still in the future.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid scope")]
    InvalidScope,
}

impl AuthError {
    /// Stable machine-readable code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::MissingSecret => "missing_secret",
            Self::InvalidToken => "invalid_token",
            Self::ExpiredToken => "expired_token",
            Self::InvalidScope => "invalid_scope",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        }
    }
}
