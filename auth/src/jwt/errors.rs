use thiserror::Error;

/// Error type for JWT operations.
///
/// Verification failures are coarse: a token is either expired or invalid.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid")]
    InvalidToken,
}
