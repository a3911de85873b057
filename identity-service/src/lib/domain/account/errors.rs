use std::fmt;

use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for DisplayName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("Name too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for NationalId validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NationalIdError {
    #[error("National id must look like 12.345.678-9")]
    InvalidFormat,

    #[error("National id check digit does not match")]
    InvalidCheckDigit,
}

/// Error for password policy violations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters")]
    TooShort { min: usize },

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one digit")]
    MissingDigit,
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role '{0}': expected one of patient, doctor, nurse, guardian")]
    Unknown(String),
}

/// Which unique attribute a registration collided on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Email,
    NationalId,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::Email => f.write_str("email"),
            ConflictKind::NationalId => f.write_str("national id"),
        }
    }
}

/// Error raised by account storage adapters
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Stored account is corrupt: {0}")]
    Corrupt(String),

    #[error("Storage failure: {0}")]
    Backend(String),
}

/// Error for mail delivery
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    #[error("Failed to deliver mail: {0}")]
    DeliveryFailed(String),
}

/// Top-level error for all account-related operations
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid account ID: {0}")]
    InvalidAccountId(#[from] AccountIdError),

    #[error("Invalid name: {0}")]
    InvalidName(#[from] DisplayNameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid national id: {0}")]
    InvalidNationalId(#[from] NationalIdError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    // Domain-level errors
    #[error("An account with this {0} is already registered")]
    Conflict(ConflictKind),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired session")]
    InvalidSession,

    #[error("Invalid or expired reset token")]
    InvalidOrExpiredResetToken,

    #[error("Account not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}
