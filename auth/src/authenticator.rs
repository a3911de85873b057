use serde::Serialize;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SessionClaims;
use crate::password::HashCost;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Holds two hashers: one for regular password sets and a costlier one for
/// passwords chosen through the reset flow.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    reset_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    dummy_hash: String,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `password_cost` - Work factor for regular password hashing
    /// * `reset_cost` - Work factor for passwords set through a reset
    ///
    /// # Errors
    /// * `InvalidCost` - A work factor is rejected by the hashing algorithm
    /// * `HashingFailed` - The decoy hash for unknown accounts could not be built
    pub fn new(
        jwt_secret: &[u8],
        password_cost: HashCost,
        reset_cost: HashCost,
    ) -> Result<Self, PasswordError> {
        let password_hasher = PasswordHasher::with_cost(password_cost)?;
        let reset_hasher = PasswordHasher::with_cost(reset_cost)?;
        let dummy_hash = password_hasher.hash("decoy password for unknown accounts")?;

        Ok(Self {
            password_hasher,
            reset_hasher,
            jwt_handler: JwtHandler::new(jwt_secret),
            dummy_hash,
        })
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Hash a password chosen through the reset flow (higher cost).
    pub fn hash_reset_password(&self, password: &str) -> Result<String, PasswordError> {
        self.reset_hasher.hash(password)
    }

    /// Verify credentials and generate JWT token.
    ///
    /// When `stored_hash` is `None` (no such account) the password is still
    /// checked against a decoy hash of the same cost, and the outcome is the
    /// same `InvalidCredentials` as for a wrong password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown account or password mismatch
    /// * `JwtError` - Token generation failed
    pub fn authenticate<T: Serialize>(
        &self,
        password: &str,
        stored_hash: Option<&str>,
        claims: &T,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = match stored_hash {
            Some(hash) => self.password_hasher.verify(password, hash),
            None => {
                let _ = self.password_hasher.verify(password, &self.dummy_hash);
                false
            }
        };

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.jwt_handler.encode(claims)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Whether a stored hash should be replaced by one at the regular cost.
    /// True for reset-cost hashes, which then verify slower than the decoy.
    pub fn needs_rehash(&self, stored_hash: &str) -> bool {
        self.password_hasher.needs_rehash(stored_hash)
    }

    /// Generate JWT token without password verification.
    pub fn generate_token<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        self.jwt_handler.encode(claims)
    }

    /// Validate and decode a session token.
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its expiry
    /// * `InvalidToken` - Token is malformed or its signature does not match
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
