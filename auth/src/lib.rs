//! Authentication utilities library
//!
//! Provides reusable credential infrastructure for the identity service:
//! - National identifier checksum (Chilean RUT)
//! - Password hashing (Argon2id)
//! - Session token generation and validation (JWT)
//! - Password-reset secrets
//! - Authentication coordination
//!
//! Nothing here performs I/O; storage and delivery live in the service.
//!
//! # Examples
//!
//! ## National identifiers
//! ```
//! assert!(auth::rut::validate("12.345.678-5"));
//! assert_eq!(auth::rut::format("123456785"), "12.345.678-5");
//! ```
//!
//! ## Password Hashing
//! ```
//! use auth::{HashCost, PasswordHasher};
//!
//! let hasher = PasswordHasher::with_cost(HashCost::new(1, 1024)).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, HashCost, SessionClaims};
//! use chrono::{Duration, Utc};
//!
//! let cost = HashCost::new(1, 1024);
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", cost, cost).unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let claims = SessionClaims::issue("user123", "ana@x.cl", "patient", Utc::now(), Duration::hours(24));
//! let result = auth.authenticate("password123", Some(&hash), &claims).unwrap();
//!
//! // Validate token
//! let decoded = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(decoded.sub, "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod reset;
pub mod rut;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SessionClaims;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use reset::OsSecretSource;
pub use reset::ResetSecret;
pub use reset::SecretSource;
