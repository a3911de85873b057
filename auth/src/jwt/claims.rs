use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by a session token.
///
/// `role` is kept as its wire string; services map it onto their own role type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (account identifier)
    pub sub: String,

    pub email: String,

    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Build claims issued at `issued_at` and valid for `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Unique account identifier
    /// * `email` - Account email
    /// * `role` - Role name
    /// * `issued_at` - Issue instant (from the caller's clock)
    /// * `ttl` - Token lifetime
    pub fn issue(
        subject: impl ToString,
        email: impl Into<String>,
        role: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            email: email.into(),
            role: role.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}
