use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use auth::ResetSecret;
use auth::SecretSource;

/// Freshly issued reset secret together with what gets persisted for it.
#[derive(Debug)]
pub struct IssuedResetToken {
    /// Delivered to the owner, never stored
    pub secret: ResetSecret,
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues password-reset secrets.
pub struct ResetTokenIssuer {
    ttl: Duration,
}

impl ResetTokenIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Draw a fresh secret valid until `now + ttl`.
    pub fn issue(&self, source: &dyn SecretSource, now: DateTime<Utc>) -> IssuedResetToken {
        let secret = ResetSecret::generate(source);
        IssuedResetToken {
            digest: secret.digest(),
            expires_at: now + self.ttl,
            secret,
        }
    }
}

/// Build the link mailed to the account owner.
pub fn reset_link(base_url: &str, secret: &ResetSecret) -> String {
    format!(
        "{}/reset-password?token={}",
        base_url.trim_end_matches('/'),
        secret.expose()
    )
}

#[cfg(test)]
mod tests {
    use auth::OsSecretSource;

    use super::*;

    #[test]
    fn test_issue_digest_and_expiry() {
        let issuer = ResetTokenIssuer::new(Duration::minutes(15));
        let now = Utc::now();

        let issued = issuer.issue(&OsSecretSource, now);

        assert_eq!(issued.digest, auth::reset::digest(issued.secret.expose()));
        assert_ne!(issued.digest, issued.secret.expose());
        assert_eq!(issued.expires_at, now + Duration::minutes(15));
    }

    #[test]
    fn test_each_issue_draws_a_new_secret() {
        let issuer = ResetTokenIssuer::new(Duration::minutes(15));
        let now = Utc::now();

        let first = issuer.issue(&OsSecretSource, now);
        let second = issuer.issue(&OsSecretSource, now);

        assert_ne!(first.secret, second.secret);
        assert_ne!(first.digest, second.digest);
    }

    #[test]
    fn test_reset_link() {
        let secret = ResetSecret::from_raw("abc123");
        assert_eq!(
            reset_link("https://app.example.cl/", &secret),
            "https://app.example.cl/reset-password?token=abc123"
        );
    }
}
