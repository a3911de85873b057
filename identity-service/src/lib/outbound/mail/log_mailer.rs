use async_trait::async_trait;

use crate::domain::account::errors::MailerError;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::ports::Mailer;

/// Development mailer that writes each message to the tracing log instead of
/// delivering it.
///
/// The reset link appears in the log. Do not use outside local environments.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset_link(
        &self,
        email: &EmailAddress,
        link: &str,
    ) -> Result<(), MailerError> {
        tracing::info!(
            to = %email,
            subject = "Reset your password",
            link,
            "Password reset mail (not delivered)"
        );
        Ok(())
    }
}
