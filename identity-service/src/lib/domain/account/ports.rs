use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::access::models::AccessDecision;
use crate::domain::access::models::AccessRequest;
use crate::domain::account::errors::AccountError;
use crate::domain::account::errors::ConflictKind;
use crate::domain::account::errors::MailerError;
use crate::domain::account::errors::StorageError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::models::NationalId;
use crate::domain::account::models::Profile;
use crate::domain::account::models::ProfileFields;
use crate::domain::account::models::RegisterAccountCommand;
use crate::domain::account::models::RegisteredAccount;
use crate::domain::account::models::ResetPasswordCommand;
use crate::domain::account::models::Session;
use crate::domain::account::models::SessionPrincipal;
use crate::domain::account::models::UpdateProfileCommand;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// # Arguments
    /// * `command` - Validated registration data
    ///
    /// # Returns
    /// Identifier, normalized email and role of the new account
    ///
    /// # Errors
    /// * `Conflict` - Email or national id already registered (email is checked first)
    /// * `Storage` - Storage operation failed
    /// * `Internal` - Password hashing failed
    async fn register(
        &self,
        command: RegisterAccountCommand,
    ) -> Result<RegisteredAccount, AccountError>;

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, malformed email or wrong password
    /// * `Storage` - Storage operation failed
    async fn login(&self, command: LoginCommand) -> Result<Session, AccountError>;

    /// Retrieve the owner's view of an account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Storage` - Storage operation failed
    async fn get_profile(&self, id: &AccountId) -> Result<Profile, AccountError>;

    /// Apply a partial profile update.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Storage` - Storage operation failed
    async fn update_profile(
        &self,
        id: &AccountId,
        command: UpdateProfileCommand,
    ) -> Result<Profile, AccountError>;

    /// Issue a reset secret and mail it to the account owner.
    ///
    /// Succeeds without side effects when no account has this email.
    ///
    /// # Errors
    /// * `InvalidEmail` - Email is malformed
    /// * `Storage` - Storage operation failed
    async fn request_password_reset(&self, email: &str) -> Result<(), AccountError>;

    /// Redeem a reset secret and set a new password.
    ///
    /// # Errors
    /// * `InvalidOrExpiredResetToken` - Secret unknown, expired or already used
    /// * `Storage` - Storage operation failed
    async fn reset_password(&self, command: ResetPasswordCommand) -> Result<(), AccountError>;

    /// Verify a session token and return the identity it asserts.
    ///
    /// # Errors
    /// * `InvalidSession` - Token is malformed, forged or expired
    async fn verify_session(&self, token: &str) -> Result<SessionPrincipal, AccountError>;

    /// Verify a session token, then evaluate the access policy for its holder.
    ///
    /// # Errors
    /// * `InvalidSession` - Token is malformed, forged or expired
    async fn authorize(
        &self,
        token: &str,
        request: AccessRequest,
    ) -> Result<AccessDecision, AccountError>;
}

/// Persistence operations for the account aggregate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account.
    ///
    /// # Errors
    /// * `UniqueViolation` - Email or national id already stored
    /// * `Backend` - Storage operation failed
    async fn create(&self, account: Account) -> Result<Account, StorageError>;

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, StorageError>;

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, StorageError>;

    async fn find_by_national_id(
        &self,
        national_id: &NationalId,
    ) -> Result<Option<Account>, StorageError>;

    /// Find the account holding reset digest `digest` that is still valid at `now`.
    async fn find_by_reset_token(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StorageError>;

    /// Write the owner-editable columns of an account in one statement.
    /// Credentials and reset state are left untouched.
    ///
    /// # Returns
    /// The updated account, or `None` if it does not exist
    async fn update_profile(
        &self,
        id: &AccountId,
        fields: &ProfileFields,
    ) -> Result<Option<Account>, StorageError>;

    /// Store a reset digest valid until `expires_at`, replacing any earlier one.
    ///
    /// # Returns
    /// `false` if the account does not exist
    async fn store_reset_token(
        &self,
        id: &AccountId,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Set a new password hash and clear the reset fields, atomically and only
    /// if the account still holds `digest` unexpired at `now`.
    ///
    /// # Returns
    /// `true` if the update was applied
    async fn complete_password_reset(
        &self,
        id: &AccountId,
        digest: &str,
        now: DateTime<Utc>,
        password_hash: String,
    ) -> Result<bool, StorageError>;

    /// Swap the password hash only if it still equals `current_hash`.
    ///
    /// # Returns
    /// `true` if the update was applied
    async fn replace_password_hash(
        &self,
        id: &AccountId,
        current_hash: &str,
        new_hash: String,
    ) -> Result<bool, StorageError>;

    /// Map a storage failure onto the unique attribute it collided on, if any.
    fn conflict_kind(&self, error: &StorageError) -> Option<ConflictKind>;
}

/// Outbound delivery of reset links.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// # Errors
    /// * `DeliveryFailed` - The message could not be handed over for delivery
    async fn send_password_reset_link(
        &self,
        email: &EmailAddress,
        link: &str,
    ) -> Result<(), MailerError>;
}

/// Source of the current instant.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
