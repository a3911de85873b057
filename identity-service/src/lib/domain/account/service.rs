use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::OsSecretSource;
use auth::SecretSource;
use auth::SessionClaims;
use chrono::Duration;

use crate::domain::access::models::AccessDecision;
use crate::domain::access::models::AccessRequest;
use crate::domain::access::policy::AccessPolicy;
use crate::domain::account::errors::AccountError;
use crate::domain::account::errors::ConflictKind;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::models::Profile;
use crate::domain::account::models::RegisterAccountCommand;
use crate::domain::account::models::RegisteredAccount;
use crate::domain::account::models::ResetPasswordCommand;
use crate::domain::account::models::Role;
use crate::domain::account::models::Session;
use crate::domain::account::models::SessionPrincipal;
use crate::domain::account::models::UpdateProfileCommand;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::ports::Clock;
use crate::domain::account::ports::Mailer;
use crate::domain::account::ports::SystemClock;
use crate::domain::account::reset::reset_link;
use crate::domain::account::reset::ResetTokenIssuer;

/// Lifetimes and links used by the account service.
#[derive(Debug, Clone)]
pub struct AccountServiceSettings {
    pub session_ttl: Duration,
    pub reset_ttl: Duration,
    /// Base URL of the client application, without trailing path
    pub reset_link_base_url: String,
}

#[derive(Debug, Clone, Copy)]
enum HashPurpose {
    Standard,
    Reset,
}

/// Domain service implementation for account operations.
///
/// Concrete implementation of AccountServicePort with dependency injection.
pub struct AccountService<AR, M>
where
    AR: AccountRepository,
    M: Mailer,
{
    repository: Arc<AR>,
    mailer: Arc<M>,
    authenticator: Arc<Authenticator>,
    policy: Arc<AccessPolicy>,
    clock: Arc<dyn Clock>,
    secrets: Arc<dyn SecretSource>,
    reset_issuer: ResetTokenIssuer,
    session_ttl: Duration,
    reset_link_base_url: String,
}

impl<AR, M> AccountService<AR, M>
where
    AR: AccountRepository,
    M: Mailer,
{
    /// Create a new account service with injected dependencies.
    ///
    /// Uses the system clock and the OS random source; see
    /// [`with_clock`](Self::with_clock) and
    /// [`with_secret_source`](Self::with_secret_source).
    pub fn new(
        repository: Arc<AR>,
        mailer: Arc<M>,
        authenticator: Arc<Authenticator>,
        policy: Arc<AccessPolicy>,
        settings: AccountServiceSettings,
    ) -> Self {
        Self {
            repository,
            mailer,
            authenticator,
            policy,
            clock: Arc::new(SystemClock),
            secrets: Arc::new(OsSecretSource),
            reset_issuer: ResetTokenIssuer::new(settings.reset_ttl),
            session_ttl: settings.session_ttl,
            reset_link_base_url: settings.reset_link_base_url,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_secret_source(mut self, secrets: Arc<dyn SecretSource>) -> Self {
        self.secrets = secrets;
        self
    }

    /// Hash off the async runtime; Argon2 is deliberately slow.
    async fn hash_password(
        &self,
        password: String,
        purpose: HashPurpose,
    ) -> Result<String, AccountError> {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || match purpose {
            HashPurpose::Standard => authenticator.hash_password(&password),
            HashPurpose::Reset => authenticator.hash_reset_password(&password),
        })
        .await
        .map_err(|e| AccountError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| AccountError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Move a stored hash to the regular cost. Failures only cost the
    /// upgrade, never the login.
    async fn rehash_password(&self, account: &Account, password: String) {
        let new_hash = match self.hash_password(password, HashPurpose::Standard).await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(account_id = %account.id, error = %e, "Password rehash failed");
                return;
            }
        };

        match self
            .repository
            .replace_password_hash(&account.id, &account.password_hash, new_hash)
            .await
        {
            Ok(true) => tracing::debug!(account_id = %account.id, "Password hash moved to regular cost"),
            Ok(false) => tracing::debug!(account_id = %account.id, "Password changed concurrently, rehash skipped"),
            Err(e) => tracing::warn!(account_id = %account.id, error = %e, "Password rehash failed"),
        }
    }

    async fn find_account(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<AR, M> AccountServicePort for AccountService<AR, M>
where
    AR: AccountRepository,
    M: Mailer,
{
    async fn register(
        &self,
        command: RegisterAccountCommand,
    ) -> Result<RegisteredAccount, AccountError> {
        if self.repository.find_by_email(&command.email).await?.is_some() {
            tracing::info!(email = %command.email, "Registration rejected: email already registered");
            return Err(AccountError::Conflict(ConflictKind::Email));
        }

        if self
            .repository
            .find_by_national_id(&command.national_id)
            .await?
            .is_some()
        {
            tracing::info!(email = %command.email, "Registration rejected: national id already registered");
            return Err(AccountError::Conflict(ConflictKind::NationalId));
        }

        let password_hash = self
            .hash_password(command.password.expose().to_string(), HashPurpose::Standard)
            .await?;

        let account = Account {
            id: AccountId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            national_id: command.national_id,
            role: command.role,
            department: None,
            license: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            search_history: None,
            assigned_patients: None,
            patient_ids: None,
            created_at: self.clock.now(),
        };

        let created = match self.repository.create(account).await {
            Ok(created) => created,
            Err(e) => {
                return Err(match self.repository.conflict_kind(&e) {
                    Some(kind) => {
                        tracing::info!(conflict = %kind, "Registration lost a uniqueness race");
                        AccountError::Conflict(kind)
                    }
                    None => AccountError::Storage(e),
                });
            }
        };

        tracing::info!(account_id = %created.id, role = %created.role, "Account registered");

        Ok(RegisteredAccount {
            id: created.id,
            email: created.email,
            role: created.role,
        })
    }

    async fn login(&self, command: LoginCommand) -> Result<Session, AccountError> {
        let account = match EmailAddress::new(command.email) {
            Ok(email) => self.repository.find_by_email(&email).await?,
            Err(_) => None,
        };

        let now = self.clock.now();
        let claims = match &account {
            Some(account) => SessionClaims::issue(
                account.id,
                account.email.as_str(),
                account.role.as_str(),
                now,
                self.session_ttl,
            ),
            None => SessionClaims::issue("", "", "", now, self.session_ttl),
        };
        let stored_hash = account.as_ref().map(|a| a.password_hash.clone());

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, stored_hash.as_deref(), &claims)
        })
        .await
        .map_err(|e| AccountError::Internal(format!("Verification task failed: {}", e)))?;

        match (outcome, account) {
            (Ok(result), Some(account)) => {
                tracing::info!(account_id = %account.id, "Login succeeded");
                if self.authenticator.needs_rehash(&account.password_hash) {
                    self.rehash_password(&account, command.password).await;
                }
                Ok(Session {
                    token: result.access_token,
                    role: account.role,
                })
            }
            (Err(AuthenticationError::JwtError(e)), _) => {
                tracing::error!(error = %e, "Failed to issue session token");
                Err(AccountError::Internal("Failed to issue session token".to_string()))
            }
            _ => {
                tracing::info!("Login failed");
                Err(AccountError::InvalidCredentials)
            }
        }
    }

    async fn get_profile(&self, id: &AccountId) -> Result<Profile, AccountError> {
        self.find_account(id).await.map(Profile::from)
    }

    async fn update_profile(
        &self,
        id: &AccountId,
        command: UpdateProfileCommand,
    ) -> Result<Profile, AccountError> {
        let fields = command.merge_onto(&self.find_account(id).await?);

        let updated = self
            .repository
            .update_profile(id, &fields)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))?;
        tracing::debug!(account_id = %updated.id, "Profile updated");

        Ok(Profile::from(updated))
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AccountError> {
        let email = EmailAddress::new(email.to_string())?;

        let Some(account) = self.repository.find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let issued = self
            .reset_issuer
            .issue(self.secrets.as_ref(), self.clock.now());
        let stored = self
            .repository
            .store_reset_token(&account.id, &issued.digest, issued.expires_at)
            .await?;
        if !stored {
            tracing::warn!(account_id = %account.id, "Account vanished before the reset token was stored");
            return Ok(());
        }
        tracing::info!(account_id = %account.id, "Password reset token issued");

        let link = reset_link(&self.reset_link_base_url, &issued.secret);
        if let Err(e) = self
            .mailer
            .send_password_reset_link(&account.email, &link)
            .await
        {
            tracing::error!(account_id = %account.id, error = %e, "Failed to deliver password reset link");
        }

        Ok(())
    }

    async fn reset_password(&self, command: ResetPasswordCommand) -> Result<(), AccountError> {
        let digest = command.secret.digest();

        let account = self
            .repository
            .find_by_reset_token(&digest, self.clock.now())
            .await?
            .ok_or(AccountError::InvalidOrExpiredResetToken)?;

        let password_hash = self
            .hash_password(
                command.new_password.expose().to_string(),
                HashPurpose::Reset,
            )
            .await?;

        let applied = self
            .repository
            .complete_password_reset(&account.id, &digest, self.clock.now(), password_hash)
            .await?;

        if !applied {
            tracing::info!(account_id = %account.id, "Reset token was redeemed concurrently");
            return Err(AccountError::InvalidOrExpiredResetToken);
        }

        tracing::info!(account_id = %account.id, "Password reset completed");
        Ok(())
    }

    async fn verify_session(&self, token: &str) -> Result<SessionPrincipal, AccountError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AccountError::InvalidSession
        })?;

        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(AccountError::InvalidSession);
        }

        let account_id =
            AccountId::from_string(&claims.sub).map_err(|_| AccountError::InvalidSession)?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AccountError::InvalidSession)?;

        Ok(SessionPrincipal {
            account_id,
            email: claims.email,
            role,
        })
    }

    async fn authorize(
        &self,
        token: &str,
        request: AccessRequest,
    ) -> Result<AccessDecision, AccountError> {
        let principal = self.verify_session(token).await?;
        let decision =
            self.policy
                .evaluate(principal.role, &principal.account_id.to_string(), &request);

        tracing::debug!(
            account_id = %principal.account_id,
            role = %principal.role,
            action = %request.action,
            category = %request.resource.category,
            allowed = decision.is_allowed(),
            "Access evaluated"
        );

        Ok(decision)
    }
}
