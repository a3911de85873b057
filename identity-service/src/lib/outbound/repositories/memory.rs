use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::account::errors::ConflictKind;
use crate::domain::account::errors::StorageError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::NationalId;
use crate::domain::account::models::ProfileFields;
use crate::domain::account::ports::AccountRepository;
use crate::outbound::repositories::postgres::EMAIL_CONSTRAINT;
use crate::outbound::repositories::postgres::NATIONAL_ID_CONSTRAINT;

/// Process-local account store.
///
/// Enforces the same unique constraints as the database schema, under a
/// single lock so concurrent registrations cannot both succeed.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn violated_constraint(
        accounts: &HashMap<AccountId, Account>,
        account: &Account,
    ) -> Option<&'static str> {
        let others = accounts.values().filter(|other| other.id != account.id);
        for other in others {
            if other.email == account.email {
                return Some(EMAIL_CONSTRAINT);
            }
            if other.national_id == account.national_id {
                return Some(NATIONAL_ID_CONSTRAINT);
            }
        }
        None
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, StorageError> {
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(&account.id) {
            return Err(StorageError::UniqueViolation {
                constraint: "accounts_pkey".to_string(),
            });
        }
        if let Some(constraint) = Self::violated_constraint(&accounts, &account) {
            return Err(StorageError::UniqueViolation {
                constraint: constraint.to_string(),
            });
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, StorageError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, StorageError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| &account.email == email)
            .cloned())
    }

    async fn find_by_national_id(
        &self,
        national_id: &NationalId,
    ) -> Result<Option<Account>, StorageError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| &account.national_id == national_id)
            .cloned())
    }

    async fn find_by_reset_token(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StorageError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| {
                account.reset_token_hash.as_deref() == Some(digest) && account.has_pending_reset(now)
            })
            .cloned())
    }

    async fn update_profile(
        &self,
        id: &AccountId,
        fields: &ProfileFields,
    ) -> Result<Option<Account>, StorageError> {
        let mut accounts = self.accounts.write().await;

        Ok(accounts.get_mut(id).map(|account| {
            account.name = fields.name.clone();
            account.department = fields.department.clone();
            account.license = fields.license.clone();
            account.clone()
        }))
    }

    async fn store_reset_token(
        &self,
        id: &AccountId,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut accounts = self.accounts.write().await;

        let Some(account) = accounts.get_mut(id) else {
            return Ok(false);
        };
        account.reset_token_hash = Some(digest.to_string());
        account.reset_token_expires_at = Some(expires_at);
        Ok(true)
    }

    async fn complete_password_reset(
        &self,
        id: &AccountId,
        digest: &str,
        now: DateTime<Utc>,
        password_hash: String,
    ) -> Result<bool, StorageError> {
        let mut accounts = self.accounts.write().await;

        let Some(account) = accounts.get_mut(id) else {
            return Ok(false);
        };
        if account.reset_token_hash.as_deref() != Some(digest) || !account.has_pending_reset(now) {
            return Ok(false);
        }

        account.password_hash = password_hash;
        account.reset_token_hash = None;
        account.reset_token_expires_at = None;
        Ok(true)
    }

    async fn replace_password_hash(
        &self,
        id: &AccountId,
        current_hash: &str,
        new_hash: String,
    ) -> Result<bool, StorageError> {
        let mut accounts = self.accounts.write().await;

        match accounts.get_mut(id) {
            Some(account) if account.password_hash == current_hash => {
                account.password_hash = new_hash;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn conflict_kind(&self, error: &StorageError) -> Option<ConflictKind> {
        match error {
            StorageError::UniqueViolation { constraint } => match constraint.as_str() {
                EMAIL_CONSTRAINT => Some(ConflictKind::Email),
                NATIONAL_ID_CONSTRAINT => Some(ConflictKind::NationalId),
                _ => None,
            },
            _ => None,
        }
    }
}
