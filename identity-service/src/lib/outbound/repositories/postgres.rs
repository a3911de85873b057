use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::errors::ConflictKind;
use crate::domain::account::errors::StorageError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::DisplayName;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::NationalId;
use crate::domain::account::models::ProfileFields;
use crate::domain::account::ports::AccountRepository;

pub const EMAIL_CONSTRAINT: &str = "accounts_email_key";
pub const NATIONAL_ID_CONSTRAINT: &str = "accounts_national_id_key";

macro_rules! account_columns {
    () => {
        "id, name, email, password_hash, national_id, role, department, license, \
         reset_token_hash, reset_token_expires_at, search_history, assigned_patients, \
         patient_ids, created_at"
    };
}

const SELECT_ACCOUNT: &str = concat!("SELECT ", account_columns!(), " FROM accounts");

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    national_id: String,
    role: String,
    department: Option<String>,
    license: Option<String>,
    reset_token_hash: Option<String>,
    reset_token_expires_at: Option<DateTime<Utc>>,
    search_history: Option<String>,
    assigned_patients: Option<String>,
    patient_ids: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StorageError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            StorageError::Corrupt(format!("account {} has invalid {}: {}", id, field, e))
        };

        Ok(Account {
            id: AccountId(id),
            name: DisplayName::new(row.name).map_err(|e| corrupt("name", &e))?,
            email: EmailAddress::new(row.email).map_err(|e| corrupt("email", &e))?,
            password_hash: row.password_hash,
            national_id: NationalId::new(row.national_id)
                .map_err(|e| corrupt("national_id", &e))?,
            role: row.role.parse().map_err(|e| corrupt("role", &e))?,
            department: row.department,
            license: row.license,
            reset_token_hash: row.reset_token_hash,
            reset_token_expires_at: row.reset_token_expires_at,
            search_history: row.search_history,
            assigned_patients: row.assigned_patients,
            patient_ids: row.patient_ids,
            created_at: row.created_at,
        })
    }
}

fn storage_error(e: sqlx::Error) -> StorageError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StorageError::UniqueViolation {
                constraint: db_err.constraint().unwrap_or_default().to_string(),
            };
        }
    }
    StorageError::Backend(e.to_string())
}

impl PostgresAccountRepository {
    async fn find_one(
        &self,
        filter: &str,
        value: &str,
    ) -> Result<Option<Account>, StorageError> {
        let query = format!("{} WHERE {} = $1", SELECT_ACCOUNT, filter);
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(Account::try_from)
            .transpose()
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, StorageError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, email, password_hash, national_id, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id.0)
        .bind(account.name.as_str())
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(account.national_id.as_str())
        .bind(account.role.as_str())
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, StorageError> {
        let query = format!("{} WHERE id = $1", SELECT_ACCOUNT);
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, StorageError> {
        self.find_one("email", email.as_str()).await
    }

    async fn find_by_national_id(
        &self,
        national_id: &NationalId,
    ) -> Result<Option<Account>, StorageError> {
        self.find_one("national_id", national_id.as_str()).await
    }

    async fn find_by_reset_token(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StorageError> {
        let query = format!(
            "{} WHERE reset_token_hash = $1 AND reset_token_expires_at > $2",
            SELECT_ACCOUNT
        );
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(digest)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(Account::try_from)
            .transpose()
    }

    async fn update_profile(
        &self,
        id: &AccountId,
        fields: &ProfileFields,
    ) -> Result<Option<Account>, StorageError> {
        sqlx::query_as::<_, AccountRow>(concat!(
            "UPDATE accounts SET name = $2, department = $3, license = $4 WHERE id = $1 RETURNING ",
            account_columns!()
        ))
        .bind(id.0)
        .bind(fields.name.as_str())
        .bind(&fields.department)
        .bind(&fields.license)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?
        .map(Account::try_from)
        .transpose()
    }

    async fn store_reset_token(
        &self,
        id: &AccountId,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET reset_token_hash = $2,
                reset_token_expires_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(digest)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn complete_password_reset(
        &self,
        id: &AccountId,
        digest: &str,
        now: DateTime<Utc>,
        password_hash: String,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $4,
                reset_token_hash = NULL,
                reset_token_expires_at = NULL
            WHERE id = $1
              AND reset_token_hash = $2
              AND reset_token_expires_at > $3
            "#,
        )
        .bind(id.0)
        .bind(digest)
        .bind(now)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn replace_password_hash(
        &self,
        id: &AccountId,
        current_hash: &str,
        new_hash: String,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE accounts SET password_hash = $3 WHERE id = $1 AND password_hash = $2",
        )
        .bind(id.0)
        .bind(current_hash)
        .bind(new_hash)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected() == 1)
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
