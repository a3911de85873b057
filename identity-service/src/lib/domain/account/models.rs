use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::account::errors::AccountIdError;
use crate::domain::account::errors::DisplayNameError;
use crate::domain::account::errors::EmailError;
use crate::domain::account::errors::NationalIdError;
use crate::domain::account::errors::PasswordPolicyError;
use crate::domain::account::errors::RoleError;

/// Account aggregate entity.
///
/// Holds credentials and the raw (JSON-encoded) auxiliary lists exactly as
/// stored. Use [`Profile`] for anything leaving the identity boundary.
#[derive(Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub national_id: NationalId,
    pub role: Role,
    pub department: Option<String>,
    pub license: Option<String>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub search_history: Option<String>,
    pub assigned_patients: Option<String>,
    pub patient_ids: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Whether a reset token is stored and still valid at `now`.
    pub fn has_pending_reset(&self, now: DateTime<Utc>) -> bool {
        match (&self.reset_token_hash, self.reset_token_expires_at) {
            (Some(_), Some(expires_at)) => expires_at > now,
            _ => false,
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("national_id", &self.national_id)
            .field("role", &self.role)
            .field("department", &self.department)
            .field("license", &self.license)
            .field(
                "reset_token_hash",
                &self.reset_token_hash.as_ref().map(|_| "<redacted>"),
            )
            .field("reset_token_expires_at", &self.reset_token_expires_at)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Trimmed, 2-100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MIN_LENGTH: usize = 2;
    const MAX_LENGTH: usize = 100;

    /// Create a new valid display name.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 2 characters after trimming
    /// * `TooLong` - More than 100 characters after trimming
    pub fn new(name: String) -> Result<Self, DisplayNameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length < Self::MIN_LENGTH {
            Err(DisplayNameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Email address type
///
/// Validated with an RFC 5322 parser, stored trimmed and lowercased so that
/// uniqueness is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_lowercase();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Chilean national identifier (RUT)
///
/// Accepts dotted or plain notation, always stored formatted (`12.345.678-5`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationalId(String);

impl NationalId {
    const MAX_BODY_DIGITS: usize = 8;

    /// Create a validated national id.
    ///
    /// # Errors
    /// * `InvalidFormat` - Not 1-8 digits followed by a digit or K
    /// * `InvalidCheckDigit` - Check character does not match the body
    pub fn new(raw: String) -> Result<Self, NationalIdError> {
        let cleaned = auth::rut::clean(raw.trim());
        let Some(check) = cleaned.chars().last() else {
            return Err(NationalIdError::InvalidFormat);
        };
        let body = &cleaned[..cleaned.len() - check.len_utf8()];

        let well_formed = !body.is_empty()
            && body.len() <= Self::MAX_BODY_DIGITS
            && body.chars().all(|c| c.is_ascii_digit())
            && (check.is_ascii_digit() || check == 'K');
        if !well_formed {
            return Err(NationalIdError::InvalidFormat);
        }

        if !auth::rut::validate(&cleaned) {
            return Err(NationalIdError::InvalidCheckDigit);
        }

        Ok(Self(auth::rut::format(&cleaned)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that satisfies the password policy.
///
/// At least 8 characters with a lowercase letter, an uppercase letter and a
/// digit. `Debug` never prints the value.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;

    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    /// * `MissingLowercase` / `MissingUppercase` / `MissingDigit` - Character class missing
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if password.chars().count() < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(PasswordPolicyError::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(PasswordPolicyError::MissingUppercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Patient,
    Doctor,
    Nurse,
    Guardian,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Patient, Role::Doctor, Role::Nurse, Role::Guardian];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Guardian => "guardian",
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            "nurse" => Ok(Role::Nurse),
            "guardian" => Ok(Role::Guardian),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command to register a new account with domain types
#[derive(Debug)]
pub struct RegisterAccountCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: Password,
    pub national_id: NationalId,
    pub role: Role,
}

impl RegisterAccountCommand {
    /// Construct a new registration command.
    ///
    /// # Arguments
    /// * `role` - Requested role, defaults to patient when absent
    pub fn new(
        name: DisplayName,
        email: EmailAddress,
        password: Password,
        national_id: NationalId,
        role: Option<Role>,
    ) -> Self {
        Self {
            name,
            email,
            password,
            national_id,
            role: role.unwrap_or_default(),
        }
    }
}

/// Login attempt with unvalidated input.
///
/// Kept raw so that malformed input fails exactly like a wrong password.
#[derive(Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Command to update the editable profile fields.
///
/// All fields are optional to support partial updates.
#[derive(Debug, Default)]
pub struct UpdateProfileCommand {
    pub name: Option<DisplayName>,
    pub department: Option<String>,
    pub license: Option<String>,
}

impl UpdateProfileCommand {
    /// Merge the command over the current profile columns of `account`.
    /// Blank department or license clears the column.
    pub fn merge_onto(self, account: &Account) -> ProfileFields {
        ProfileFields {
            name: self.name.unwrap_or_else(|| account.name.clone()),
            department: match self.department {
                Some(department) => non_blank(department),
                None => account.department.clone(),
            },
            license: match self.license {
                Some(license) => non_blank(license),
                None => account.license.clone(),
            },
        }
    }
}

/// Complete set of owner-editable columns, written in one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub name: DisplayName,
    pub department: Option<String>,
    pub license: Option<String>,
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Command to redeem a reset secret
#[derive(Debug)]
pub struct ResetPasswordCommand {
    pub secret: auth::ResetSecret,
    pub new_password: Password,
}

/// Outcome of a successful registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAccount {
    pub id: AccountId,
    pub email: EmailAddress,
    pub role: Role,
}

/// Outcome of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
}

/// Identity asserted by a verified session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPrincipal {
    pub account_id: AccountId,
    pub email: String,
    pub role: Role,
}

/// Account as shown to its owner. There is no password field.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub national_id: String,
    pub role: Role,
    pub department: Option<String>,
    pub license: Option<String>,
    pub search_history: Vec<serde_json::Value>,
    pub assigned_patients: Vec<String>,
    pub patient_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}
