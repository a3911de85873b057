use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::errors::AccountError;
use crate::domain::account::models::DisplayName;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::NationalId;
use crate::domain::account::models::Password;
use crate::domain::account::models::RegisterAccountCommand;
use crate::domain::account::models::RegisteredAccount;
use crate::domain::account::models::Role;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn register<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    state
        .account_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::CREATED, account.into()))
}

/// HTTP request body for registering an account (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
    #[serde(alias = "rut")]
    national_id: String,
    role: Option<String>,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterAccountCommand, AccountError> {
        let name = DisplayName::new(self.name)?;
        let email = EmailAddress::new(self.email)?;
        let password = Password::new(self.password)?;
        let national_id = NationalId::new(self.national_id)?;
        let role = self.role.map(|r| r.parse::<Role>()).transpose()?;
        Ok(RegisterAccountCommand::new(
            name,
            email,
            password,
            national_id,
            role,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl From<&RegisteredAccount> for RegisterResponseData {
    fn from(account: &RegisteredAccount) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.as_str().to_string(),
            role: account.role.as_str().to_string(),
        }
    }
}
