use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::get_profile::ProfileResponseData;
use crate::domain::account::errors::AccountError;
use crate::domain::account::models::DisplayName;
use crate::domain::account::models::SessionPrincipal;
use crate::domain::account::models::UpdateProfileCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

/// HTTP request body for updating the caller's profile (raw JSON)
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub department: Option<String>,
    pub license: Option<String>,
}

impl UpdateProfileRequest {
    fn try_into_command(self) -> Result<UpdateProfileCommand, AccountError> {
        let name = self.name.map(DisplayName::new).transpose()?;

        Ok(UpdateProfileCommand {
            name,
            department: self.department,
            license: self.license,
        })
    }
}

pub async fn update_profile<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<SessionPrincipal>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    let command = req.try_into_command()?;

    state
        .account_service
        .update_profile(&principal.account_id, command)
        .await
        .map_err(ApiError::from)
        .map(|profile| ApiSuccess::new(StatusCode::OK, profile.into()))
}
