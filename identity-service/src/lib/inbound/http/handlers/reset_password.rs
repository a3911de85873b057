use auth::ResetSecret;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::forgot_password::MessageResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::errors::AccountError;
use crate::domain::account::models::Password;
use crate::domain::account::models::ResetPasswordCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn reset_password<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<ApiSuccess<MessageResponseData>, ApiError> {
    state
        .account_service
        .reset_password(body.try_into_command()?)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageResponseData::new("Password has been reset"),
    ))
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    token: String,
    new_password: String,
}

impl ResetPasswordRequest {
    fn try_into_command(self) -> Result<ResetPasswordCommand, AccountError> {
        let new_password = Password::new(self.new_password)?;
        Ok(ResetPasswordCommand {
            secret: ResetSecret::from_raw(self.token),
            new_password,
        })
    }
}
