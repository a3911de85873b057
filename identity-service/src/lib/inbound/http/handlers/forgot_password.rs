use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

/// Returned whether or not the email belongs to an account.
pub const RESET_REQUESTED_MESSAGE: &str =
    "If the email is registered, a password reset link has been sent";

pub async fn forgot_password<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<ApiSuccess<MessageResponseData>, ApiError> {
    state
        .account_service
        .request_password_reset(&body.email)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageResponseData::new(RESET_REQUESTED_MESSAGE),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForgotPasswordRequest {
    email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponseData {
    pub message: String,
}

impl MessageResponseData {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
