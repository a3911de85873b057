use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::models::Session;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn login<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    // Email is not validated here: a malformed one must fail like a wrong password
    let command = LoginCommand {
        email: body.email,
        password: body.password,
    };

    state
        .account_service
        .login(command)
        .await
        .map_err(ApiError::from)
        .map(|session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub access_token: String,
    pub token_type: String,
    pub role: String,
}

impl From<Session> for LoginResponseData {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.token,
            token_type: "Bearer".to_string(),
            role: session.role.as_str().to_string(),
        }
    }
}
