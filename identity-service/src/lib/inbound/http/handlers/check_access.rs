use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::access::models::AccessDecision;
use crate::domain::access::models::AccessParseError;
use crate::domain::access::models::AccessRequest;
use crate::domain::access::models::Resource;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::middleware::bearer_token;
use crate::inbound::http::router::AppState;

pub async fn check_access<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(body): Json<CheckAccessRequest>,
) -> Result<ApiSuccess<CheckAccessResponseData>, ApiError> {
    let token = bearer_token(&headers)?;
    let request = body.try_into_request()?;

    state
        .account_service
        .authorize(token, request)
        .await
        .map_err(ApiError::from)
        .map(|decision| ApiSuccess::new(StatusCode::OK, decision.into()))
}

/// HTTP request body for an access check (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckAccessRequest {
    action: String,
    category: String,
    field: Option<String>,
    /// Author, uploader or assignee of an existing resource
    owner_id: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseCheckAccessRequestError {
    #[error("Invalid access request: {0}")]
    Vocabulary(#[from] AccessParseError),
}

impl CheckAccessRequest {
    fn try_into_request(self) -> Result<AccessRequest, ParseCheckAccessRequestError> {
        let action = self.action.parse()?;
        let category = self.category.parse()?;
        let field = self.field.map(|f| f.parse()).transpose()?;
        Ok(AccessRequest {
            action,
            resource: Resource {
                category,
                owner_id: self.owner_id,
            },
            field,
        })
    }
}

impl From<ParseCheckAccessRequestError> for ApiError {
    fn from(err: ParseCheckAccessRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckAccessResponseData {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl From<AccessDecision> for CheckAccessResponseData {
    fn from(decision: AccessDecision) -> Self {
        match decision {
            AccessDecision::Allowed => Self {
                allowed: true,
                reason: None,
            },
            AccessDecision::Denied(reason) => Self {
                allowed: false,
                reason: Some(reason.as_str().to_string()),
            },
        }
    }
}
