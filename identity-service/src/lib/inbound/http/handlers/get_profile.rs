use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::Profile;
use crate::domain::account::models::SessionPrincipal;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn get_profile<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<SessionPrincipal>,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    state
        .account_service
        .get_profile(&principal.account_id)
        .await
        .map_err(ApiError::from)
        .map(|profile| ApiSuccess::new(StatusCode::OK, profile.into()))
}

/// Owner's view of an account. Shared by the profile read and update routes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileResponseData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub national_id: String,
    pub role: String,
    pub department: Option<String>,
    pub license: Option<String>,
    pub search_history: Vec<serde_json::Value>,
    pub assigned_patients: Vec<String>,
    pub patient_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponseData {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            name: profile.name,
            email: profile.email,
            national_id: profile.national_id,
            role: profile.role.as_str().to_string(),
            department: profile.department,
            license: profile.license,
            search_history: profile.search_history,
            assigned_patients: profile.assigned_patients,
            patient_ids: profile.patient_ids,
            created_at: profile.created_at,
        }
    }
}
