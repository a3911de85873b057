use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::INVALID_SESSION;
use crate::inbound::http::router::AppState;

/// Middleware that verifies the bearer token and stores the
/// [`SessionPrincipal`](crate::domain::account::models::SessionPrincipal)
/// in request extensions.
pub async fn authenticate<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let principal = state
        .account_service
        .verify_session(token)
        .await
        .map_err(ApiError::from)?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let unauthorized = || ApiError::Unauthorized(INVALID_SESSION.to_string());

    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(unauthorized)?
        .to_str()
        .map_err(|_| unauthorized())?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(unauthorized)
}
