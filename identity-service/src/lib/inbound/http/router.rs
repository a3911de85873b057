use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::check_access::check_access;
use super::handlers::forgot_password::forgot_password;
use super::handlers::get_profile::get_profile;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::reset_password::reset_password;
use super::handlers::update_profile::update_profile;
use super::middleware::authenticate as auth_middleware;
use super::rate_limit::throttle;
use super::rate_limit::RateLimit;
use super::rate_limit::RateLimiter;
use crate::domain::account::ports::AccountServicePort;

pub struct AppState<S: AccountServicePort> {
    pub account_service: Arc<S>,
}

impl<S: AccountServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            account_service: Arc::clone(&self.account_service),
        }
    }
}

/// Build the HTTP router.
///
/// Reset redemption is throttled per client address by `reset_limit`, so the
/// server must be run with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_router<S: AccountServicePort>(
    account_service: Arc<S>,
    reset_limit: RateLimit,
) -> Router {
    let state = AppState { account_service };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register::<S>))
        .route("/api/auth/login", post(login::<S>))
        .route("/api/auth/forgot-password", post(forgot_password::<S>))
        .route("/api/access/check", post(check_access::<S>));

    let throttled_routes = Router::new()
        .route("/api/auth/reset-password", post(reset_password::<S>))
        .route_layer(middleware::from_fn_with_state(
            Arc::new(RateLimiter::new(reset_limit)),
            throttle,
        ));

    let protected_routes = Router::new()
        .route(
            "/api/auth/me",
            get(get_profile::<S>).patch(update_profile::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    // Headers are left out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(throttled_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
