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

use super::handlers::get_current_user::get_current_user;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::update_current_user::update_current_user;
use super::middleware::authenticate as auth_middleware;
use crate::domain::user::gate::AuthGate;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::service::AuthService;

pub struct AppState<UR>
where
    UR: UserRepository,
{
    pub auth_service: Arc<AuthService<UR>>,
    pub auth_gate: Arc<AuthGate<UR>>,
}

// Manual impl: the derive would demand `UR: Clone`
impl<UR> Clone for AppState<UR>
where
    UR: UserRepository,
{
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            auth_gate: Arc::clone(&self.auth_gate),
        }
    }
}

pub fn create_router<UR>(
    auth_service: Arc<AuthService<UR>>,
    auth_gate: Arc<AuthGate<UR>>,
) -> Router
where
    UR: UserRepository,
{
    let state = AppState {
        auth_service,
        auth_gate,
    };

    let public_routes = Router::new()
        .route("/api/register", post(register::<UR>))
        .route("/api/login", post(login::<UR>));

    let protected_routes = Router::new()
        .route(
            "/api/user",
            get(get_current_user).put(update_current_user::<UR>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<UR>,
        ));

    // Headers stay out of the span: they carry bearer tokens
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
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
