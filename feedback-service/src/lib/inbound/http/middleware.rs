use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::domain::user::ports::UserRepository;
use crate::inbound::http::router::AppState;
use crate::user::errors::AuthGateError;
use crate::user::errors::UserError;

/// Middleware that runs the auth gate and adds the resolved principal to request extensions
pub async fn authenticate<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    // Non-UTF-8 header values are treated like a missing header
    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let principal = state
        .auth_gate
        .authenticate(header.as_deref())
        .await
        .map_err(gate_error_response)?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Map a gate failure to a response without revealing which check failed.
fn gate_error_response(err: AuthGateError) -> Response {
    let (status, message) = match err {
        AuthGateError::MissingOrMalformedHeader => {
            tracing::debug!("Missing or malformed Authorization header");
            (StatusCode::UNAUTHORIZED, "Unauthorized")
        }
        AuthGateError::InvalidToken(_) | AuthGateError::UserNotFound(_) => {
            (StatusCode::UNAUTHORIZED, "Unauthorized")
        }
        AuthGateError::Store(UserError::Timeout(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable",
        ),
        AuthGateError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    };

    (status, Json(json!({ "error": message }))).into_response()
}
