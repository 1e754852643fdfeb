use std::sync::Arc;
use std::time::Duration;

use auth::JwtError;
use auth::TokenVerifier;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::deadline::with_deadline;
use crate::domain::user::models::Principal;
use crate::domain::user::models::UserId;
use crate::user::errors::AuthGateError;
use crate::user::ports::UserRepository;

const BEARER_SCHEME: &str = "Bearer";

/// Per-request authentication gate.
///
/// Turns an `Authorization` header value into a [`Principal`] in one pass:
/// header shape, token verification, then exactly one store lookup of the
/// token's subject. Holds no per-request state and knows nothing about the
/// HTTP framework in front of it.
pub struct AuthGate<UR>
where
    UR: UserRepository,
{
    verifier: Arc<TokenVerifier>,
    repository: Arc<UR>,
    store_timeout: Duration,
}

impl<UR> AuthGate<UR>
where
    UR: UserRepository,
{
    /// Create a new gate.
    ///
    /// # Arguments
    /// * `verifier` - Verifies tokens with the process-wide secret
    /// * `repository` - Credential store used to re-resolve the token subject
    /// * `store_timeout` - Deadline for the subject lookup
    pub fn new(
        verifier: Arc<TokenVerifier>,
        repository: Arc<UR>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            verifier,
            repository,
            store_timeout,
        }
    }

    /// Authenticate a request against the current time.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Principal, AuthGateError> {
        self.authenticate_at(header, Utc::now()).await
    }

    /// Authenticate a request at instant `now`.
    ///
    /// # Arguments
    /// * `header` - Raw `Authorization` header value, if present
    /// * `now` - Instant the token expiry is judged against
    ///
    /// # Errors
    /// * `MissingOrMalformedHeader` - Header absent or not exactly `Bearer <token>`
    /// * `InvalidToken` - Token failed verification or names an unparseable user ID
    /// * `UserNotFound` - Token is valid but its subject no longer exists
    /// * `Store` - Subject lookup failed or timed out
    pub async fn authenticate_at(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthGateError> {
        let token = bearer_token(header)?;

        let claims = self.verifier.verify(token, now).map_err(|e| {
            tracing::warn!(reason = %e, "Bearer token rejected");
            AuthGateError::InvalidToken(e)
        })?;

        let user_id = UserId::from_string(&claims.user_id).map_err(|e| {
            tracing::warn!(reason = %e, "Bearer token carries an invalid user_id claim");
            AuthGateError::InvalidToken(JwtError::MalformedToken(format!("user_id claim: {}", e)))
        })?;

        let user = with_deadline(
            self.store_timeout,
            "find_by_id",
            self.repository.find_by_id(&user_id),
        )
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to resolve token subject");
            AuthGateError::Store(e)
        })?
        .ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "Token subject no longer exists");
            AuthGateError::UserNotFound(user_id)
        })?;

        Ok(Principal::from(&user))
    }
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts exactly `Bearer <token>`: the scheme word, one space, and a
/// non-empty token with no further spaces.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthGateError> {
    let value = header.ok_or(AuthGateError::MissingOrMalformedHeader)?;

    let mut fields = value.split(' ');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthGateError::MissingOrMalformedHeader),
    }
}
