use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity claims carried by a bearer token.
///
/// Every field is required: a payload missing any of them does not
/// deserialize, and the verifier reports it as a malformed token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Identifier of the authenticated user
    pub user_id: String,

    /// Email of the authenticated user at issue time
    pub email: String,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Build claims for a user, expiring `lifetime` after `now`.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `email` - User email address
    /// * `now` - Issue instant
    /// * `lifetime` - Time until the token expires
    pub fn for_user(
        user_id: impl ToString,
        email: impl ToString,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            exp: (now + lifetime).timestamp(),
        }
    }

    /// Check whether the token has expired at `current_timestamp`.
    ///
    /// A token is still valid at the exact second of `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }

    /// Expiration as a UTC instant, if `exp` is in chrono's range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}
