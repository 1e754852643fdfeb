use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::encode;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;

use super::claims::Claims;
use super::errors::JwtError;
use super::SIGNING_ALGORITHM;

/// Signs bearer tokens for authenticated users.
///
/// Holds the symmetric key for the lifetime of the process. Build it once at
/// startup from configuration and share it behind an `Arc`.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    /// Create a new issuer.
    ///
    /// # Arguments
    /// * `secret` - HMAC key; should be at least 32 bytes for HS256
    /// * `lifetime` - Validity window of every issued token
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            lifetime,
        }
    }

    /// Token validity window.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a signed token for a user.
    ///
    /// # Arguments
    /// * `user_id` - User identifier placed in the `user_id` claim
    /// * `email` - User email placed in the `email` claim
    /// * `now` - Issue instant; `exp` is `now + lifetime`
    ///
    /// # Returns
    /// Compact `header.payload.signature` string
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn issue(
        &self,
        user_id: impl ToString,
        email: impl ToString,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::for_user(user_id, email, now, self.lifetime);

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }
}
