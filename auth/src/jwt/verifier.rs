use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::claims::Claims;
use super::errors::JwtError;
use super::SIGNING_ALGORITHM;
use super::SIGNING_ALGORITHM_NAME;

/// Validates bearer tokens and extracts their claims.
///
/// Checks run in a fixed order (structure of header and payload, algorithm,
/// signature, expiry) and the first failure is reported. The algorithm is pinned to HS256 before the
/// token ever reaches the signature check, so `none` and asymmetric
/// algorithms are refused regardless of library defaults.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

/// Only the header field the algorithm check needs.
#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
}

impl TokenVerifier {
    /// Create a new verifier.
    ///
    /// # Arguments
    /// * `secret` - HMAC key shared with the [`super::TokenIssuer`]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is judged against the caller's clock in `verify`
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify a token at instant `now`.
    ///
    /// # Arguments
    /// * `token` - Compact token string (without the `Bearer ` prefix)
    /// * `now` - Verification instant
    ///
    /// # Returns
    /// Claims whose signature matched and whose `exp` is not before `now`
    ///
    /// # Errors
    /// * `MalformedToken` - Not three segments, or header/payload not base64url JSON of the expected shape
    /// * `UnexpectedAlgorithm` - Header `alg` is anything but HS256
    /// * `SignatureMismatch` - Signature does not match the configured secret
    /// * `Expired` - `now` is strictly after `exp`
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let (header, claims) = Self::parse(token)?;

        if header.alg != SIGNING_ALGORITHM_NAME {
            return Err(JwtError::UnexpectedAlgorithm(header.alg));
        }

        decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => JwtError::SignatureMismatch,
                ErrorKind::InvalidAlgorithm => {
                    JwtError::UnexpectedAlgorithm(SIGNING_ALGORITHM_NAME.to_string())
                }
                _ => JwtError::MalformedToken(e.to_string()),
            }
        })?;

        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }

    /// Decode header and payload without trusting either.
    fn parse(token: &str) -> Result<(RawHeader, Claims), JwtError> {
        let segments: Vec<&str> = token.split('.').collect();
        // An empty signature is left for the algorithm check to reject (`alg: none`)
        if segments.len() != 3 || segments[0].is_empty() || segments[1].is_empty() {
            return Err(JwtError::MalformedToken(
                "expected header.payload.signature".to_string(),
            ));
        }

        let header = Self::decode_segment::<RawHeader>(segments[0], "header")?;
        let claims = Self::decode_segment::<Claims>(segments[1], "payload")?;

        Ok((header, claims))
    }

    fn decode_segment<T: DeserializeOwned>(segment: &str, part: &str) -> Result<T, JwtError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|e| JwtError::MalformedToken(format!("{} encoding: {}", part, e)))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| JwtError::MalformedToken(format!("{} json: {}", part, e)))
    }
}
