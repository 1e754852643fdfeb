pub mod claims;
pub mod errors;
pub mod issuer;
pub mod verifier;

pub use claims::Claims;
pub use errors::JwtError;
pub use issuer::TokenIssuer;
pub use verifier::TokenVerifier;

use jsonwebtoken::Algorithm;

/// The only signing algorithm this crate issues or accepts.
pub(crate) const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Header `alg` value matching [`SIGNING_ALGORITHM`].
pub(crate) const SIGNING_ALGORITHM_NAME: &str = "HS256";
