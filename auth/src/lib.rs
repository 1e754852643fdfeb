//! Authentication primitives for the feedback API.
//!
//! Provides the stateless building blocks of bearer-token authentication:
//! - Password hashing (Argon2id)
//! - Token issuing (HS256 compact JWS)
//! - Token verification with explicit algorithm pinning
//!
//! Services compose these behind their own ports; nothing in this crate touches storage.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Issuing and Verifying Tokens
//! ```
//! use auth::{TokenIssuer, TokenVerifier};
//! use chrono::{Duration, Utc};
//!
//! let secret = b"secret_key_at_least_32_bytes_long!";
//! let issuer = TokenIssuer::new(secret, Duration::hours(24));
//! let verifier = TokenVerifier::new(secret);
//!
//! let now = Utc::now();
//! let token = issuer.issue("user123", "alice@example.com", now).unwrap();
//! let claims = verifier.verify(&token, now).unwrap();
//! assert_eq!(claims.email, "alice@example.com");
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenIssuer;
pub use jwt::TokenVerifier;
pub use password::PasswordError;
pub use password::PasswordHasher;
