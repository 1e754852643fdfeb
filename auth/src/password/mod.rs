//! Salted Argon2id hashing for stored account passwords.

pub mod argon2;
pub mod errors;

pub use argon2::PasswordHasher;
pub use errors::PasswordError;
