//! # Password hashing
//!
//! Customer passwords are stored only as Argon2id PHC strings.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use thiserror::Error;

/// Hashing failures
#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

/// Hash a password using Argon2id with a random salt
pub fn hash_password(password: &str) -> Result<String, CryptoError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CryptoError::HashingFailed(e.to_string()))
}

/// Hash on the blocking pool, off the async worker threads
pub async fn hash_password_blocking(password: String) -> Result<String, CryptoError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CryptoError::HashingFailed(e.to_string()))?
}
