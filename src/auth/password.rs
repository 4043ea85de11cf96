//! Password hashing and verification.
//!
//! Uses bcrypt with a tunable cost factor. Hashing is CPU-intensive on
//! purpose, so both operations run on the blocking thread pool instead of
//! the async runtime.

use bcrypt::DEFAULT_COST;

use crate::auth::error::AuthError;
use crate::types::SecretHash;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (bcrypt only consumes the first 72 bytes).
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// One-way salted password hasher.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// Create a hasher with an explicit bcrypt cost factor.
    ///
    /// Tests use a low cost (e.g. 4) to stay fast; production uses the
    /// bcrypt default.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext secret. The salt is embedded in the output, so the
    /// same input produces a different hash on every call.
    pub async fn hash(&self, secret: &str) -> Result<SecretHash, AuthError> {
        let secret = secret.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || {
            bcrypt::hash(secret, cost)
                .map(SecretHash::new)
                .map_err(|e| AuthError::Hashing(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::Hashing(format!("task join error: {}", e)))?
    }

    /// Verify a plaintext secret against a stored hash.
    ///
    /// Returns `false` on mismatch; bcrypt's comparison does not leak
    /// where the mismatch occurs. Only a malformed hash is an error.
    pub async fn verify(&self, secret: &str, hash: &SecretHash) -> Result<bool, AuthError> {
        let secret = secret.to_string();
        let hash = hash.as_str().to_string();

        tokio::task::spawn_blocking(move || {
            bcrypt::verify(secret, &hash).map_err(|e| AuthError::Hashing(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::Hashing(format!("task join error: {}", e)))?
    }
}

/// Validate that a password meets the length requirements.
///
/// Applied at registration only; existing hashes always verify regardless
/// of current policy.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at most {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }

    Ok(())
}
