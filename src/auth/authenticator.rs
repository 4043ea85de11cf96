//! Credential verification and registration.

use tracing::{debug, info};

use crate::auth::context::VerifiedIdentity;
use crate::auth::error::AuthError;
use crate::auth::password::{PasswordHasher, validate_password};
use crate::auth::store::CredentialStore;
use crate::db::schema::{Role, UserCreate, UserRecord};
use crate::types::EmailAddress;

/// Verifies presented credentials against the credential store.
#[derive(Clone)]
pub struct Authenticator {
    store: CredentialStore,
    hasher: PasswordHasher,
}

impl Authenticator {
    /// Create a new authenticator.
    pub fn new(store: CredentialStore, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Get a reference to the credential store.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Verify an identifier/secret pair.
    ///
    /// Fails with [`AuthError::UserNotFound`] or
    /// [`AuthError::InvalidSecret`]; both display the same generic message
    /// so the surface never reveals which one occurred.
    pub async fn authenticate(
        &self,
        email: &EmailAddress,
        secret: &str,
    ) -> Result<VerifiedIdentity, AuthError> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let hash = crate::types::SecretHash::new(user.password_hash.clone());
        if !self.hasher.verify(secret, &hash).await? {
            debug!(user_id = %user.id, "password verification failed");
            return Err(AuthError::InvalidSecret);
        }

        debug!(user_id = %user.id, "credentials verified");

        Ok(VerifiedIdentity {
            user_id: user.id,
            role: user.role,
        })
    }

    /// Register a new user with the ordinary role.
    ///
    /// The secret is hashed before anything is persisted; the plaintext
    /// never leaves this call.
    pub async fn register(
        &self,
        email: &EmailAddress,
        secret: &str,
    ) -> Result<UserRecord, AuthError> {
        validate_password(secret)?;

        let password_hash = self.hasher.hash(secret).await?;

        let user = self
            .store
            .create(&UserCreate {
                email: email.clone(),
                password_hash: password_hash.into_inner(),
                role: Role::Ordinary,
            })
            .await?;

        info!(user_id = %user.id, "user registered");

        Ok(user)
    }
}
