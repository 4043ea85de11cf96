//! Credential storage.

use surrealdb::RecordId;
use tracing::info;

use crate::auth::error::AuthError;
use crate::db::Db;
use crate::db::schema::{Role, UserCreate, UserRecord};
use crate::types::EmailAddress;

/// Durable store for user credential records.
///
/// All writes go straight to the database; nothing is cached in memory, so
/// concurrent readers always observe committed state. Uniqueness of the
/// email identifier is enforced atomically by the `user_email` UNIQUE
/// index, not by a read-then-write in this layer.
#[derive(Clone)]
pub struct CredentialStore {
    db: Db,
}

impl CredentialStore {
    /// Create a new credential store.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Look up a user by their login identifier.
    pub async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, AuthError> {
        let email = email.as_str().to_string();

        let query = "SELECT * FROM user WHERE email = $email LIMIT 1";

        let mut res = self
            .db
            .query(query)
            .bind(("email", email))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let users: Vec<UserRecord> = res.take(0).map_err(|e| AuthError::Storage(e.to_string()))?;
        Ok(users.into_iter().next())
    }

    /// Look up a user by database ID.
    pub async fn find_by_id(&self, user_id: &RecordId) -> Result<Option<UserRecord>, AuthError> {
        let query = "SELECT * FROM user WHERE id = $id LIMIT 1";

        let mut res = self
            .db
            .query(query)
            .bind(("id", user_id.clone()))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let users: Vec<UserRecord> = res.take(0).map_err(|e| AuthError::Storage(e.to_string()))?;
        Ok(users.into_iter().next())
    }

    /// Create a new user record.
    ///
    /// Fails with [`AuthError::DuplicateIdentifier`] when the email is
    /// already taken. The unique index makes this safe under concurrent
    /// registrations for the same address.
    pub async fn create(&self, create: &UserCreate) -> Result<UserRecord, AuthError> {
        let email = create.email.as_str().to_string();
        let password_hash = create.password_hash.clone();
        let role = create.role;

        let query = r#"
            CREATE user CONTENT {
                email: $email,
                password_hash: $password_hash,
                role: $role
            }
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("email", email))
            .bind(("password_hash", password_hash))
            .bind(("role", role))
            .await
            .map_err(|e| map_create_error(e.to_string()))?;

        let users: Vec<UserRecord> = match res.take(0) {
            Ok(users) => users,
            Err(e) => return Err(map_create_error(e.to_string())),
        };

        users
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::Storage("user create returned no record".to_string()))
    }

    /// Assign a role to an existing user.
    ///
    /// This is the only supported way to change a role. It is an explicit
    /// administrative operation, never a side effect of login, and each
    /// call is logged for auditability.
    pub async fn set_role(&self, email: &EmailAddress, role: Role) -> Result<UserRecord, AuthError> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let query = r#"
            UPDATE user SET
                role = $role,
                updated_at = time::now()
            WHERE id = $id
        "#;

        self.db
            .query(query)
            .bind(("id", user.id.clone()))
            .bind(("role", role))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        info!(
            user_id = %user.id,
            role = role.as_str(),
            "role assigned"
        );

        self.find_by_id(&user.id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// A failed CREATE is a duplicate if the unique email index rejected it;
/// anything else is a storage fault. The violation message names the
/// `user_email` index, so anchor on that as well as the "already contains"
/// phrasing in case the wording shifts between SDK versions.
fn map_create_error(msg: String) -> AuthError {
    if msg.contains("already contains") || msg.contains("user_email") {
        AuthError::DuplicateIdentifier
    } else {
        AuthError::Storage(msg)
    }
}
