//! Session management.
//!
//! Converts a verified identity into an opaque session reference and
//! resolves that reference back into a full identity on later requests.
//!
//! Per-session state machine: Unauthenticated, then Active on login
//! success, then Terminated on logout, expiry or revocation. There is no
//! transition out of Terminated; a new login always mints a fresh token.
//!
//! The mapping stored server-side is SHA-256(token) to user_id plus
//! timestamps, and nothing else. Role and email are re-read from the
//! credential store on every resolution so live changes apply immediately.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::auth::context::{ResolvedIdentity, VerifiedIdentity};
use crate::auth::error::AuthError;
use crate::auth::store::CredentialStore;
use crate::db::Db;
use crate::db::schema::SessionRecord;
use crate::types::{SessionToken, SessionTokenHash};

/// Default session lifetime: 24 hours.
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 86_400;

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds a session stays resolvable after creation
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_SESSION_TTL_SECONDS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }
}

/// Creates, resolves and terminates sessions.
#[derive(Clone)]
pub struct SessionManager {
    db: Db,
    store: CredentialStore,
    config: SessionConfig,
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new(db: Db, store: CredentialStore, config: SessionConfig) -> Self {
        Self { db, store, config }
    }

    /// Get the configured session lifetime in seconds.
    pub fn ttl_seconds(&self) -> u64 {
        self.config.ttl_seconds
    }

    /// Convert a verified identity into a fresh session reference.
    ///
    /// Only the token hash is persisted; the raw token goes to the client
    /// and is gone once this call returns it. If the write fails, no
    /// mapping exists and the token is useless.
    pub async fn create_session(
        &self,
        identity: &VerifiedIdentity,
    ) -> Result<SessionToken, AuthError> {
        let token = generate_session_token();
        let token_hash = hash_session_token(&token);

        let expires_at =
            chrono::Utc::now() + chrono::Duration::seconds(self.config.ttl_seconds as i64);

        let query = r#"
            CREATE session CONTENT {
                token_hash: $token_hash,
                user_id: $user_id,
                expires_at: $expires_at
            }
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("token_hash", token_hash.into_inner()))
            .bind(("user_id", identity.user_id.clone()))
            .bind(("expires_at", surrealdb::sql::Datetime::from(expires_at)))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let created: Vec<SessionRecord> =
            res.take(0).map_err(|e| AuthError::Storage(e.to_string()))?;
        if created.is_empty() {
            return Err(AuthError::Storage(
                "session create returned no record".to_string(),
            ));
        }

        info!(user_id = %identity.user_id, "session created");

        Ok(token)
    }

    /// Resolve a session reference back into a full identity.
    ///
    /// Unknown, malformed, terminated or expired references fail with
    /// [`AuthError::SessionInvalid`]. A mapping whose backing user record
    /// has vanished is treated as terminated and fails with
    /// [`AuthError::UserNotFound`].
    pub async fn resolve_session(
        &self,
        token: &SessionToken,
    ) -> Result<ResolvedIdentity, AuthError> {
        let token_hash = hash_session_token(token);

        let record = self
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        // Expiry check. An unparseable timestamp counts as expired: fail
        // resolution rather than resolve to a possibly stale identity.
        let now = chrono::Utc::now();
        let expires = chrono::DateTime::parse_from_rfc3339(
            record.expires_at.to_string().trim_matches(['d', '\'']),
        )
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or(now);

        if expires <= now {
            debug!(user_id = %record.user_id, "session expired");
            self.delete_by_token_hash(&token_hash).await?;
            return Err(AuthError::SessionInvalid);
        }

        // Re-fetch the user so role changes since login take effect here.
        let user = match self.store.find_by_id(&record.user_id).await? {
            Some(user) => user,
            None => {
                debug!(user_id = %record.user_id, "session user vanished, terminating");
                self.delete_by_token_hash(&token_hash).await?;
                return Err(AuthError::UserNotFound);
            }
        };

        Ok(ResolvedIdentity::new(user.id, user.email, user.role))
    }

    /// Terminate a session. Idempotent: terminating an unknown or already
    /// terminated reference is a no-op.
    pub async fn terminate_session(&self, token: &SessionToken) -> Result<(), AuthError> {
        let token_hash = hash_session_token(token);
        self.delete_by_token_hash(&token_hash).await?;
        debug!("session terminated");
        Ok(())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &SessionTokenHash,
    ) -> Result<Option<SessionRecord>, AuthError> {
        let hash = token_hash.as_str().to_string();

        let query = "SELECT * FROM session WHERE token_hash = $token_hash LIMIT 1";

        let mut res = self
            .db
            .query(query)
            .bind(("token_hash", hash))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let sessions: Vec<SessionRecord> =
            res.take(0).map_err(|e| AuthError::Storage(e.to_string()))?;
        Ok(sessions.into_iter().next())
    }

    async fn delete_by_token_hash(&self, token_hash: &SessionTokenHash) -> Result<(), AuthError> {
        let hash = token_hash.as_str().to_string();

        self.db
            .query("DELETE session WHERE token_hash = $token_hash")
            .bind(("token_hash", hash))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }
}

/// Generate a fresh session token: 256 bits of randomness rendered as
/// 64 hex characters. Collision across concurrent creations is negligible.
pub fn generate_session_token() -> SessionToken {
    let a = uuid::Uuid::new_v4().simple().to_string();
    let b = uuid::Uuid::new_v4().simple().to_string();
    SessionToken::new(format!("{}{}", a, b))
}

/// Hash a session token for storage and lookup (raw tokens are never
/// written to the database).
pub fn hash_session_token(token: &SessionToken) -> SessionTokenHash {
    let mut hasher = Sha256::new();
    hasher.update(token.as_str().as_bytes());
    let result = hasher.finalize();
    SessionTokenHash::new(format!("{:x}", result))
}
