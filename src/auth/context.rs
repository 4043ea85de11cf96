//! Request-scoped identity types.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::db::schema::Role;
use crate::types::EmailAddress;

/// Identity produced by the authenticator after a successful credential
/// check. Transient: consumed immediately by the session manager.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Database record ID for the authenticated user
    pub user_id: RecordId,
    /// Authorization role at the moment of authentication
    pub role: Role,
}

/// Identity attached to a request after a session reference resolves.
///
/// This struct is passed explicitly through the request handling chain;
/// there is no ambient "current user". It is immutable once created, and
/// its role reflects the user record as read during this resolution, not
/// the role at login time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    /// Database record ID for this user
    user_id: RecordId,
    /// Login identifier, for display
    email: EmailAddress,
    /// Authorization role, re-read from the credential store
    role: Role,
}

impl ResolvedIdentity {
    /// Create a new resolved identity.
    pub fn new(user_id: RecordId, email: EmailAddress, role: Role) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }

    /// Get the database user ID.
    pub fn user_id(&self) -> &RecordId {
        &self.user_id
    }

    /// Get the user ID as a string for use in queries and logs.
    pub fn user_id_string(&self) -> String {
        self.user_id.to_string()
    }

    /// Get the login identifier.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Get the authorization role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Check whether this identity carries the administrator role.
    pub fn is_administrator(&self) -> bool {
        self.role == Role::Administrator
    }
}
