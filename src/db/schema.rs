use serde::{Deserialize, Serialize};
use surrealdb::{RecordId, sql::Datetime};

use crate::types::EmailAddress;

/// Authorization role attached to a user account.
///
/// Roles are read live from the `user` table on every session resolution,
/// so a role change takes effect on the next request without re-login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular customer account. Assigned on registration.
    Ordinary,
    /// Elevated account for store administration.
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordinary => "ordinary",
            Self::Administrator => "administrator",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordinary" => Ok(Self::Ordinary),
            "administrator" => Ok(Self::Administrator),
            other => Err(anyhow::anyhow!("unknown role: {}", other)),
        }
    }
}

/// Persisted representation of a user account in SurrealDB.
///
/// `password_hash` is the salted bcrypt hash and is the only form in which
/// a secret is ever stored. This struct is never serialized into an HTTP
/// response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable database identifier for this user (table: `user`).
    pub id: RecordId,
    /// Unique login identifier.
    pub email: EmailAddress,
    /// Salted bcrypt hash of the user's password.
    pub password_hash: String,
    /// Authorization role.
    pub role: Role,
    /// When this record was first created.
    pub created_at: Option<Datetime>,
    /// When this record was last updated.
    pub updated_at: Option<Datetime>,
}

/// Payload used when inserting a new user into the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    /// Unique login identifier.
    pub email: EmailAddress,
    /// Salted bcrypt hash of the user's password.
    pub password_hash: String,
    /// Authorization role.
    pub role: Role,
}

/// Persisted session mapping: hashed token to user.
///
/// The raw session token is held only by the client; this record stores
/// its SHA-256. A session is Active while this record exists and
/// `expires_at` lies in the future, and Terminated once the record is
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Stable database identifier for this session (table: `session`).
    pub id: RecordId,
    /// SHA-256 of the opaque token issued to the client.
    pub token_hash: String,
    /// The user this session authenticates.
    pub user_id: RecordId,
    /// When the session was created.
    pub issued_at: Option<Datetime>,
    /// When the session stops resolving.
    pub expires_at: Datetime,
}

/// Persisted representation of a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Stable database identifier for this product (table: `product`).
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Unit price.
    pub price: f64,
    /// Units in stock.
    pub stock: u64,
    /// When this record was first created.
    pub created_at: Option<Datetime>,
    /// When this record was last updated.
    pub updated_at: Option<Datetime>,
}

/// Payload used when inserting a new product into the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    /// Display name.
    pub name: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Unit price.
    pub price: f64,
    /// Units in stock.
    pub stock: u64,
}
