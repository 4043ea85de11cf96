//! Authentication, session and access-control module.
//!
//! This module turns a presented email/password pair into a server-side
//! session and enforces it on protected routes:
//!
//! - **Password Hasher**: salted bcrypt hashing with a tunable work factor
//! - **Credential Store**: durable user records behind a unique identifier
//! - **Authenticator**: credential verification and registration
//! - **Session Manager**: opaque token to identity mapping with TTL expiry
//! - **Access Guard**: pure per-request allow/deny decisions
//!
//! ## Security model
//!
//! - Plaintext secrets exist only inside a login or registration call
//! - Password hashes and session tokens are never logged
//! - Session tokens are stored hashed (SHA-256), never in plain text
//! - Credential failures are indistinguishable to callers, so the login
//!   surface cannot be used to enumerate registered addresses
//! - Role changes are explicit store operations, re-read on every
//!   resolution, and never a side effect of login

mod authenticator;
mod context;
mod error;
mod guard;
mod password;
mod session;
mod store;

pub use authenticator::Authenticator;
pub use context::{ResolvedIdentity, VerifiedIdentity};
pub use error::AuthError;
pub use guard::{Capability, Decision, DenyReason, authorize};
pub use password::{PasswordHasher, validate_password};
pub use session::{
    DEFAULT_SESSION_TTL_SECONDS, SessionConfig, SessionManager, generate_session_token,
    hash_session_token,
};
pub use store::CredentialStore;
