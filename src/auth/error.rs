//! Typed failure taxonomy for the auth subsystem.

use std::fmt;

/// Authentication and session errors.
///
/// `UserNotFound` and `InvalidSecret` are kept as distinct variants so
/// tests and telemetry can tell them apart, but their `Display` output is
/// deliberately identical: a caller-visible message must never reveal
/// whether the identifier or the secret was wrong.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No user record matches the presented identifier
    UserNotFound,
    /// The presented secret does not match the stored hash
    InvalidSecret,
    /// Registration attempted with an identifier that is already taken
    DuplicateIdentifier,
    /// The presented password fails the strength requirements
    WeakPassword(String),
    /// Unknown, malformed, expired or terminated session reference
    SessionInvalid,
    /// No resolvable identity attached to the request
    NotAuthenticated,
    /// Durable-store connectivity lost or query failed
    Storage(String),
    /// Password hashing failed (catastrophic entropy/resource error)
    Hashing(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserNotFound | Self::InvalidSecret => {
                write!(f, "invalid email or password")
            }
            Self::DuplicateIdentifier => write!(f, "email address is already registered"),
            Self::WeakPassword(msg) => write!(f, "weak password: {}", msg),
            Self::SessionInvalid => write!(f, "session is invalid or has expired"),
            Self::NotAuthenticated => write!(f, "authentication required"),
            Self::Storage(msg) => write!(f, "storage error: {}", msg),
            Self::Hashing(msg) => write!(f, "hashing error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_are_indistinguishable() {
        // User-enumeration hardening: both failure modes render the same.
        assert_eq!(
            AuthError::UserNotFound.to_string(),
            AuthError::InvalidSecret.to_string()
        );
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            AuthError::DuplicateIdentifier.to_string(),
            "email address is already registered"
        );
        assert_eq!(
            AuthError::SessionInvalid.to_string(),
            "session is invalid or has expired"
        );
        assert_eq!(
            AuthError::NotAuthenticated.to_string(),
            "authentication required"
        );
    }
}
