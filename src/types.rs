//! NewType wrappers for strong typing throughout the storefront backend.
//!
//! These types prevent accidental mixing of semantically different strings
//! (e.g., passing a raw session token where its at-rest hash is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// User-facing login key, e.g. "reader@example.com".
    ///
    /// This is the unique identifier users present at login and
    /// registration. It is distinct from the database `RecordId` which is
    /// the stable internal key.
    EmailAddress
);

newtype_string!(
    /// Salted bcrypt hash of a user's password.
    ///
    /// This is the only form in which a secret is ever persisted. It must
    /// never appear in logs or in any HTTP response body.
    SecretHash
);

newtype_string!(
    /// Opaque session token issued to the client as a cookie.
    ///
    /// Tokens are generated from 256 bits of randomness and are the only
    /// session state the client holds. The raw token is never persisted
    /// server-side; see [`SessionTokenHash`].
    SessionToken
);

newtype_string!(
    /// SHA-256 hash of a session token, used for storage and lookup.
    ///
    /// Session tokens are never stored in plain text. The hash is computed
    /// once when the session is created or when a cookie is presented.
    SessionTokenHash
);

impl SessionToken {
    /// Redacted form for diagnostics. Shows only the first 8 characters.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        format!("{}…", prefix)
    }
}
