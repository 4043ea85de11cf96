//! Per-request access decisions.
//!
//! The guard is side-effect-free: it inspects the identity the HTTP
//! surface resolved (or failed to resolve) and returns a decision. Acting
//! on a denial, typically a redirect to the login page, is the caller's
//! job.

use crate::auth::context::ResolvedIdentity;

/// A named permission checked by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Satisfied by any resolved identity. The only capability any route
    /// in this system currently requires.
    Authenticated,
    /// Additionally requires the administrator role. Declared for forward
    /// compatibility; no route requires it yet.
    Administrator,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No resolvable identity was attached to the request
    NotAuthenticated,
    /// The identity lacks the role the capability requires
    InsufficientRole,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Check whether the given identity satisfies the required capability.
pub fn authorize(identity: Option<&ResolvedIdentity>, required: Capability) -> Decision {
    let Some(identity) = identity else {
        return Decision::Deny(DenyReason::NotAuthenticated);
    };

    match required {
        Capability::Authenticated => Decision::Allow,
        Capability::Administrator => {
            if identity.is_administrator() {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::InsufficientRole)
            }
        }
    }
}
