//! Caller identity attached to issuance requests.
//!
//! Authentication happens upstream; the token flow only receives an opaque
//! identity plus a privileged flag and bases its authorization checks on
//! those two facts.

use uuid::Uuid;

/// Identity of the caller requesting token issuance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Opaque user identity
    pub id: Uuid,

    /// Whether the caller may act on any subject (staff/admin)
    pub privileged: bool,
}

impl CallerIdentity {
    /// A regular caller bound by party checks
    pub fn user(id: Uuid) -> Self {
        Self {
            id,
            privileged: false,
        }
    }

    /// A privileged caller allowed to issue for any subject
    pub fn privileged(id: Uuid) -> Self {
        Self {
            id,
            privileged: true,
        }
    }
}
