//! Caller identity for the mutation and query surface
//!
//! Session issuance and credential exchange are external collaborators;
//! this module only models the identity a transport hands us. Ownership
//! checks themselves live in the repository's owner-scoped queries, so a
//! foreign id and a missing id are indistinguishable to callers.

use crate::error::{ServiceError, ServiceResult};

/// An authenticated (or anonymous) caller session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    owner: Option<String>,
}

impl Session {
    /// Create a session for an authenticated owner
    pub fn authenticated(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
        }
    }

    /// Create a session with no identity attached
    pub fn anonymous() -> Self {
        Self { owner: None }
    }

    /// The owner identity, if authenticated
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The owner identity, or `NotAuthorized`.
    ///
    /// Every mutating call goes through this gate first.
    pub fn require_owner(&self) -> ServiceResult<&str> {
        self.owner.as_deref().ok_or(ServiceError::NotAuthorized)
    }
}
