//! Authorization policy.
//!
//! One binary rule guards the whole service: the signed-in user's verified
//! email must equal the single configured admin email for any write. Reads
//! only require a signed-in identity. The policy is an explicit function of
//! (caller identity, action) and is evaluated server-side on every route;
//! clients may also consult it to hide controls, but that is cosmetic.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Verified identity of the caller, as asserted by the external OAuth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// What the caller is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// List or fetch entries.
    Read,
    /// Create, update, delete, or bulk-import entries.
    Write,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No identity present; maps to HTTP 401.
    Unauthenticated,
    /// Identity present but not permitted; maps to HTTP 403.
    Forbidden,
}

/// The admin-email gate.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    admin_email: String,
}

impl AccessPolicy {
    pub fn new(admin_email: impl Into<String>) -> Self {
        Self {
            admin_email: admin_email.into(),
        }
    }

    /// Build the policy from the `ADMIN_EMAIL` environment variable.
    pub fn from_env() -> Result<Self> {
        let admin_email = std::env::var("ADMIN_EMAIL")
            .map_err(|_| Error::Config("ADMIN_EMAIL is not set".to_string()))?;
        if admin_email.trim().is_empty() {
            return Err(Error::Config("ADMIN_EMAIL is empty".to_string()));
        }
        Ok(Self::new(admin_email))
    }

    /// Decide whether `identity` may perform `action`.
    pub fn authorize(&self, identity: Option<&Identity>, action: Action) -> Decision {
        let Some(identity) = identity else {
            return Decision::Unauthenticated;
        };
        match action {
            Action::Read => Decision::Allow,
            Action::Write if identity.email == self.admin_email => Decision::Allow,
            Action::Write => Decision::Forbidden,
        }
    }

    /// Convenience for the `check-write-access` endpoint.
    pub fn has_write_access(&self, identity: &Identity) -> bool {
        self.authorize(Some(identity), Action::Write) == Decision::Allow
    }
}
