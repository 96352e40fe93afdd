//! Typed principal capability
//!
//! Every core operation receives the acting principal (or the id to resolve
//! one from) explicitly; there is no ambient session state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An actor issuing an operation, with its resolved capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Principal {
    /// Authenticated principal holding the admin role
    Admin(String),
    /// Authenticated principal without the admin role
    Citizen(String),
    /// No authenticated session
    Anonymous,
}

impl Principal {
    /// Principal identifier, if authenticated
    pub fn id(&self) -> Option<&str> {
        match self {
            Principal::Admin(id) | Principal::Citizen(id) => Some(id),
            Principal::Anonymous => None,
        }
    }

    /// Whether this principal holds the admin capability
    pub fn is_admin(&self) -> bool {
        matches!(self, Principal::Admin(_))
    }

    /// Whether this principal is authenticated at all
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Principal::Anonymous)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Admin(id) => write!(f, "admin:{id}"),
            Principal::Citizen(id) => write!(f, "citizen:{id}"),
            Principal::Anonymous => write!(f, "anonymous"),
        }
    }
}
