//! Access-control gate for admin-only operations
//!
//! Every admin-only operation runs through `require_admin` before touching
//! the persistent store. Denials are logged as security-relevant events and
//! recorded in the audit trail.

use std::sync::Arc;
use tracing::warn;

use crate::auth::principal::Principal;
use crate::auth::roles::{resolve_principal, RoleStore};
use crate::logging::AuditLogger;
use crate::types::{PortalError, Result};

/// Policy check wrapping all admin-only operations
#[derive(Clone)]
pub struct AccessGate {
    roles: Arc<dyn RoleStore>,
    audit: AuditLogger,
}

impl AccessGate {
    pub fn new(roles: Arc<dyn RoleStore>, audit: AuditLogger) -> Self {
        Self { roles, audit }
    }

    /// Resolve the principal and require the admin capability.
    /// Runs before any read or write of the wrapped operation.
    pub async fn require_admin(&self, operation: &str, principal_id: &str) -> Result<Principal> {
        let principal = resolve_principal(self.roles.as_ref(), principal_id).await;

        if principal.is_admin() {
            return Ok(principal);
        }

        warn!("Access denied: {} attempted {}", principal, operation);
        self.audit
            .log_access_denied(operation, principal.id())
            .await;

        Err(PortalError::Authorization(format!(
            "admin role required for {operation}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::ADMIN_ROLE;
    use crate::types::PortalError;
    use std::collections::HashSet;

    struct FixedRoles(HashSet<String>);

    #[async_trait::async_trait]
    impl RoleStore for FixedRoles {
        async fn has_role(&self, principal_id: &str, role: &str) -> Result<bool> {
            Ok(role == ADMIN_ROLE && self.0.contains(principal_id))
        }
    }

    fn gate_with_admins(admins: &[&str]) -> AccessGate {
        let roles = FixedRoles(admins.iter().map(|s| s.to_string()).collect());
        AccessGate::new(Arc::new(roles), AuditLogger::new())
    }

    #[tokio::test]
    async fn test_admin_passes() {
        let gate = gate_with_admins(&["clerk-1"]);
        let principal = gate.require_admin("list_requests", "clerk-1").await.unwrap();
        assert_eq!(principal, Principal::Admin("clerk-1".to_string()));
    }

    #[tokio::test]
    async fn test_citizen_denied() {
        let gate = gate_with_admins(&["clerk-1"]);
        let err = gate
            .require_admin("list_requests", "visitor")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_anonymous_denied() {
        let gate = gate_with_admins(&["clerk-1"]);
        let err = gate.require_admin("list_requests", "").await.unwrap_err();
        assert!(matches!(err, PortalError::Authorization(_)));
    }
}
