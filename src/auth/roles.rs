//! Role resolution
//!
//! The role store is an external identity fact: a `(principal_id, role)`
//! membership lookup. This core only ever asks about `admin`, and a lookup
//! failure resolves to non-admin. A store outage can deny an admin access;
//! it can never grant it.

use tracing::warn;

use crate::auth::principal::Principal;
use crate::types::Result;

/// The one role label this core queries
pub const ADMIN_ROLE: &str = "admin";

/// External role-fact lookup
#[async_trait::async_trait]
pub trait RoleStore: Send + Sync {
    /// Whether the principal holds the given role
    async fn has_role(&self, principal_id: &str, role: &str) -> Result<bool>;
}

/// Resolve a principal id into a typed capability.
/// Empty id means no authenticated session.
pub async fn resolve_principal(store: &dyn RoleStore, principal_id: &str) -> Principal {
    let id = principal_id.trim();
    if id.is_empty() {
        return Principal::Anonymous;
    }

    match store.has_role(id, ADMIN_ROLE).await {
        Ok(true) => Principal::Admin(id.to_string()),
        Ok(false) => Principal::Citizen(id.to_string()),
        Err(e) => {
            // Fail closed: an unreachable role store never grants admin
            warn!("Role lookup failed for {}: {} - treating as non-admin", id, e);
            Principal::Citizen(id.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PortalError;
    use std::collections::HashSet;

    struct FixedRoles(HashSet<String>);

    #[async_trait::async_trait]
    impl RoleStore for FixedRoles {
        async fn has_role(&self, principal_id: &str, role: &str) -> Result<bool> {
            Ok(role == ADMIN_ROLE && self.0.contains(principal_id))
        }
    }

    struct BrokenRoles;

    #[async_trait::async_trait]
    impl RoleStore for BrokenRoles {
        async fn has_role(&self, _principal_id: &str, _role: &str) -> Result<bool> {
            Err(PortalError::Database("role store unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_resolves_admin_and_citizen() {
        let store = FixedRoles(["clerk".to_string()].into_iter().collect());
        assert_eq!(
            resolve_principal(&store, "clerk").await,
            Principal::Admin("clerk".to_string())
        );
        assert_eq!(
            resolve_principal(&store, "visitor").await,
            Principal::Citizen("visitor".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_id_is_anonymous() {
        let store = FixedRoles(HashSet::new());
        assert_eq!(resolve_principal(&store, "").await, Principal::Anonymous);
        assert_eq!(resolve_principal(&store, "   ").await, Principal::Anonymous);
    }

    #[tokio::test]
    async fn test_lookup_error_fails_closed() {
        let principal = resolve_principal(&BrokenRoles, "clerk").await;
        assert!(!principal.is_admin());
        assert!(principal.is_authenticated());
    }
}
