//! Identity-layer documents consumed, not owned, by this core
//!
//! Profiles supply the display name and email joined into the admin request
//! list; user_roles supply the `(user_id, role)` facts the role resolver
//! queries. Both collections are written by the identity layer and read-only
//! here.

use serde::{Deserialize, Serialize};

/// Collection name for user profiles
pub const PROFILE_COLLECTION: &str = "profiles";

/// Collection name for role facts
pub const USER_ROLE_COLLECTION: &str = "user_roles";

/// User profile as written by the identity layer
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ProfileDoc {
    /// Principal this profile belongs to
    pub user_id: String,

    /// Display name
    #[serde(default)]
    pub full_name: String,

    /// Contact email
    #[serde(default)]
    pub email: String,
}

/// A single role fact
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserRoleDoc {
    /// Principal holding the role
    pub user_id: String,

    /// Role label, e.g. "admin"
    pub role: String,
}
