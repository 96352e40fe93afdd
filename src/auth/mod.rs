//! Authentication and authorization for Rotunda
//!
//! Provides:
//! - Typed principal capabilities (admin / citizen / anonymous)
//! - Role resolution against the external role store, failing closed
//! - The access-control gate wrapping all admin-only operations

pub mod gate;
pub mod principal;
pub mod roles;

pub use gate::AccessGate;
pub use principal::Principal;
pub use roles::{resolve_principal, RoleStore, ADMIN_ROLE};
