//! Error types for Rotunda
//!
//! One crate-wide error enum. Variants map one-to-one onto the outcomes a
//! caller can act on: bad input, missing role, missing entity, a uniqueness
//! conflict, or an unreachable store.

use thiserror::Error;

/// Errors surfaced by portal operations
#[derive(Error, Debug)]
pub enum PortalError {
    /// Input outside the allowed shape or range. Never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// Principal lacks the required role or is unauthenticated.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// Target entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated on write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The persistent store failed or was unreachable. Surfaced uninterpreted.
    #[error("database error: {0}")]
    Database(String),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortalError::Validation("description too short".to_string());
        assert_eq!(err.to_string(), "validation error: description too short");

        let err = PortalError::Authorization("admin role required".to_string());
        assert!(err.to_string().starts_with("authorization error"));
    }
}
