//! Logging infrastructure for Rotunda
//!
//! Structured tracing output plus a JSONL audit trail for admin operations.

pub mod audit;

pub use audit::{AuditEvent, AuditEventType, AuditLogger};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing output. Honors RUST_LOG when set, otherwise scopes
/// the given level to this crate. Call once at startup.
pub fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rotunda={log_level},info").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
