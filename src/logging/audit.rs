//! Audit logging for admin operations and denied access
//!
//! Appends events in JSONL format for the operations team. Audit failures
//! are logged and swallowed; they never fail the operation being audited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Audit event types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// An admin reviewed a service request
    RequestReviewed,
    /// An admin changed a feedback item's status
    FeedbackStatusChanged,
    /// An admin published an announcement
    AnnouncementPublished,
    /// A gated operation was attempted without the admin role
    AccessDenied,
}

/// A single audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// Event type
    pub event_type: AuditEventType,
    /// Acting principal, if authenticated
    pub actor: Option<String>,
    /// Entity acted upon (reference number or id)
    pub target: Option<String>,
    /// Operation name, for denied-access events
    pub operation: Option<String>,
    /// Additional detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            actor: None,
            target: None,
            operation: None,
            detail: None,
        }
    }

    /// Set the acting principal
    pub fn with_actor(mut self, actor: String) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set the target entity
    pub fn with_target(mut self, target: String) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the operation name
    pub fn with_operation(mut self, operation: String) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Attach detail
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Convert to JSONL line
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Audit logger that writes events to a JSONL file.
/// A logger without an initialized file drops events silently, which keeps
/// test setups and embedders that do their own auditing out of the way.
#[derive(Clone)]
pub struct AuditLogger {
    inner: Arc<Mutex<AuditLoggerInner>>,
}

struct AuditLoggerInner {
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl AuditLogger {
    /// Create a new audit logger with no output configured
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(AuditLoggerInner {
                writer: None,
                path: None,
            })),
        }
    }

    /// Initialize file logging to the specified path
    pub async fn init_file(&self, path: PathBuf) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let writer = BufWriter::new(file);

        let mut inner = self.inner.lock().await;
        inner.writer = Some(writer);
        inner.path = Some(path.clone());

        info!("Audit logging initialized to {}", path.display());
        Ok(())
    }

    /// Log an audit event
    pub async fn log(&self, event: AuditEvent) {
        let jsonl = match event.to_jsonl() {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize audit event: {}", e);
                return;
            }
        };

        let mut inner = self.inner.lock().await;

        if let Some(ref mut writer) = inner.writer {
            if let Err(e) = writeln!(writer, "{}", jsonl) {
                error!("Failed to write audit event: {}", e);
            }
            if let Err(e) = writer.flush() {
                error!("Failed to flush audit log: {}", e);
            }
        }
    }

    /// Log a successful admin action
    pub async fn log_admin_action(
        &self,
        event_type: AuditEventType,
        actor: Option<&str>,
        target: &str,
        detail: serde_json::Value,
    ) {
        let mut event = AuditEvent::new(event_type)
            .with_target(target.to_string())
            .with_detail(detail);

        if let Some(actor) = actor {
            event = event.with_actor(actor.to_string());
        }

        self.log(event).await;
    }

    /// Log a denied gated operation
    pub async fn log_access_denied(&self, operation: &str, actor: Option<&str>) {
        let mut event =
            AuditEvent::new(AuditEventType::AccessDenied).with_operation(operation.to_string());

        if let Some(actor) = actor {
            event = event.with_actor(actor.to_string());
        }

        self.log(event).await;
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = AuditEvent::new(AuditEventType::RequestReviewed)
            .with_actor("clerk-1".to_string())
            .with_target("REQ-20250314-ABCDEF".to_string())
            .with_detail(serde_json::json!({ "status": "approved" }));

        let jsonl = event.to_jsonl().unwrap();
        assert!(jsonl.contains("request_reviewed"));
        assert!(jsonl.contains("clerk-1"));
        assert!(jsonl.contains("REQ-20250314-ABCDEF"));
        assert!(jsonl.contains("approved"));
    }

    #[test]
    fn test_denied_event_serialization() {
        let event = AuditEvent::new(AuditEventType::AccessDenied)
            .with_operation("list_requests".to_string());

        let jsonl = event.to_jsonl().unwrap();
        assert!(jsonl.contains("access_denied"));
        assert!(jsonl.contains("list_requests"));
        // No actor on anonymous attempts
        assert!(jsonl.contains("\"actor\":null"));
    }

    #[tokio::test]
    async fn test_unconfigured_logger_is_a_noop() {
        let logger = AuditLogger::new();
        // Must not error or block
        logger.log_access_denied("list_feedback", Some("visitor")).await;
    }

    #[tokio::test]
    async fn test_file_logging_appends_jsonl() {
        let path = std::env::temp_dir().join(format!(
            "rotunda-audit-test-{}.jsonl",
            uuid::Uuid::new_v4()
        ));
        let logger = AuditLogger::new();
        logger.init_file(path.clone()).await.unwrap();

        logger
            .log_admin_action(
                AuditEventType::AnnouncementPublished,
                Some("clerk-1"),
                "Holiday closure",
                serde_json::json!({ "priority": "high" }),
            )
            .await;
        logger.log_access_denied("review_request", None).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("announcement_published"));
        assert!(lines[1].contains("access_denied"));

        let _ = std::fs::remove_file(&path);
    }
}
