//! Feedback lifecycle manager
//!
//! Public contact-form submission plus admin triage. The status machine is
//! deliberately loose: any of the three states may be set from any prior
//! state by an admin.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::AccessGate;
use crate::db::schemas::{FeedbackDoc, FeedbackStatus};
use crate::db::store::FeedbackStore;
use crate::logging::{AuditEventType, AuditLogger};
use crate::types::{PortalError, Result};

/// Maximum message length, in characters
pub const MESSAGE_MAX_CHARS: usize = 2000;

/// Feedback lifecycle operations
pub struct FeedbackService {
    store: Arc<dyn FeedbackStore>,
    gate: AccessGate,
    audit: AuditLogger,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn FeedbackStore>, gate: AccessGate, audit: AuditLogger) -> Self {
        Self { store, gate, audit }
    }

    /// Submit a feedback item. Public: no authentication required.
    pub async fn submit(
        &self,
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
    ) -> Result<FeedbackDoc> {
        let name = name.trim();
        let email = email.trim();
        let subject = subject.trim();
        let message = message.trim();

        if name.is_empty() || email.is_empty() || subject.is_empty() || message.is_empty() {
            return Err(PortalError::Validation(
                "name, email, subject, and message are all required".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(PortalError::Validation(format!(
                "invalid email address: {email:?}"
            )));
        }
        if message.chars().count() > MESSAGE_MAX_CHARS {
            return Err(PortalError::Validation(format!(
                "message must be at most {MESSAGE_MAX_CHARS} characters"
            )));
        }

        let stored = self
            .store
            .insert(FeedbackDoc::new(name, email, subject, message))
            .await?;
        info!("Feedback {} submitted by {}", stored.id, stored.email);
        Ok(stored)
    }

    /// List all feedback, newest first. Admin only.
    pub async fn list(&self, principal_id: &str) -> Result<Vec<FeedbackDoc>> {
        self.gate.require_admin("list_feedback", principal_id).await?;
        self.store.list_desc().await
    }

    /// Set a feedback item's status. Admin only. Accepts any of the three
    /// states regardless of the prior one.
    pub async fn set_status(
        &self,
        principal_id: &str,
        feedback_id: Uuid,
        status: &str,
    ) -> Result<FeedbackDoc> {
        let admin = self
            .gate
            .require_admin("set_feedback_status", principal_id)
            .await?;

        let status: FeedbackStatus = status.parse()?;

        let updated = self
            .store
            .set_status(feedback_id, status)
            .await?
            .ok_or_else(|| PortalError::NotFound(format!("feedback {feedback_id}")))?;

        info!(
            "Feedback {} marked {} by {}",
            updated.id, updated.status, admin
        );
        self.audit
            .log_admin_action(
                AuditEventType::FeedbackStatusChanged,
                admin.id(),
                &updated.id.to_string(),
                serde_json::json!({ "status": updated.status.to_string() }),
            )
            .await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn service(store: Arc<MemoryStore>) -> FeedbackService {
        let gate = AccessGate::new(store.clone(), AuditLogger::new());
        FeedbackService::new(store, gate, AuditLogger::new())
    }

    fn admin_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.grant_role("clerk-1", "admin");
        store
    }

    #[tokio::test]
    async fn test_submit_is_public_and_starts_new() {
        let svc = service(admin_store());
        let doc = svc
            .submit(
                "Ada Citizen",
                "ada@example.org",
                "Office hours",
                "The posted office hours are out of date.",
            )
            .await
            .unwrap();
        assert_eq!(doc.status, FeedbackStatus::New);
        assert!(doc.metadata.created_at.is_some());
    }

    #[tokio::test]
    async fn test_submit_validates_fields() {
        let svc = service(admin_store());

        assert!(matches!(
            svc.submit("", "ada@example.org", "Hours", "Message body").await,
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            svc.submit("Ada", "not-an-email", "Hours", "Message body").await,
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            svc.submit("Ada", "ada@example.org", "Hours", "").await,
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            svc.submit(
                "Ada",
                "ada@example.org",
                "Hours",
                &"x".repeat(MESSAGE_MAX_CHARS + 1)
            )
            .await,
            Err(PortalError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_requires_admin_and_sorts_desc() {
        let svc = service(admin_store());
        for i in 0..3 {
            svc.submit(
                "Ada Citizen",
                "ada@example.org",
                &format!("Subject {i}"),
                "Some message body for the office.",
            )
            .await
            .unwrap();
        }

        assert!(matches!(
            svc.list("visitor").await,
            Err(PortalError::Authorization(_))
        ));

        let listed = svc.list("clerk-1").await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].subject, "Subject 2");
        let created: Vec<_> = listed
            .iter()
            .map(|f| f.metadata.created_at.unwrap())
            .collect();
        assert!(created.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_set_status_any_transition() {
        let svc = service(admin_store());
        let doc = svc
            .submit(
                "Ada Citizen",
                "ada@example.org",
                "Office hours",
                "The posted office hours are out of date.",
            )
            .await
            .unwrap();

        let updated = svc
            .set_status("clerk-1", doc.id, "responded")
            .await
            .unwrap();
        assert_eq!(updated.status, FeedbackStatus::Responded);

        // Moving back to new is accepted: no ordering is enforced
        let updated = svc.set_status("clerk-1", doc.id, "new").await.unwrap();
        assert_eq!(updated.status, FeedbackStatus::New);
    }

    #[tokio::test]
    async fn test_set_status_is_idempotent() {
        let svc = service(admin_store());
        let doc = svc
            .submit(
                "Ada Citizen",
                "ada@example.org",
                "Office hours",
                "The posted office hours are out of date.",
            )
            .await
            .unwrap();

        let first = svc.set_status("clerk-1", doc.id, "reviewed").await.unwrap();
        assert_eq!(first.status, FeedbackStatus::Reviewed);
        let second = svc.set_status("clerk-1", doc.id, "reviewed").await.unwrap();
        assert_eq!(second.status, FeedbackStatus::Reviewed);
    }

    #[tokio::test]
    async fn test_set_status_denied_mutates_nothing() {
        let store = admin_store();
        let svc = service(store.clone());
        let doc = svc
            .submit(
                "Ada Citizen",
                "ada@example.org",
                "Office hours",
                "The posted office hours are out of date.",
            )
            .await
            .unwrap();

        let err = svc
            .set_status("visitor", doc.id, "reviewed")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Authorization(_)));

        let listed = svc.list("clerk-1").await.unwrap();
        assert_eq!(listed[0].status, FeedbackStatus::New);
    }

    #[tokio::test]
    async fn test_set_status_missing_is_not_found() {
        let svc = service(admin_store());
        let err = svc
            .set_status("clerk-1", Uuid::new_v4(), "reviewed")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_status_rejects_unknown_value() {
        let svc = service(admin_store());
        let doc = svc
            .submit(
                "Ada Citizen",
                "ada@example.org",
                "Office hours",
                "The posted office hours are out of date.",
            )
            .await
            .unwrap();

        let err = svc
            .set_status("clerk-1", doc.id, "archived")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
    }
}
