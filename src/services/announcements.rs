//! Announcement publisher
//!
//! Admin-only creation with immediate publication, and the public
//! newest-first feed query used by the homepage.

use std::sync::Arc;
use tracing::info;

use crate::auth::AccessGate;
use crate::db::schemas::{AnnouncementDoc, Priority};
use crate::db::store::AnnouncementStore;
use crate::logging::{AuditEventType, AuditLogger};
use crate::types::{PortalError, Result};

/// How many announcements the public homepage feed shows
pub const PUBLIC_FEED_LIMIT: usize = 3;

/// Announcement operations
pub struct AnnouncementService {
    store: Arc<dyn AnnouncementStore>,
    gate: AccessGate,
    audit: AuditLogger,
}

impl AnnouncementService {
    pub fn new(store: Arc<dyn AnnouncementStore>, gate: AccessGate, audit: AuditLogger) -> Self {
        Self { store, gate, audit }
    }

    /// Create and immediately publish an announcement. Admin only.
    /// Priority defaults to normal when unset. There is no draft path.
    pub async fn create(
        &self,
        principal_id: &str,
        title: &str,
        content: &str,
        priority: Option<&str>,
    ) -> Result<AnnouncementDoc> {
        let admin = self
            .gate
            .require_admin("create_announcement", principal_id)
            .await?;

        let priority = match priority {
            Some(p) => p.parse::<Priority>()?,
            None => Priority::Normal,
        };

        let title = title.trim();
        let content = content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(PortalError::Validation(
                "title and content are required".to_string(),
            ));
        }

        let stored = self
            .store
            .insert(AnnouncementDoc::new(title, content, priority))
            .await?;

        info!(
            "Announcement {:?} ({}) published by {}",
            stored.title, stored.priority, admin
        );
        self.audit
            .log_admin_action(
                AuditEventType::AnnouncementPublished,
                admin.id(),
                &stored.title,
                serde_json::json!({ "priority": stored.priority.to_string() }),
            )
            .await;

        Ok(stored)
    }

    /// Published announcements, newest first, truncated to limit.
    /// Public: no authentication required.
    pub async fn list_published(&self, limit: usize) -> Result<Vec<AnnouncementDoc>> {
        self.store.list_published_desc(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn service(store: Arc<MemoryStore>) -> AnnouncementService {
        let gate = AccessGate::new(store.clone(), AuditLogger::new());
        AnnouncementService::new(store, gate, AuditLogger::new())
    }

    fn admin_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.grant_role("clerk-1", "admin");
        store
    }

    #[tokio::test]
    async fn test_create_publishes_immediately() {
        let svc = service(admin_store());
        let doc = svc
            .create("clerk-1", "Holiday closure", "Closed on Friday.", Some("high"))
            .await
            .unwrap();
        assert!(doc.published);
        assert_eq!(doc.priority, Priority::High);
    }

    #[tokio::test]
    async fn test_priority_defaults_to_normal() {
        let svc = service(admin_store());
        let doc = svc
            .create("clerk-1", "Holiday closure", "Closed on Friday.", None)
            .await
            .unwrap();
        assert_eq!(doc.priority, Priority::Normal);
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let store = admin_store();
        let svc = service(store.clone());

        let err = svc
            .create("visitor", "Holiday closure", "Closed on Friday.", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Authorization(_)));

        // Nothing was stored
        assert!(svc.list_published(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_validates_inputs() {
        let svc = service(admin_store());

        assert!(matches!(
            svc.create("clerk-1", "", "Closed on Friday.", None).await,
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            svc.create("clerk-1", "Holiday closure", "   ", None).await,
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            svc.create("clerk-1", "Holiday closure", "Closed.", Some("critical"))
                .await,
            Err(PortalError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_public_feed_limit_and_order() {
        let svc = service(admin_store());
        for i in 0..5 {
            svc.create(
                "clerk-1",
                &format!("Notice {i}"),
                "Some announcement body.",
                None,
            )
            .await
            .unwrap();
        }

        let feed = svc.list_published(PUBLIC_FEED_LIMIT).await.unwrap();
        assert_eq!(feed.len(), PUBLIC_FEED_LIMIT);
        assert!(feed.iter().all(|a| a.published));
        assert_eq!(feed[0].title, "Notice 4");
        let created: Vec<_> = feed
            .iter()
            .map(|a| a.metadata.created_at.unwrap())
            .collect();
        assert!(created.windows(2).all(|w| w[0] >= w[1]));
    }
}
