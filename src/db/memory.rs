//! In-memory store
//!
//! Backs the test suite and dev setups without a MongoDB instance. Mirrors
//! the MongoDB implementation's contract exactly, including the unique
//! reference-number constraint: concurrent inserts contend on the reference
//! index the same way they would contend on the unique index.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::auth::roles::RoleStore;
use crate::db::schemas::{
    AnnouncementDoc, FeedbackDoc, FeedbackStatus, Metadata, ProfileDoc, ServiceRequestDoc,
};
use crate::db::store::{
    AnnouncementStore, FeedbackStore, RequestStore, RequestWithRequester, ReviewUpdate,
};
use crate::types::{PortalError, Result};

/// In-memory store with concurrent access
#[derive(Default)]
pub struct MemoryStore {
    requests: DashMap<Uuid, ServiceRequestDoc>,
    /// reference_number -> request id, standing in for the unique index
    reference_index: DashMap<String, Uuid>,
    feedback: DashMap<Uuid, FeedbackDoc>,
    announcements: DashMap<Uuid, AnnouncementDoc>,
    profiles: DashMap<String, ProfileDoc>,
    /// user_id -> role labels
    roles: DashMap<String, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a role fact for a principal
    pub fn grant_role(&self, user_id: &str, role: &str) {
        self.roles
            .entry(user_id.to_string())
            .or_default()
            .push(role.to_string());
    }

    /// Seed a profile, as the identity layer would
    pub fn insert_profile(&self, profile: ProfileDoc) {
        self.profiles.insert(profile.user_id.clone(), profile);
    }
}

#[async_trait::async_trait]
impl RequestStore for MemoryStore {
    async fn insert(&self, mut doc: ServiceRequestDoc) -> Result<ServiceRequestDoc> {
        // Claiming the reference index entry is the atomic uniqueness check
        match self.reference_index.entry(doc.reference_number.clone()) {
            Entry::Occupied(_) => Err(PortalError::Conflict(format!(
                "duplicate reference number {}",
                doc.reference_number
            ))),
            Entry::Vacant(slot) => {
                slot.insert(doc.id);
                doc.metadata = Metadata::new();
                self.requests.insert(doc.id, doc.clone());
                Ok(doc)
            }
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<ServiceRequestDoc>> {
        Ok(self.requests.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_with_requesters(&self) -> Result<Vec<RequestWithRequester>> {
        let mut requests: Vec<ServiceRequestDoc> = self
            .requests
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        requests.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));

        Ok(requests
            .into_iter()
            .map(|request| {
                let profile = self.profiles.get(request.requester_id.as_str());
                RequestWithRequester {
                    requester_name: profile
                        .as_ref()
                        .map(|p| p.full_name.clone())
                        .unwrap_or_default(),
                    requester_email: profile
                        .as_ref()
                        .map(|p| p.email.clone())
                        .unwrap_or_default(),
                    request,
                }
            })
            .collect())
    }

    async fn apply_review(
        &self,
        id: Uuid,
        review: ReviewUpdate,
    ) -> Result<Option<ServiceRequestDoc>> {
        match self.requests.get_mut(&id) {
            Some(mut entry) => {
                // All fields change under the shard lock, so the update is
                // atomic with respect to concurrent reviews
                let doc = entry.value_mut();
                doc.status = review.status;
                doc.admin_notes = Some(review.admin_notes);
                doc.document_url = review.document_url;
                doc.reviewed_by = Some(review.reviewed_by);
                doc.reviewed_at = Some(review.reviewed_at);
                doc.metadata.updated_at = Some(Utc::now());
                Ok(Some(doc.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl FeedbackStore for MemoryStore {
    async fn insert(&self, mut doc: FeedbackDoc) -> Result<FeedbackDoc> {
        doc.metadata = Metadata::new();
        self.feedback.insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn list_desc(&self) -> Result<Vec<FeedbackDoc>> {
        let mut items: Vec<FeedbackDoc> = self
            .feedback
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));
        Ok(items)
    }

    async fn set_status(&self, id: Uuid, status: FeedbackStatus) -> Result<Option<FeedbackDoc>> {
        match self.feedback.get_mut(&id) {
            Some(mut entry) => {
                let doc = entry.value_mut();
                doc.status = status;
                doc.metadata.updated_at = Some(Utc::now());
                Ok(Some(doc.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl AnnouncementStore for MemoryStore {
    async fn insert(&self, mut doc: AnnouncementDoc) -> Result<AnnouncementDoc> {
        doc.metadata = Metadata::new();
        self.announcements.insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn list_published_desc(&self, limit: usize) -> Result<Vec<AnnouncementDoc>> {
        let mut items: Vec<AnnouncementDoc> = self
            .announcements
            .iter()
            .filter(|entry| entry.value().published)
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));
        items.truncate(limit);
        Ok(items)
    }
}

#[async_trait::async_trait]
impl RoleStore for MemoryStore {
    async fn has_role(&self, principal_id: &str, role: &str) -> Result<bool> {
        Ok(self
            .roles
            .get(principal_id)
            .map(|labels| labels.iter().any(|l| l == role))
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{Priority, ServiceType};

    fn request(reference: &str) -> ServiceRequestDoc {
        ServiceRequestDoc::new(
            "citizen-1",
            ServiceType::Permit,
            "Parking permit for the street market",
            reference.to_string(),
        )
    }

    #[tokio::test]
    async fn test_insert_stamps_metadata() {
        let store = MemoryStore::new();
        let stored = RequestStore::insert(&store, request("REQ-20250314-AAAAAA"))
            .await
            .unwrap();
        assert!(stored.metadata.created_at.is_some());
        assert!(stored.metadata.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_reference_number_conflicts() {
        let store = MemoryStore::new();
        RequestStore::insert(&store, request("REQ-20250314-AAAAAA"))
            .await
            .unwrap();
        let err = RequestStore::insert(&store, request("REQ-20250314-AAAAAA"))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_joins_profiles_and_sorts_desc() {
        let store = MemoryStore::new();
        store.insert_profile(ProfileDoc {
            user_id: "citizen-1".to_string(),
            full_name: "Ada Citizen".to_string(),
            email: "ada@example.org".to_string(),
        });

        RequestStore::insert(&store, request("REQ-20250314-AAAAAA"))
            .await
            .unwrap();
        RequestStore::insert(&store, request("REQ-20250314-BBBBBB"))
            .await
            .unwrap();

        let listed = store.list_with_requesters().await.unwrap();
        assert_eq!(listed.len(), 2);
        // Newest first
        assert_eq!(listed[0].request.reference_number, "REQ-20250314-BBBBBB");
        assert_eq!(listed[0].requester_name, "Ada Citizen");
        assert_eq!(listed[0].requester_email, "ada@example.org");
    }

    #[tokio::test]
    async fn test_missing_profile_joins_empty_fields() {
        let store = MemoryStore::new();
        RequestStore::insert(&store, request("REQ-20250314-AAAAAA"))
            .await
            .unwrap();
        let listed = store.list_with_requesters().await.unwrap();
        assert_eq!(listed[0].requester_name, "");
        assert_eq!(listed[0].requester_email, "");
    }

    #[tokio::test]
    async fn test_published_filter_and_limit() {
        let store = MemoryStore::new();
        for i in 0..5 {
            let mut doc = AnnouncementDoc::new(&format!("Notice {i}"), "Body", Priority::Normal);
            doc.published = i % 2 == 0;
            AnnouncementStore::insert(&store, doc).await.unwrap();
        }

        let listed = store.list_published_desc(2).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|a| a.published));
    }

    #[tokio::test]
    async fn test_role_facts() {
        let store = MemoryStore::new();
        store.grant_role("clerk-1", "admin");
        assert!(store.has_role("clerk-1", "admin").await.unwrap());
        assert!(!store.has_role("clerk-1", "auditor").await.unwrap());
        assert!(!store.has_role("visitor", "admin").await.unwrap());
    }
}
