//! Store traits for the lifecycle services and their MongoDB implementations
//!
//! The services program against these traits so the backing store can be
//! swapped - MongoDB in production, the in-memory store in tests and dev.

use bson::doc;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::roles::RoleStore;
use crate::db::mongo::MongoClient;
use crate::db::schemas::{
    AnnouncementDoc, FeedbackDoc, FeedbackStatus, ProfileDoc, RequestStatus, ServiceRequestDoc,
    UserRoleDoc, ANNOUNCEMENT_COLLECTION, FEEDBACK_COLLECTION, PROFILE_COLLECTION,
    SERVICE_REQUEST_COLLECTION, USER_ROLE_COLLECTION,
};
use crate::types::{PortalError, Result};

/// A service request joined with its requester's profile, as shown in the
/// admin listing
#[derive(Debug, Clone, Serialize)]
pub struct RequestWithRequester {
    #[serde(flatten)]
    pub request: ServiceRequestDoc,
    /// Requester display name; empty when no profile exists
    pub requester_name: String,
    /// Requester email; empty when no profile exists
    pub requester_email: String,
}

/// The full set of fields written by one review, applied as a single
/// atomic document update
#[derive(Debug, Clone)]
pub struct ReviewUpdate {
    pub status: RequestStatus,
    /// Always overwritten, empty string included
    pub admin_notes: String,
    /// Some overwrites, None clears the stored value
    pub document_url: Option<String>,
    pub reviewed_by: String,
    pub reviewed_at: DateTime<Utc>,
}

/// Persistence seam for service requests
#[async_trait::async_trait]
pub trait RequestStore: Send + Sync {
    /// Insert a new request, stamping metadata. Rejects a duplicate
    /// reference number with a conflict.
    async fn insert(&self, doc: ServiceRequestDoc) -> Result<ServiceRequestDoc>;

    /// Point lookup by id
    async fn get(&self, id: Uuid) -> Result<Option<ServiceRequestDoc>>;

    /// All requests joined with requester profiles, newest first
    async fn list_with_requesters(&self) -> Result<Vec<RequestWithRequester>>;

    /// Apply a review as one atomic update. Returns the updated document,
    /// or None when the id does not exist.
    async fn apply_review(&self, id: Uuid, review: ReviewUpdate)
        -> Result<Option<ServiceRequestDoc>>;
}

/// Persistence seam for feedback
#[async_trait::async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Insert a new feedback item, stamping metadata
    async fn insert(&self, doc: FeedbackDoc) -> Result<FeedbackDoc>;

    /// All feedback, newest first
    async fn list_desc(&self) -> Result<Vec<FeedbackDoc>>;

    /// Set the status of one item. Returns the updated document, or None
    /// when the id does not exist.
    async fn set_status(&self, id: Uuid, status: FeedbackStatus) -> Result<Option<FeedbackDoc>>;
}

/// Persistence seam for announcements
#[async_trait::async_trait]
pub trait AnnouncementStore: Send + Sync {
    /// Insert a new announcement, stamping metadata
    async fn insert(&self, doc: AnnouncementDoc) -> Result<AnnouncementDoc>;

    /// Published announcements only, newest first, truncated to limit
    async fn list_published_desc(&self, limit: usize) -> Result<Vec<AnnouncementDoc>>;
}

// =============================================================================
// MongoDB Implementations
// =============================================================================

fn to_bson<T: Serialize>(value: &T) -> Result<bson::Bson> {
    bson::to_bson(value).map_err(|e| PortalError::Database(format!("BSON encoding failed: {e}")))
}

/// MongoDB-backed request store
pub struct MongoRequestStore {
    mongo: MongoClient,
}

impl MongoRequestStore {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }
}

#[async_trait::async_trait]
impl RequestStore for MongoRequestStore {
    async fn insert(&self, doc: ServiceRequestDoc) -> Result<ServiceRequestDoc> {
        let collection = self
            .mongo
            .collection::<ServiceRequestDoc>(SERVICE_REQUEST_COLLECTION)
            .await?;
        collection.insert_one(doc).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<ServiceRequestDoc>> {
        let collection = self
            .mongo
            .collection::<ServiceRequestDoc>(SERVICE_REQUEST_COLLECTION)
            .await?;
        collection.find_one(doc! { "_id": to_bson(&id)? }).await
    }

    async fn list_with_requesters(&self) -> Result<Vec<RequestWithRequester>> {
        let collection = self
            .mongo
            .collection::<ServiceRequestDoc>(SERVICE_REQUEST_COLLECTION)
            .await?;

        let requests = collection
            .find_many(doc! {}, Some(doc! { "metadata.created_at": -1 }), None)
            .await?;

        // Pull the matching profiles in one query and join in memory
        let requester_ids: Vec<&str> = requests.iter().map(|r| r.requester_id.as_str()).collect();
        let profiles = self.profiles_by_user_id(&requester_ids).await?;

        Ok(requests
            .into_iter()
            .map(|request| {
                let profile = profiles.get(request.requester_id.as_str());
                RequestWithRequester {
                    requester_name: profile.map(|p| p.full_name.clone()).unwrap_or_default(),
                    requester_email: profile.map(|p| p.email.clone()).unwrap_or_default(),
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
        let collection = self
            .mongo
            .collection::<ServiceRequestDoc>(SERVICE_REQUEST_COLLECTION)
            .await?;

        let mut set_doc = doc! {
            "status": to_bson(&review.status)?,
            "admin_notes": review.admin_notes.clone(),
            "reviewed_by": review.reviewed_by.clone(),
            "reviewed_at": to_bson(&review.reviewed_at)?,
            "metadata.updated_at": to_bson(&Utc::now())?,
        };

        // Empty document_url clears the stored value; admin_notes above is
        // stored verbatim, empty string included
        let update = match &review.document_url {
            Some(url) => {
                set_doc.insert("document_url", url.clone());
                doc! { "$set": set_doc }
            }
            None => doc! { "$set": set_doc, "$unset": { "document_url": "" } },
        };

        collection
            .find_one_and_update(doc! { "_id": to_bson(&id)? }, update)
            .await
    }
}

impl MongoRequestStore {
    async fn profiles_by_user_id(&self, user_ids: &[&str]) -> Result<HashMap<String, ProfileDoc>> {
        use futures_util::StreamExt;

        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let collection = self
            .mongo
            .inner()
            .database(self.mongo.db_name())
            .collection::<ProfileDoc>(PROFILE_COLLECTION);

        let mut cursor = collection
            .find(doc! { "user_id": { "$in": user_ids.to_vec() } })
            .await
            .map_err(|e| PortalError::Database(format!("Profile lookup failed: {e}")))?;

        let mut profiles = HashMap::new();
        while let Some(result) = cursor.next().await {
            match result {
                Ok(profile) => {
                    profiles.insert(profile.user_id.clone(), profile);
                }
                Err(e) => {
                    tracing::error!("Error reading profile document: {}", e);
                }
            }
        }

        Ok(profiles)
    }
}

/// MongoDB-backed feedback store
pub struct MongoFeedbackStore {
    mongo: MongoClient,
}

impl MongoFeedbackStore {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }
}

#[async_trait::async_trait]
impl FeedbackStore for MongoFeedbackStore {
    async fn insert(&self, doc: FeedbackDoc) -> Result<FeedbackDoc> {
        let collection = self
            .mongo
            .collection::<FeedbackDoc>(FEEDBACK_COLLECTION)
            .await?;
        collection.insert_one(doc).await
    }

    async fn list_desc(&self) -> Result<Vec<FeedbackDoc>> {
        let collection = self
            .mongo
            .collection::<FeedbackDoc>(FEEDBACK_COLLECTION)
            .await?;
        collection
            .find_many(doc! {}, Some(doc! { "metadata.created_at": -1 }), None)
            .await
    }

    async fn set_status(&self, id: Uuid, status: FeedbackStatus) -> Result<Option<FeedbackDoc>> {
        let collection = self
            .mongo
            .collection::<FeedbackDoc>(FEEDBACK_COLLECTION)
            .await?;
        collection
            .find_one_and_update(
                doc! { "_id": to_bson(&id)? },
                doc! { "$set": {
                    "status": to_bson(&status)?,
                    "metadata.updated_at": to_bson(&Utc::now())?,
                } },
            )
            .await
    }
}

/// MongoDB-backed announcement store
pub struct MongoAnnouncementStore {
    mongo: MongoClient,
}

impl MongoAnnouncementStore {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }
}

#[async_trait::async_trait]
impl AnnouncementStore for MongoAnnouncementStore {
    async fn insert(&self, doc: AnnouncementDoc) -> Result<AnnouncementDoc> {
        let collection = self
            .mongo
            .collection::<AnnouncementDoc>(ANNOUNCEMENT_COLLECTION)
            .await?;
        collection.insert_one(doc).await
    }

    async fn list_published_desc(&self, limit: usize) -> Result<Vec<AnnouncementDoc>> {
        let collection = self
            .mongo
            .collection::<AnnouncementDoc>(ANNOUNCEMENT_COLLECTION)
            .await?;
        collection
            .find_many(
                doc! { "published": true },
                Some(doc! { "metadata.created_at": -1 }),
                Some(limit as i64),
            )
            .await
    }
}

/// MongoDB-backed role store, reading the identity layer's role facts
pub struct MongoRoleStore {
    mongo: MongoClient,
}

impl MongoRoleStore {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }
}

#[async_trait::async_trait]
impl RoleStore for MongoRoleStore {
    async fn has_role(&self, principal_id: &str, role: &str) -> Result<bool> {
        let collection = self
            .mongo
            .inner()
            .database(self.mongo.db_name())
            .collection::<UserRoleDoc>(USER_ROLE_COLLECTION);

        let found = collection
            .find_one(doc! { "user_id": principal_id, "role": role })
            .await
            .map_err(|e| PortalError::Database(format!("Role lookup failed: {e}")))?;

        Ok(found.is_some())
    }
}
