//! Request lifecycle manager
//!
//! Owns the service request state machine: citizen creation, admin review,
//! and the terminal approved/rejected states. Creation allocates the unique
//! reference number; review is a single atomic overwrite with last-write-wins
//! semantics between concurrent admins.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AccessGate;
use crate::db::schemas::{RequestStatus, ServiceRequestDoc, ServiceType};
use crate::db::store::{RequestStore, RequestWithRequester, ReviewUpdate};
use crate::logging::{AuditEventType, AuditLogger};
use crate::reference::{ReferenceGenerator, RequestReferenceGenerator};
use crate::types::{PortalError, Result};

/// Minimum description length, in characters
pub const DESCRIPTION_MIN_CHARS: usize = 10;

/// Maximum description length, in characters
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Default reference-number attempts before a collision surfaces
pub const DEFAULT_REFERENCE_ATTEMPTS: u32 = 3;

/// Service request lifecycle operations
pub struct RequestService {
    store: Arc<dyn RequestStore>,
    gate: AccessGate,
    audit: AuditLogger,
    references: Arc<dyn ReferenceGenerator>,
    reference_max_attempts: u32,
}

impl RequestService {
    pub fn new(store: Arc<dyn RequestStore>, gate: AccessGate, audit: AuditLogger) -> Self {
        Self {
            store,
            gate,
            audit,
            references: Arc::new(RequestReferenceGenerator),
            reference_max_attempts: DEFAULT_REFERENCE_ATTEMPTS,
        }
    }

    /// Swap the reference number source
    pub fn with_reference_generator(mut self, references: Arc<dyn ReferenceGenerator>) -> Self {
        self.references = references;
        self
    }

    /// Override the collision retry budget
    pub fn with_reference_attempts(mut self, attempts: u32) -> Self {
        self.reference_max_attempts = attempts.max(1);
        self
    }

    /// Create a new pending request for an authenticated principal.
    /// The reference number is generated server-side; a collision on the
    /// unique index is retried with a fresh number before surfacing.
    pub async fn create(
        &self,
        requester_id: &str,
        service_type: &str,
        description: &str,
    ) -> Result<ServiceRequestDoc> {
        let requester = requester_id.trim();
        if requester.is_empty() {
            return Err(PortalError::Authorization(
                "authentication required to submit a request".to_string(),
            ));
        }

        let service_type: ServiceType = service_type.parse()?;

        let description = description.trim();
        let chars = description.chars().count();
        if chars < DESCRIPTION_MIN_CHARS || chars > DESCRIPTION_MAX_CHARS {
            return Err(PortalError::Validation(format!(
                "description must be between {DESCRIPTION_MIN_CHARS} and {DESCRIPTION_MAX_CHARS} characters"
            )));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let doc = ServiceRequestDoc::new(
                requester,
                service_type,
                description,
                self.references.generate(),
            );

            match self.store.insert(doc).await {
                Ok(stored) => {
                    info!(
                        "Service request {} ({}) created by {}",
                        stored.reference_number, stored.service_type, requester
                    );
                    return Ok(stored);
                }
                Err(PortalError::Conflict(_)) if attempt < self.reference_max_attempts => {
                    warn!(
                        "Reference number collision on attempt {}, regenerating",
                        attempt
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// List all requests with requester details, newest first. Admin only.
    pub async fn list(&self, principal_id: &str) -> Result<Vec<RequestWithRequester>> {
        self.gate.require_admin("list_requests", principal_id).await?;
        self.store.list_with_requesters().await
    }

    /// Review a request: set its status, overwrite the review fields, and
    /// stamp the reviewer. Admin only.
    ///
    /// `admin_notes` is overwritten with the supplied value on every call,
    /// empty included. `document_url` is stored only when non-empty; an
    /// empty or missing value clears it. `reviewed_by`/`reviewed_at` are
    /// stamped on every call, even when the status does not change.
    pub async fn review(
        &self,
        principal_id: &str,
        request_id: Uuid,
        new_status: &str,
        admin_notes: Option<&str>,
        document_url: Option<&str>,
    ) -> Result<ServiceRequestDoc> {
        let admin = self
            .gate
            .require_admin("review_request", principal_id)
            .await?;

        let status: RequestStatus = new_status.parse()?;

        let review = ReviewUpdate {
            status,
            admin_notes: admin_notes.unwrap_or_default().to_string(),
            document_url: document_url
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(String::from),
            reviewed_by: admin.id().unwrap_or_default().to_string(),
            reviewed_at: Utc::now(),
        };

        let updated = self
            .store
            .apply_review(request_id, review)
            .await?
            .ok_or_else(|| PortalError::NotFound(format!("service request {request_id}")))?;

        info!(
            "Service request {} reviewed as {} by {}",
            updated.reference_number, updated.status, admin
        );
        self.audit
            .log_admin_action(
                AuditEventType::RequestReviewed,
                admin.id(),
                &updated.reference_number,
                serde_json::json!({ "status": updated.status.to_string() }),
            )
            .await;

        Ok(updated)
    }
}
