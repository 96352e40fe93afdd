//! Service request document schema
//!
//! A citizen-submitted request for a government service. The reference
//! number carries a unique index; the creation path depends on the store
//! rejecting duplicates.

use bson::{doc, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::types::PortalError;

/// Collection name for service requests
pub const SERVICE_REQUEST_COLLECTION: &str = "service_requests";

/// Closed set of service categories a request can be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Certificate,
    License,
    Permit,
    Tracking,
    Other,
}

impl FromStr for ServiceType {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "certificate" => Ok(ServiceType::Certificate),
            "license" => Ok(ServiceType::License),
            "permit" => Ok(ServiceType::Permit),
            "tracking" => Ok(ServiceType::Tracking),
            "other" => Ok(ServiceType::Other),
            _ => Err(PortalError::Validation(format!(
                "unknown service type: {s:?}"
            ))),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceType::Certificate => "certificate",
            ServiceType::License => "license",
            ServiceType::Permit => "permit",
            ServiceType::Tracking => "tracking",
            ServiceType::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Review state of a service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl FromStr for RequestStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(PortalError::Validation(format!(
                "unknown request status: {s:?}"
            ))),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

/// Service request document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ServiceRequestDoc {
    /// Document ID, assigned at creation
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Human-readable tracking code, unique across the system
    pub reference_number: String,

    /// Principal that submitted the request
    pub requester_id: String,

    /// Category of the requested service
    pub service_type: ServiceType,

    /// Free-text description supplied by the requester
    pub description: String,

    /// Review state, starts at pending
    #[serde(default)]
    pub status: RequestStatus,

    /// Notes attached by the reviewing admin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,

    /// Optional document link attached on review
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,

    /// Admin who last reviewed this request.
    /// Stamped together with reviewed_at, never one without the other.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,

    /// When the request was last reviewed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,
}

impl ServiceRequestDoc {
    /// Create a new pending request. Metadata is stamped by the store on insert.
    pub fn new(
        requester_id: &str,
        service_type: ServiceType,
        description: &str,
        reference_number: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference_number,
            requester_id: requester_id.to_string(),
            service_type,
            description: description.to_string(),
            status: RequestStatus::Pending,
            admin_notes: None,
            document_url: None,
            reviewed_by: None,
            reviewed_at: None,
            metadata: Metadata::default(),
        }
    }

    /// Creation timestamp, once stored
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.metadata.created_at
    }
}

impl IntoIndexes for ServiceRequestDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on reference_number - the collision detector
            // the creation retry loop depends on
            (
                doc! { "reference_number": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("reference_number_unique".to_string())
                        .build(),
                ),
            ),
            // Index on requester_id for per-citizen lookups
            (
                doc! { "requester_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("requester_id_index".to_string())
                        .build(),
                ),
            ),
            // Newest-first listing is a user-facing contract
            (
                doc! { "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("created_at_desc_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for ServiceRequestDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
