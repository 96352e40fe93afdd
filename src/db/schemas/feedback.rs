//! Feedback document schema
//!
//! A public contact-form submission. Creation fields are immutable; only
//! the status moves.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::types::PortalError;

/// Collection name for feedback
pub const FEEDBACK_COLLECTION: &str = "feedback";

/// Triage state of a feedback item.
/// Any value may be set from any prior value; the UI only ever moves
/// forward but the engine does not enforce an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    #[default]
    New,
    Reviewed,
    Responded,
}

impl FromStr for FeedbackStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(FeedbackStatus::New),
            "reviewed" => Ok(FeedbackStatus::Reviewed),
            "responded" => Ok(FeedbackStatus::Responded),
            _ => Err(PortalError::Validation(format!(
                "unknown feedback status: {s:?}"
            ))),
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeedbackStatus::New => "new",
            FeedbackStatus::Reviewed => "reviewed",
            FeedbackStatus::Responded => "responded",
        };
        write!(f, "{s}")
    }
}

/// Feedback document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FeedbackDoc {
    /// Document ID, assigned at creation
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Name given on the contact form
    pub name: String,

    /// Reply address given on the contact form
    pub email: String,

    /// Subject line
    pub subject: String,

    /// Message body
    pub message: String,

    /// Triage state, starts at new
    #[serde(default)]
    pub status: FeedbackStatus,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,
}

impl FeedbackDoc {
    /// Create a new feedback item. Metadata is stamped by the store on insert.
    pub fn new(name: &str, email: &str, subject: &str, message: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
            status: FeedbackStatus::New,
            metadata: Metadata::default(),
        }
    }
}

impl IntoIndexes for FeedbackDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("created_at_desc_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "status": 1 },
                Some(
                    IndexOptions::builder()
                        .name("status_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for FeedbackDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
