//! Announcement document schema
//!
//! Admin-published notices surfaced on the public homepage feed. Creation
//! publishes immediately; there is no draft state.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::types::PortalError;

/// Collection name for announcements
pub const ANNOUNCEMENT_COLLECTION: &str = "announcements";

/// Display priority of an announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl FromStr for Priority {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(PortalError::Validation(format!("unknown priority: {s:?}"))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        };
        write!(f, "{s}")
    }
}

/// Announcement document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AnnouncementDoc {
    /// Document ID, assigned at creation
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Headline shown in the feed
    pub title: String,

    /// Body text
    pub content: String,

    /// Display priority
    #[serde(default)]
    pub priority: Priority,

    /// Only published announcements are visible to non-admin queries
    #[serde(default)]
    pub published: bool,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,
}

impl AnnouncementDoc {
    /// Create a published announcement. Metadata is stamped by the store on insert.
    pub fn new(title: &str, content: &str, priority: Priority) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            priority,
            published: true,
            metadata: Metadata::default(),
        }
    }
}

impl IntoIndexes for AnnouncementDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        // The public feed filters on published and sorts newest-first
        vec![(
            doc! { "published": 1, "metadata.created_at": -1 },
            Some(
                IndexOptions::builder()
                    .name("published_created_at_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for AnnouncementDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
