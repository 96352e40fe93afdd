//! Lifecycle services for Rotunda
//!
//! One service per entity family, each programming against its store trait
//! and sharing the access gate and audit trail.

pub mod announcements;
pub mod feedback;
pub mod requests;

pub use announcements::{AnnouncementService, PUBLIC_FEED_LIMIT};
pub use feedback::{FeedbackService, MESSAGE_MAX_CHARS};
pub use requests::{RequestService, DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS};

use std::sync::Arc;

use crate::auth::AccessGate;
use crate::config::Args;
use crate::db::{
    MongoAnnouncementStore, MongoClient, MongoFeedbackStore, MongoRequestStore, MongoRoleStore,
};
use crate::logging::AuditLogger;
use crate::types::Result;

/// The assembled portal core: all three lifecycle services wired to one
/// backing store and one audit trail. This is the surface the presentation
/// layer calls into.
pub struct Portal {
    pub requests: RequestService,
    pub feedback: FeedbackService,
    pub announcements: AnnouncementService,
}

impl Portal {
    /// Connect to MongoDB and assemble the services
    pub async fn connect(args: &Args) -> Result<Self> {
        let mongo = MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await?;

        let audit = AuditLogger::new();
        if let Some(path) = &args.audit_log_path {
            audit.init_file(path.clone()).await.map_err(|e| {
                crate::types::PortalError::Database(format!(
                    "Failed to open audit log {}: {e}",
                    path.display()
                ))
            })?;
        }

        let roles = Arc::new(MongoRoleStore::new(mongo.clone()));
        let gate = AccessGate::new(roles, audit.clone());

        Ok(Self {
            requests: RequestService::new(
                Arc::new(MongoRequestStore::new(mongo.clone())),
                gate.clone(),
                audit.clone(),
            )
            .with_reference_attempts(args.reference_max_attempts),
            feedback: FeedbackService::new(
                Arc::new(MongoFeedbackStore::new(mongo.clone())),
                gate.clone(),
                audit.clone(),
            ),
            announcements: AnnouncementService::new(
                Arc::new(MongoAnnouncementStore::new(mongo)),
                gate,
                audit,
            ),
        })
    }
}
