//! Database schemas for Rotunda
//!
//! Defines document structures for service requests, feedback,
//! announcements, and the identity-layer collections this core reads.

mod announcement;
mod feedback;
mod metadata;
mod profile;
mod service_request;

pub use announcement::{AnnouncementDoc, Priority, ANNOUNCEMENT_COLLECTION};
pub use feedback::{FeedbackDoc, FeedbackStatus, FEEDBACK_COLLECTION};
pub use metadata::Metadata;
pub use profile::{ProfileDoc, UserRoleDoc, PROFILE_COLLECTION, USER_ROLE_COLLECTION};
pub use service_request::{
    RequestStatus, ServiceRequestDoc, ServiceType, SERVICE_REQUEST_COLLECTION,
};
