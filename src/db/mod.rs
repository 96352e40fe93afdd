//! Persistence layer for Rotunda
//!
//! MongoDB client wrapper, document schemas, and the store traits the
//! lifecycle services program against, with MongoDB and in-memory
//! implementations.

pub mod memory;
pub mod mongo;
pub mod schemas;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::{IntoIndexes, MongoClient, MongoCollection, MutMetadata};
pub use store::{
    AnnouncementStore, FeedbackStore, MongoAnnouncementStore, MongoFeedbackStore,
    MongoRequestStore, MongoRoleStore, RequestStore, RequestWithRequester, ReviewUpdate,
};
