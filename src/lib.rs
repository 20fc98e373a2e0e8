//! # Record Notify
//!
//! An in-memory record repository that broadcasts a named event to
//! registered observers after every mutation.
//!
//! ## Core Concepts
//!
//! - **Records**: Field maps addressed by an opaque identifier
//! - **Channels**: Named subscription buckets plus the wildcard channel
//! - **Observers**: Synchronous hooks invoked in subscription order
//! - **Repository**: The subject; creates, updates, deletes and loads records
//!
//! ## Example
//!
//! ```ignore
//! use record_notify::{fields, Channel, ChannelObserver, RecordEvent, Repository};
//!
//! let repository = Repository::new();
//!
//! let (observer, handle) = ChannelObserver::bounded(64);
//! repository.subscribe_to(RecordEvent::Created, Arc::new(observer))?;
//!
//! let record = repository.create_record(fields(json!({"name": "John"})))?;
//! repository.update_record(&record, fields(json!({"email": "john@doe.com"})))?;
//! repository.delete_record(&record)?;
//! ```

pub mod error;
pub mod events;
pub mod ids;
pub mod repository;
pub mod source;
pub mod types;

// Re-exports
pub use error::{NotifyError, ObserverError, Result};
pub use events::{
    Channel, ChannelObserver, DeliveryPolicy, EventPayload, EventRegistry, FnObserver, Isolated,
    Notification, NotificationHandle, Observer, ObserverRef, RecordEvent,
};
pub use ids::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use repository::{Repository, RepositoryConfig};
pub use source::{JsonFileSource, RecordSource, SourceLocator};
pub use types::*;
