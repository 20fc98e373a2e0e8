//! Event routing for repository lifecycle notifications.
//!
//! Observers subscribe to a named channel or to the wildcard channel.
//! Dispatching an event invokes, synchronously and in order:
//! - every observer on the channel matching the event name
//! - then every observer on the wildcard channel
//!
//! # Example
//!
//! ```ignore
//! let registry = EventRegistry::new(SubjectId::next());
//!
//! let (observer, handle) = ChannelObserver::bounded(16);
//! registry.subscribe(Channel::All, Arc::new(observer))?;
//!
//! registry.dispatch("records:created", &payload)?;
//! let notification = handle.try_recv()?;
//! ```

mod observer;
mod registry;
mod types;

pub use observer::{ChannelObserver, FnObserver, Isolated, NotificationHandle, Observer};
pub use registry::{DeliveryPolicy, EventRegistry, ObserverRef};
pub use types::{Channel, EventPayload, Notification, RecordEvent};
