//! Channel and payload types for repository events.

use crate::source::SourceLocator;
use crate::types::{Record, SubjectId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A subscription bucket.
///
/// `All` is the wildcard channel: its observers receive every event. It is a
/// distinct variant, so a named channel called `"*"` never aliases it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Receives every dispatched event.
    All,
    /// Receives events whose name matches exactly.
    Named(String),
}

impl Channel {
    /// Shorthand for the wildcard channel.
    pub const WILDCARD: Channel = Channel::All;

    /// A channel for events named exactly `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Channel::Named(name.into())
    }

    /// Whether this is the all-events channel.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Channel::All)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::All => write!(f, "Channel(*)"),
            Channel::Named(name) => write!(f, "Channel({})", name),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::All => write!(f, "*"),
            Channel::Named(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Channel {
    fn from(name: &str) -> Self {
        Channel::Named(name.to_string())
    }
}

impl From<String> for Channel {
    fn from(name: String) -> Self {
        Channel::Named(name)
    }
}

impl From<RecordEvent> for Channel {
    fn from(event: RecordEvent) -> Self {
        Channel::Named(event.as_str().to_string())
    }
}

/// Lifecycle events emitted by the repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordEvent {
    /// Records were loaded from a source.
    Init,
    /// A record was created.
    Created,
    /// A record's fields were merged.
    Updated,
    /// A record was removed.
    Deleted,
}

impl RecordEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordEvent::Init => "records:init",
            RecordEvent::Created => "records:created",
            RecordEvent::Updated => "records:updated",
            RecordEvent::Deleted => "records:deleted",
        }
    }

    /// Parse an event name back into a lifecycle event.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "records:init" => Some(RecordEvent::Init),
            "records:created" => Some(RecordEvent::Created),
            "records:updated" => Some(RecordEvent::Updated),
            "records:deleted" => Some(RecordEvent::Deleted),
            _ => None,
        }
    }
}

impl fmt::Display for RecordEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload delivered with a repository event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    /// `records:init` carries the source the records were loaded from.
    Source(SourceLocator),
    /// Every other lifecycle event carries the affected record.
    Record(Record),
}

impl EventPayload {
    pub fn record(&self) -> Option<&Record> {
        match self {
            EventPayload::Record(record) => Some(record),
            EventPayload::Source(_) => None,
        }
    }

    pub fn source(&self) -> Option<&SourceLocator> {
        match self {
            EventPayload::Source(locator) => Some(locator),
            EventPayload::Record(_) => None,
        }
    }
}

/// An event as seen by a channel-forwarding observer.
#[derive(Clone, Debug)]
pub struct Notification<P> {
    pub subject: SubjectId,
    pub event: String,
    pub payload: P,
}
