//! Error types for the repository and its event registry.

use thiserror::Error;

/// Error returned by an observer's update hook.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for repository and registry operations.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Channel name must not be empty")]
    EmptyChannel,

    #[error("Observer failed while handling '{event}': {source}")]
    Observer {
        event: String,
        #[source]
        source: ObserverError,
    },

    #[error("Failed to load records from {locator}: {reason}")]
    Source { locator: String, reason: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
