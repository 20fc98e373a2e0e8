//! Record sources used to initialize a repository.

use crate::error::{NotifyError, Result};
use crate::types::Fields;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Opaque descriptor of where records came from (a path, a DSN, ...).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocator(pub String);

impl SourceLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        SourceLocator(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceLocator({})", self.0)
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceLocator {
    fn from(s: &str) -> Self {
        SourceLocator(s.to_string())
    }
}

/// Something records can be loaded from.
pub trait RecordSource {
    /// Descriptor delivered with the `records:init` event.
    fn locator(&self) -> SourceLocator;

    /// Field maps for the records to insert.
    fn load(&self) -> Result<Vec<Fields>>;
}

/// A bare locator loads nothing.
impl RecordSource for SourceLocator {
    fn locator(&self) -> SourceLocator {
        self.clone()
    }

    fn load(&self) -> Result<Vec<Fields>> {
        Ok(Vec::new())
    }
}

/// Loads records from a JSON file holding an array of objects.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn source_error(&self, reason: impl fmt::Display) -> NotifyError {
        NotifyError::Source {
            locator: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl RecordSource for JsonFileSource {
    fn locator(&self) -> SourceLocator {
        SourceLocator(self.path.display().to_string())
    }

    fn load(&self) -> Result<Vec<Fields>> {
        let bytes = fs::read(&self.path).map_err(|e| self.source_error(e))?;
        let entries: Vec<serde_json::Value> =
            serde_json::from_slice(&bytes).map_err(|e| self.source_error(e))?;

        entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| match entry {
                serde_json::Value::Object(fields) => Ok(fields),
                other => Err(NotifyError::InvalidRecord(format!(
                    "entry {} in {} is not an object: {}",
                    i,
                    self.path.display(),
                    other
                ))),
            })
            .collect()
    }
}
