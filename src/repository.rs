//! The record repository: mutates records and broadcasts lifecycle events.

use crate::error::Result;
use crate::events::{
    Channel, DeliveryPolicy, EventPayload, EventRegistry, Observer, ObserverRef, RecordEvent,
};
use crate::ids::{IdGenerator, RandomIdGenerator};
use crate::source::RecordSource;
use crate::types::{Fields, Record, RecordId, SubjectId};
use parking_lot::{ReentrantMutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Repository configuration.
#[derive(Clone, Debug)]
pub struct RepositoryConfig {
    /// Name used in log output.
    pub name: String,

    /// How observer failures are handled during dispatch.
    pub delivery: DeliveryPolicy,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            name: "records".to_string(),
            delivery: DeliveryPolicy::FailFast,
        }
    }
}

/// The subject observers watch.
///
/// Each successful mutation dispatches exactly one event; a mutation that
/// finds nothing to act on dispatches none. Observer hooks run while the
/// write lock is held; the lock is re-entrant, so a hook may read or mutate
/// the repository on the dispatching thread. Nested mutations dispatch their
/// own events before the outer call returns.
pub struct Repository {
    /// Repository configuration.
    config: RepositoryConfig,

    /// Records by identifier.
    records: RwLock<HashMap<RecordId, Record>>,

    /// Channel registry every event goes through.
    events: EventRegistry<EventPayload>,

    /// Identifier source for new records.
    ids: Box<dyn IdGenerator>,

    /// Held across mutate-then-dispatch.
    write_lock: ReentrantMutex<()>,
}

impl Repository {
    /// Create an empty repository with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RepositoryConfig::default())
    }

    /// Create an empty repository with random record identifiers.
    pub fn with_config(config: RepositoryConfig) -> Self {
        Self::with_id_generator(config, RandomIdGenerator)
    }

    /// Create a repository that draws identifiers from `ids`.
    pub fn with_id_generator(config: RepositoryConfig, ids: impl IdGenerator + 'static) -> Self {
        let events = EventRegistry::with_policy(SubjectId::next(), config.delivery);

        Self {
            config,
            records: RwLock::new(HashMap::new()),
            events,
            ids: Box::new(ids),
            write_lock: ReentrantMutex::new(()),
        }
    }

    /// Repository configuration.
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Identity passed to observers.
    pub fn subject_id(&self) -> SubjectId {
        self.events.subject()
    }

    /// The registry this repository dispatches through.
    pub fn events(&self) -> &EventRegistry<EventPayload> {
        &self.events
    }

    // --- Subscriptions ---

    /// Subscribe `observer` to every event.
    pub fn subscribe(&self, observer: ObserverRef<EventPayload>) -> Result<()> {
        self.events.subscribe(Channel::All, observer)
    }

    /// Subscribe `observer` to one channel.
    pub fn subscribe_to(
        &self,
        channel: impl Into<Channel>,
        observer: ObserverRef<EventPayload>,
    ) -> Result<()> {
        self.events.subscribe(channel, observer)
    }

    /// Remove `observer` from the wildcard channel.
    pub fn unsubscribe<O>(&self, observer: &Arc<O>) -> usize
    where
        O: Observer<EventPayload> + ?Sized,
    {
        self.events.unsubscribe(Channel::All, observer)
    }

    /// Remove `observer` from one channel.
    pub fn unsubscribe_from<O>(&self, channel: impl Into<Channel>, observer: &Arc<O>) -> usize
    where
        O: Observer<EventPayload> + ?Sized,
    {
        self.events.unsubscribe(channel, observer)
    }

    // --- Record Operations ---

    /// Load records from `source`, then dispatch `records:init`.
    ///
    /// The event fires even when the source yields nothing. Loaded records
    /// get fresh identifiers and do not trigger `records:created`. Returns
    /// the number of records inserted.
    pub fn initialize(&self, source: &dyn RecordSource) -> Result<usize> {
        let locator = source.locator();
        debug!(repository = %self.config.name, source = %locator, "loading records");
        let loaded = source.load()?;

        let _lock = self.write_lock.lock();

        let count = loaded.len();
        {
            let mut records = self.records.write();
            for fields in loaded {
                let id = self.ids.next_id();
                records.insert(id.clone(), Record::new(id, fields));
            }
        }

        self.notify(RecordEvent::Init, &EventPayload::Source(locator))?;
        Ok(count)
    }

    /// Create a record from `fields` and dispatch `records:created`.
    pub fn create_record(&self, fields: Fields) -> Result<Record> {
        let _lock = self.write_lock.lock();

        let record = Record::new(self.ids.next_id(), fields);
        self.records.write().insert(record.id.clone(), record.clone());
        debug!(repository = %self.config.name, record = %record.id, "created record");

        self.notify(RecordEvent::Created, &EventPayload::Record(record.clone()))?;
        Ok(record)
    }

    /// Merge `fields` into the stored record and dispatch `records:updated`.
    ///
    /// Returns `None` without dispatching if the record is unknown.
    pub fn update_record<R>(&self, record: &R, fields: Fields) -> Result<Option<Record>>
    where
        R: AsRef<RecordId> + ?Sized,
    {
        let id = record.as_ref();
        let _lock = self.write_lock.lock();

        let updated = {
            let mut records = self.records.write();
            let Some(stored) = records.get_mut(id) else {
                debug!(repository = %self.config.name, record = %id, "update of unknown record");
                return Ok(None);
            };
            stored.merge(fields);
            stored.clone()
        };
        debug!(repository = %self.config.name, record = %id, "updated record");

        self.notify(RecordEvent::Updated, &EventPayload::Record(updated.clone()))?;
        Ok(Some(updated))
    }

    /// Remove the record and dispatch `records:deleted` with it.
    ///
    /// Returns the detached record, or `None` without dispatching if it was
    /// not present.
    pub fn delete_record<R>(&self, record: &R) -> Result<Option<Record>>
    where
        R: AsRef<RecordId> + ?Sized,
    {
        let id = record.as_ref();
        let _lock = self.write_lock.lock();

        let Some(removed) = self.records.write().remove(id) else {
            debug!(repository = %self.config.name, record = %id, "delete of unknown record");
            return Ok(None);
        };
        debug!(repository = %self.config.name, record = %id, "deleted record");

        self.notify(RecordEvent::Deleted, &EventPayload::Record(removed.clone()))?;
        Ok(Some(removed))
    }

    // --- Reads ---

    /// Get a copy of a record by identifier.
    pub fn get(&self, id: &RecordId) -> Option<Record> {
        self.records.read().get(id).cloned()
    }

    /// Whether a record with this identifier exists.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.records.read().contains_key(id)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the repository holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Snapshot of all records, ordered by identifier.
    pub fn records(&self) -> Vec<Record> {
        let mut all: Vec<Record> = self.records.read().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    fn notify(&self, event: RecordEvent, payload: &EventPayload) -> Result<()> {
        self.events.dispatch(event.as_str(), payload)?;
        Ok(())
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
