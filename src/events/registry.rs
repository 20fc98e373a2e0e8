//! Channel registry that routes dispatched events to observers.

use crate::error::{NotifyError, Result};
use crate::types::SubjectId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::observer::Observer;
use super::types::Channel;

/// Shared handle to a registered observer.
pub type ObserverRef<P> = Arc<dyn Observer<P>>;

/// What happens when an observer's hook fails mid-dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Stop at the first failure and return it to the caller.
    #[default]
    FailFast,
    /// Log the failure and keep delivering to the rest.
    Isolate,
}

/// Maps channels to ordered observer lists and dispatches events through them.
///
/// The wildcard channel exists from construction. Named channels are created
/// on first subscribe or first dispatch.
pub struct EventRegistry<P> {
    /// Identity passed to every observer invocation.
    subject: SubjectId,
    /// Failure handling for observer hooks.
    policy: DeliveryPolicy,
    /// Channel -> observers in subscription order.
    channels: RwLock<HashMap<Channel, Vec<ObserverRef<P>>>>,
}

impl<P: 'static> EventRegistry<P> {
    /// Create a fail-fast registry for `subject`.
    pub fn new(subject: SubjectId) -> Self {
        Self::with_policy(subject, DeliveryPolicy::default())
    }

    /// Create a registry for `subject` with an explicit failure policy.
    pub fn with_policy(subject: SubjectId, policy: DeliveryPolicy) -> Self {
        let mut channels = HashMap::new();
        channels.insert(Channel::All, Vec::new());

        Self {
            subject,
            policy,
            channels: RwLock::new(channels),
        }
    }

    /// Identity passed to observers.
    pub fn subject(&self) -> SubjectId {
        self.subject
    }

    /// Failure policy applied to every dispatch.
    pub fn policy(&self) -> DeliveryPolicy {
        self.policy
    }

    /// Append `observer` to `channel`.
    ///
    /// Subscribing the same observer twice yields two invocations per event.
    pub fn subscribe(&self, channel: impl Into<Channel>, observer: ObserverRef<P>) -> Result<()> {
        let channel = channel.into();
        if matches!(&channel, Channel::Named(name) if name.is_empty()) {
            return Err(NotifyError::EmptyChannel);
        }

        trace!(subject = %self.subject, %channel, "subscribing observer");
        self.channels.write().entry(channel).or_default().push(observer);
        Ok(())
    }

    /// Remove every entry of `observer` from `channel` only.
    ///
    /// Matching is by identity. Returns how many entries were removed; an
    /// unknown channel or observer removes nothing.
    pub fn unsubscribe<O>(&self, channel: impl Into<Channel>, observer: &Arc<O>) -> usize
    where
        O: Observer<P> + ?Sized,
    {
        let channel = channel.into();
        let target = Arc::as_ptr(observer).cast::<()>();

        let mut channels = self.channels.write();
        let Some(observers) = channels.get_mut(&channel) else {
            return 0;
        };

        let before = observers.len();
        observers.retain(|o| Arc::as_ptr(o).cast::<()>() != target);
        let removed = before - observers.len();

        trace!(subject = %self.subject, %channel, removed, "unsubscribed observer");
        removed
    }

    /// Deliver `event` to the channel's observers, then the wildcard's.
    ///
    /// Observers are invoked from a snapshot taken before the first call, so
    /// hooks may subscribe or unsubscribe without affecting this delivery.
    /// Returns the number of observers invoked.
    pub fn dispatch(&self, event: &str, payload: &P) -> Result<usize> {
        let observers = self.resolve(event);
        debug!(subject = %self.subject, event, observers = observers.len(), "dispatching event");

        for observer in &observers {
            if let Err(source) = observer.update(self.subject, event, payload) {
                match self.policy {
                    DeliveryPolicy::FailFast => {
                        return Err(NotifyError::Observer {
                            event: event.to_string(),
                            source,
                        });
                    }
                    DeliveryPolicy::Isolate => {
                        warn!(subject = %self.subject, event, error = %source, "observer failed");
                    }
                }
            }
        }

        Ok(observers.len())
    }

    /// Snapshot of the observers for `event`: named group first, then wildcard.
    pub fn resolve(&self, event: &str) -> Vec<ObserverRef<P>> {
        let key = Channel::named(event);

        {
            let channels = self.channels.read();
            if event.is_empty() || channels.contains_key(&key) {
                return Self::merge(&channels, &key);
            }
        }

        let mut channels = self.channels.write();
        channels.entry(key.clone()).or_default();
        Self::merge(&channels, &key)
    }

    fn merge(channels: &HashMap<Channel, Vec<ObserverRef<P>>>, key: &Channel) -> Vec<ObserverRef<P>> {
        let named = channels.get(key).map(Vec::as_slice).unwrap_or_default();
        let all = channels.get(&Channel::All).map(Vec::as_slice).unwrap_or_default();

        let mut resolved = Vec::with_capacity(named.len() + all.len());
        resolved.extend(named.iter().cloned());
        resolved.extend(all.iter().cloned());
        resolved
    }

    /// Number of channels, the wildcard included.
    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    /// Whether `channel` has been created.
    pub fn has_channel(&self, channel: &Channel) -> bool {
        self.channels.read().contains_key(channel)
    }

    /// Number of subscription entries on `channel` (duplicates counted).
    pub fn subscriber_count(&self, channel: &Channel) -> usize {
        self.channels.read().get(channel).map_or(0, Vec::len)
    }
}
