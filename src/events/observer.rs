//! The observer capability and a few stock observers.

use crate::error::ObserverError;
use crate::types::SubjectId;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::warn;

use super::types::Notification;

/// Anything that wants to hear about dispatched events.
///
/// Hooks run synchronously on the dispatching thread. A returned error is
/// handled according to the registry's [`DeliveryPolicy`](super::DeliveryPolicy).
pub trait Observer<P>: Send + Sync {
    fn update(&self, subject: SubjectId, event: &str, payload: &P) -> Result<(), ObserverError>;
}

/// Observer backed by a closure.
pub struct FnObserver<P, F> {
    f: F,
    _payload: PhantomData<fn(&P)>,
}

impl<P, F> FnObserver<P, F>
where
    F: Fn(SubjectId, &str, &P) -> Result<(), ObserverError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _payload: PhantomData,
        }
    }
}

impl<P, F> Observer<P> for FnObserver<P, F>
where
    F: Fn(SubjectId, &str, &P) -> Result<(), ObserverError> + Send + Sync,
{
    fn update(&self, subject: SubjectId, event: &str, payload: &P) -> Result<(), ObserverError> {
        (self.f)(subject, event, payload)
    }
}

/// Wraps an observer so its failures are logged and swallowed.
///
/// This overrides the registry's [`DeliveryPolicy`](super::DeliveryPolicy)
/// for the wrapped observer only: under `FailFast` its errors never reach
/// the dispatcher, while every other observer still fails fast.
pub struct Isolated<O> {
    inner: O,
    label: String,
}

impl<O> Isolated<O> {
    /// Wrap `inner`, tagging its log lines with `label`.
    pub fn new(label: impl Into<String>, inner: O) -> Self {
        Self {
            inner,
            label: label.into(),
        }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

impl<P, O: Observer<P>> Observer<P> for Isolated<O> {
    fn update(&self, subject: SubjectId, event: &str, payload: &P) -> Result<(), ObserverError> {
        if let Err(e) = self.inner.update(subject, event, payload) {
            warn!(observer = %self.label, %subject, event, error = %e, "observer failed, ignoring");
        }
        Ok(())
    }
}

/// Forwards every event it sees into a bounded channel.
///
/// A full or disconnected buffer is reported as an observer error.
pub struct ChannelObserver<P> {
    sender: Sender<Notification<P>>,
}

impl<P: Clone + Send> ChannelObserver<P> {
    /// Create an observer and the handle that receives its notifications.
    pub fn bounded(buffer_size: usize) -> (Self, NotificationHandle<P>) {
        let (sender, receiver) = bounded(buffer_size);
        (Self { sender }, NotificationHandle { receiver })
    }
}

impl<P: Clone + Send> Observer<P> for ChannelObserver<P> {
    fn update(&self, subject: SubjectId, event: &str, payload: &P) -> Result<(), ObserverError> {
        let notification = Notification {
            subject,
            event: event.to_string(),
            payload: payload.clone(),
        };

        match self.sender.try_send(notification) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(%subject, event, "notification buffer full");
                Err("notification buffer full".into())
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(%subject, event, "notification receiver dropped");
                Err("notification receiver dropped".into())
            }
        }
    }
}

/// Receiving end of a [`ChannelObserver`].
pub struct NotificationHandle<P> {
    pub receiver: Receiver<Notification<P>>,
}

impl<P> NotificationHandle<P> {
    /// Receive the next notification (blocking).
    pub fn recv(&self) -> Result<Notification<P>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a notification (non-blocking).
    pub fn try_recv(&self) -> Result<Notification<P>, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<Notification<P>, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently buffered.
    pub fn drain(&self) -> Vec<Notification<P>> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolated_swallows_errors() {
        let failing = FnObserver::new(|_, _, _: &u32| Err("boom".into()));
        let isolated = Isolated::new("failing", failing);
        assert!(isolated.update(SubjectId(1), "x", &1).is_ok());
    }

    #[test]
    fn test_channel_observer_forwards() {
        let (observer, handle) = ChannelObserver::bounded(4);
        observer.update(SubjectId(7), "records:created", &42u32).unwrap();

        let notification = handle.try_recv().unwrap();
        assert_eq!(notification.subject, SubjectId(7));
        assert_eq!(notification.event, "records:created");
        assert_eq!(notification.payload, 42);
    }

    #[test]
    fn test_channel_observer_full_buffer() {
        let (observer, _handle) = ChannelObserver::bounded(1);
        observer.update(SubjectId(1), "a", &1u32).unwrap();
        assert!(observer.update(SubjectId(1), "b", &2u32).is_err());
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_channel_observer_disconnected_warns() {
        let captured = CapturedLog::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .finish();

        let (observer, handle) = ChannelObserver::bounded(1);
        drop(handle);

        tracing::subscriber::with_default(subscriber, || {
            assert!(observer.update(SubjectId(3), "records:deleted", &1u32).is_err());
        });

        let output = String::from_utf8_lossy(&captured.0.lock()).to_string();
        assert!(output.contains("notification receiver dropped"));
    }

    #[test]
    fn test_channel_observer_disconnected() {
        let (observer, handle) = ChannelObserver::bounded(1);
        drop(handle);
        assert!(observer.update(SubjectId(1), "a", &1u32).is_err());
    }
}
