use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::ObjectKey;
use crate::ObjectSource;
use crate::StoreError;
use crate::TrackedObject;
use crate::WatchEvent;
use crate::WatchStream;

type EventResult = std::result::Result<WatchEvent, StoreError>;

/// Scripted in-memory upstream store.
///
/// `list` serves the current object map; `watch` hands out a fresh stream
/// per subscription and every pushed event is fanned out to all live
/// subscribers. Failure counters let tests exercise the startup retry
/// budget and the reconnect path.
#[derive(Default)]
pub struct MemoryObjectSource {
    objects: Mutex<HashMap<ObjectKey, TrackedObject>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<EventResult>>>,
    list_failures: AtomicUsize,
    watch_failures: AtomicUsize,
}

impl MemoryObjectSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects(objects: impl IntoIterator<Item = TrackedObject>) -> Self {
        let source = Self::new();
        {
            let mut map = source.objects.lock();
            for obj in objects {
                map.insert(obj.key.clone(), obj);
            }
        }
        source
    }

    /// Fail the next `n` list() calls
    pub fn fail_next_lists(
        &self,
        n: usize,
    ) {
        self.list_failures.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` watch() calls
    pub fn fail_next_watches(
        &self,
        n: usize,
    ) {
        self.watch_failures.store(n, Ordering::SeqCst);
    }

    /// Upsert an object and notify all live subscribers
    pub fn push_upsert(
        &self,
        obj: TrackedObject,
    ) {
        self.objects.lock().insert(obj.key.clone(), obj.clone());
        self.broadcast(Ok(WatchEvent::Upserted(obj)));
    }

    /// Remove an object and notify all live subscribers
    pub fn push_remove(
        &self,
        key: &ObjectKey,
    ) {
        let removed = self.objects.lock().remove(key);
        match removed {
            Some(obj) => self.broadcast(Ok(WatchEvent::Removed(obj))),
            None => self.broadcast(Ok(WatchEvent::RemovedUnknown(key.clone()))),
        }
    }

    /// Deliver a removal tombstone whose final state was lost upstream
    pub fn push_remove_unknown(
        &self,
        key: &ObjectKey,
    ) {
        self.objects.lock().remove(key);
        self.broadcast(Ok(WatchEvent::RemovedUnknown(key.clone())));
    }

    /// Error every live stream (subscribers see the error, then the end)
    pub fn break_streams(
        &self,
        reason: &str,
    ) {
        self.broadcast(Err(StoreError::Unavailable(reason.to_string())));
        self.subscribers.lock().clear();
    }

    /// End every live stream without an error
    pub fn disconnect(&self) {
        self.subscribers.lock().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subs = self.subscribers.lock();
        subs.retain(|tx| !tx.is_closed());
        subs.len()
    }

    fn broadcast(
        &self,
        event: EventResult,
    ) {
        let mut subs = self.subscribers.lock();
        subs.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl ObjectSource for MemoryObjectSource {
    async fn list(&self) -> std::result::Result<Vec<TrackedObject>, StoreError> {
        if self
            .list_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::ListFailed("scripted list failure".to_string()));
        }
        Ok(self.objects.lock().values().cloned().collect())
    }

    async fn watch(&self) -> std::result::Result<WatchStream, StoreError> {
        if self
            .watch_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::WatchFailed("scripted watch failure".to_string()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}
