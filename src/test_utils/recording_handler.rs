use std::sync::Arc;

use parking_lot::Mutex;

use crate::EventHandler;
use crate::ObjectKey;
use crate::Removal;
use crate::TrackedObject;

#[derive(Debug, Clone)]
pub struct RecordedUpsert {
    pub old: Option<Arc<TrackedObject>>,
    pub new: Arc<TrackedObject>,
}

/// Event handler that records every callback for later assertions.
#[derive(Default)]
pub struct RecordingHandler {
    upserts: Mutex<Vec<RecordedUpsert>>,
    removes: Mutex<Vec<Removal>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upserts(&self) -> Vec<RecordedUpsert> {
        self.upserts.lock().clone()
    }

    pub fn removed_keys(&self) -> Vec<ObjectKey> {
        self.removes.lock().iter().map(|r| r.key().clone()).collect()
    }

    pub fn removes(&self) -> Vec<Removal> {
        self.removes.lock().clone()
    }

    pub fn clear(&self) {
        self.upserts.lock().clear();
        self.removes.lock().clear();
    }
}

impl EventHandler for RecordingHandler {
    fn on_upsert(
        &self,
        old: Option<Arc<TrackedObject>>,
        new: Arc<TrackedObject>,
    ) {
        self.upserts.lock().push(RecordedUpsert { old, new });
    }

    fn on_remove(
        &self,
        removal: Removal,
    ) {
        self.removes.lock().push(removal);
    }
}
