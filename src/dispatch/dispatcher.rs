use std::sync::Arc;

use chrono::Local;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::classify;
use crate::ClassifyOutcome;
use crate::EventHandler;
use crate::Removal;
use crate::TrackedObject;
use crate::WorkQueue;

pub struct ChangeDispatcher {
    queue: Arc<WorkQueue>,
}

impl ChangeDispatcher {
    pub fn new(queue: Arc<WorkQueue>) -> Self {
        Self { queue }
    }

    /// Tracked-ness of an object for relevance filtering. An invalid
    /// annotation counts as untracked and surfaces a diagnostic here, once
    /// per observation.
    fn is_relevant(
        &self,
        obj: &TrackedObject,
    ) -> bool {
        match classify(&obj.annotations, Local::now().naive_local()) {
            ClassifyOutcome::Tracked(_) => true,
            ClassifyOutcome::Untracked => false,
            ClassifyOutcome::Invalid { reason } => {
                warn!("[Dispatcher] {} excluded from tracking: {}", obj.key, reason);
                false
            }
        }
    }
}

impl EventHandler for ChangeDispatcher {
    fn on_upsert(
        &self,
        old: Option<Arc<TrackedObject>>,
        new: Arc<TrackedObject>,
    ) {
        match old {
            None => {
                // Genuine add: only tracked objects are worth a pass
                if self.is_relevant(&new) {
                    debug!("[Dispatcher] ADD event: {}", new.key);
                    self.queue.add(&new.key);
                }
            }
            Some(old) => {
                // Unchanged version marker means a resync re-delivery
                if old.version == new.version {
                    trace!("[Dispatcher] resync no-op for {}", new.key);
                    return;
                }

                // Annotation added, removed, changed, or value changed:
                // a pass is due when either side is tracked
                if self.is_relevant(&old) || self.is_relevant(&new) {
                    debug!("[Dispatcher] UPDATE event: {}", new.key);
                    self.queue.add(&new.key);
                }
            }
        }
    }

    fn on_remove(
        &self,
        removal: Removal,
    ) {
        // Nothing to reconcile for a gone object; tracked removals are an
        // observability signal only
        match removal {
            Removal::Known(obj) => {
                if self.is_relevant(&obj) {
                    info!("[Dispatcher] DELETE: {} (was tracking expiration)", obj.key);
                } else {
                    debug!("[Dispatcher] DELETE event: {}", obj.key);
                }
            }
            Removal::Unknown(key) => {
                warn!("[Dispatcher] DELETE with unknown final state: {}", key);
            }
        }
    }
}
