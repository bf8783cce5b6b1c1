use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::Removal;
use crate::TrackedObject;

/// Observer of mirror cache changes.
///
/// Called synchronously from the watch-ingestion task for every applied
/// change, so implementations must be non-blocking. `old` is `None` for a
/// genuine add; a resync re-delivery arrives as an upsert whose old and new
/// versions are equal.
#[cfg_attr(test, automock)]
pub trait EventHandler: Send + Sync + 'static {
    fn on_upsert(
        &self,
        old: Option<Arc<TrackedObject>>,
        new: Arc<TrackedObject>,
    );

    fn on_remove(
        &self,
        removal: Removal,
    );
}
