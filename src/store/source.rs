use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
#[cfg(test)]
use mockall::automock;

use super::ObjectKey;
use super::TrackedObject;
use crate::StoreError;

/// One observed change on the upstream store.
///
/// A tagged union at the boundary removes any need for runtime type
/// inspection of callback payloads: a removal either carries the final
/// object state or only the key (the upstream equivalent of a tombstone
/// whose content was lost).
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Upserted(TrackedObject),
    Removed(TrackedObject),
    RemovedUnknown(ObjectKey),
}

/// Final state handed to removal observers.
#[derive(Debug, Clone)]
pub enum Removal {
    Known(Arc<TrackedObject>),
    Unknown(ObjectKey),
}

impl Removal {
    pub fn key(&self) -> &ObjectKey {
        match self {
            Removal::Known(obj) => &obj.key,
            Removal::Unknown(key) => key,
        }
    }
}

pub type WatchStream = BoxStream<'static, std::result::Result<WatchEvent, StoreError>>;

/// Upstream store boundary consumed by the mirror.
///
/// `list` returns a point-in-time snapshot of every object; `watch` opens a
/// stream of incremental changes observed after the subscription is
/// established. A lost stream is re-established by the mirror with a fresh
/// `list` to cover anything missed in between.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectSource: Send + Sync + 'static {
    async fn list(&self) -> std::result::Result<Vec<TrackedObject>, StoreError>;

    async fn watch(&self) -> std::result::Result<WatchStream, StoreError>;
}
