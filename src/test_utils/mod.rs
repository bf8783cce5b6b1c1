//! Shared fixtures for unit and integration tests: a scripted in-memory
//! object source, a capturing notification sink, and a recording event
//! handler.

mod capturing_sink;
mod memory_source;
mod recording_handler;

pub use capturing_sink::*;
pub use memory_source::*;
pub use recording_handler::*;

use std::collections::HashMap;

use crate::ObjectKey;
use crate::TrackedObject;

/// Build a `TrackedObject` from `(annotation, value)` pairs.
pub fn object_with(
    namespace: &str,
    name: &str,
    version: &str,
    annotations: &[(&str, &str)],
) -> TrackedObject {
    let annotations: HashMap<String, String> = annotations
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    TrackedObject::new(ObjectKey::new(namespace, name), annotations, version)
}

/// Object annotated to expire on `date` (`YYYY-MM-DD`).
pub fn expiring_object(
    namespace: &str,
    name: &str,
    version: &str,
    date: &str,
) -> TrackedObject {
    object_with(namespace, name, version, &[("vigil.dev/expires-at", date)])
}

/// Object without any tracked annotations.
pub fn plain_object(
    namespace: &str,
    name: &str,
    version: &str,
) -> TrackedObject {
    object_with(namespace, name, version, &[])
}
