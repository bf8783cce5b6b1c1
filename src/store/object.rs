use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Stable identity of an upstream object: `(namespace, name)`.
///
/// Rendered as `"namespace/name"` everywhere a flat key is needed (queue
/// membership, log lines, metric labels).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for ObjectKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self::new(namespace, name))
            }
            _ => Err(format!("invalid object key: {:?}", s)),
        }
    }
}

/// Read-only snapshot of an upstream object.
///
/// `version` is an opaque marker compared for equality only. It exists to
/// tell a resync re-delivery apart from a genuine update; no ordering is
/// assumed across versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedObject {
    pub key: ObjectKey,
    pub annotations: HashMap<String, String>,
    pub version: String,
}

impl TrackedObject {
    pub fn new(
        key: ObjectKey,
        annotations: HashMap<String, String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            key,
            annotations,
            version: version.into(),
        }
    }

    pub fn annotation(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}
