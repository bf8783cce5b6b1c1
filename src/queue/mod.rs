//! Deduplicating Rate-Limited Work Queue
//!
//! Holds pending object keys for the worker pool. Guarantees at-most-one
//! in-flight processing per key, collapses duplicate enqueues, re-delivers
//! keys that were re-added mid-processing, and applies exponential backoff
//! to keys whose reconciliation keeps failing. Independent of object
//! content: it only ever sees keys.

mod work_queue;
pub use work_queue::*;
