//! Local Mirror
//!
//! Eventually-consistent, indexed copy of every upstream object. One
//! dedicated task ingests the watch stream and applies changes; any number
//! of workers read concurrently through `get`. Reads never observe a
//! partially-applied write: each key maps to an immutable `Arc` snapshot
//! that is swapped whole.

mod event_handler;
mod mirror;
pub use event_handler::*;
pub use mirror::*;
