//! Reconciler + Worker Pool
//!
//! N identical workers drain the queue; each dequeued key triggers one
//! independent, idempotent pass: snapshot fetch from the mirror (never the
//! stale event payload), classify, emit. Transient failures ride the
//! rate-limited re-enqueue path; data errors are diagnosed and dropped.

mod reconciler;
mod worker;
pub use reconciler::*;
pub use worker::*;
