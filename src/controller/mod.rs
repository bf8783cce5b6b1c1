//! Controller supervisor.
//!
//! Wires the mirror, queue, dispatcher and reconciler together and owns the
//! lifecycle: start the sync loop, wait for the initial cache sync, start
//! the worker pool, drain gracefully on the shutdown signal.

mod builder;
mod controller;
pub use builder::*;
pub use controller::*;
