//! Upstream store boundary.
//!
//! The engine never talks to a concrete object store. It consumes the
//! [`ObjectSource`] trait: a point-in-time listing plus a stream of tagged
//! change notifications. Everything upstream of that trait (wire protocol,
//! authentication, reconnect mechanics of the transport itself) is the
//! implementor's concern.

mod object;
mod source;
pub use object::*;
pub use source::*;
