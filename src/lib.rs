mod classifier;
mod config;
mod constants;
mod controller;
mod dispatch;
mod errors;
mod metrics;
mod mirror;
mod queue;
mod reconciler;
mod sink;
mod store;

pub use classifier::*;
pub use config::*;
pub use constants::ANNOTATION_EXPIRES_AT;
pub use constants::ANNOTATION_WARN_BEFORE;
pub use controller::*;
pub use dispatch::*;
pub use errors::*;
pub use metrics::*;
pub use mirror::*;
pub use queue::*;
pub use reconciler::*;
pub use sink::*;
pub use store::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
