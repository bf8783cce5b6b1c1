//! Controller Error Hierarchy
//!
//! Defines error types for the watch-cache-queue-reconcile engine,
//! categorized by subsystem and operational concerns. Only startup sync
//! failures are fatal to the process; reconciliation failures are contained
//! per key and retried through the rate-limited queue path.

use std::time::Duration;

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (sync loop, background tasks)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Configuration validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Per-key reconciliation failures (transient, retried)
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// Mirror synchronization failures
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),

    /// Supervisor wiring failures
    #[error("Controller failed to start: {0}")]
    ControllerStartFailed(String),
}

/// Failures while establishing or maintaining the upstream watch.
///
/// `ListFailed`, `WatchEstablishFailed` and `SyncTimeout` abort startup when
/// the initial sync budget is exhausted. `StreamLost` only surfaces in logs:
/// after the initial sync the mirror reconnects indefinitely.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Initial listing could not be completed within the retry budget
    #[error("Upstream listing failed after {attempts} attempt(s): {reason}")]
    ListFailed { attempts: usize, reason: String },

    /// Watch connection could not be established within the retry budget
    #[error("Watch connection failed after {attempts} attempt(s): {reason}")]
    WatchEstablishFailed { attempts: usize, reason: String },

    /// Initial sync did not complete within the configured window
    #[error("Initial sync timed out after {0:?}")]
    SyncTimeout(Duration),

    /// Established watch stream ended or errored (recoverable post-sync)
    #[error("Watch stream lost: {0}")]
    StreamLost(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Notification sink rejected or failed the emission
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Error surface of the notification sink boundary.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("Notification sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("Emission rejected for {subject}: {reason}")]
    Rejected { subject: String, reason: String },
}

/// Error surface of the upstream store boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Upstream store unavailable: {0}")]
    Unavailable(String),

    #[error("Upstream listing failed: {0}")]
    ListFailed(String),

    #[error("Watch subscription failed: {0}")]
    WatchFailed(String),
}
