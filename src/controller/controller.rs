//! The running controller instance.
//!
//! ## Key Responsibilities
//! - Runs the mirror's watch-ingestion task
//! - Gates worker startup on the initial cache sync
//! - Drains the queue and joins every worker on shutdown
//!
//! ## Example Usage
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use tokio::sync::watch;
//! # use vigil::{ControllerBuilder, Settings, ObjectSource};
//! # async fn example(source: Arc<dyn ObjectSource>) -> vigil::Result<()> {
//! let (shutdown_tx, shutdown_rx) = watch::channel(());
//! let controller = ControllerBuilder::new(Settings::load(None)?, shutdown_rx)
//!     .source(source)
//!     .build()
//!     .ready()?;
//! tokio::spawn(async move {
//!     controller.run().await.expect("controller execution failed");
//! });
//! // ... later: stop is idempotent, workers drain and exit
//! shutdown_tx.send(()).ok();
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::error;
use tracing::info;

use crate::run_worker;
use crate::Mirror;
use crate::ObjectSource;
use crate::Reconciler;
use crate::Result;
use crate::Settings;
use crate::SystemError;
use crate::WorkQueue;

pub struct Controller {
    pub(crate) mirror: Arc<Mirror>,
    pub(crate) queue: Arc<WorkQueue>,
    pub(crate) reconciler: Arc<Reconciler>,
    pub(crate) source: Arc<dyn ObjectSource>,
    pub(crate) settings: Arc<Settings>,
    pub(crate) shutdown_signal: watch::Receiver<()>,
    pub(crate) ready: AtomicBool,
}

impl Controller {
    /// Run until the shutdown signal fires or a fatal startup error occurs.
    ///
    /// In-flight reconciliation passes always complete; shutdown only stops
    /// new dequeues and waits for the drain.
    pub async fn run(&self) -> Result<()> {
        // 1. Start the watch-ingestion task
        let mut sync_handle = {
            let mirror = self.mirror.clone();
            let source = self.source.clone();
            let shutdown_signal = self.shutdown_signal.clone();
            tokio::spawn(async move { mirror.run(source, shutdown_signal).await })
        };

        // 2. Wait for the initial cache sync before any worker starts
        info!("[Controller] waiting for initial cache sync...");
        let sync_timeout = Duration::from_millis(self.settings.controller.initial_sync_timeout_ms);
        tokio::select! {
            res = &mut sync_handle => {
                // the sync loop ended before signaling readiness: either a
                // fatal startup error, or a shutdown that arrived mid-sync
                return match res {
                    Ok(Err(e)) => Err(e),
                    Ok(Ok(())) => {
                        info!("[Controller] stopped during initial sync");
                        Ok(())
                    }
                    Err(join_err) => Err(SystemError::TaskFailed(join_err).into()),
                };
            }
            res = self.mirror.wait_for_sync(sync_timeout) => {
                res?;
            }
        }
        info!("[Controller] cache synced successfully");
        self.set_ready(true);

        // 3. Launch the worker pool
        let worker_count = self.settings.controller.worker_count;
        info!("[Controller] starting {} worker(s)...", worker_count);
        let workers: Vec<_> = (0..worker_count)
            .map(|id| tokio::spawn(run_worker(id, self.queue.clone(), self.reconciler.clone())))
            .collect();

        // 4. Block until told to stop (a dropped sender counts as stop);
        //    a dead sync loop also ends the run, after the drain below
        let mut shutdown_signal = self.shutdown_signal.clone();
        let sync_ended = tokio::select! {
            _ = shutdown_signal.changed() => {
                info!("[Controller] shutdown signal received, stopping workers...");
                None
            }
            res = &mut sync_handle => {
                error!("[Controller] sync loop terminated unexpectedly");
                Some(res)
            }
        };

        // 5. Drain: no new keys, queued keys still processed
        self.queue.shutdown();
        for worker in workers {
            if let Err(e) = worker.await {
                error!("[Controller] worker task failed: {}", e);
            }
        }

        // 6. Join the sync task (it exits on the same signal)
        let sync_result = match sync_ended {
            Some(res) => res,
            None => sync_handle.await,
        };
        self.set_ready(false);

        match sync_result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(join_err) => Err(SystemError::TaskFailed(join_err).into()),
        }
    }

    pub fn set_ready(
        &self,
        is_ready: bool,
    ) {
        self.ready.store(is_ready, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// True when no key is queued or being processed
    pub fn queue_is_idle(&self) -> bool {
        self.queue.is_empty() && self.queue.in_flight_len() == 0
    }
}
