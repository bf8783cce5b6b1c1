use std::sync::Arc;

use tracing::debug;
use tracing::error;

use super::Reconciler;
use crate::WorkQueue;

/// Dequeue-process-acknowledge loop run by every worker task.
///
/// A failed pass is re-queued through the rate-limited path before the key
/// is acknowledged; a successful pass resets the key's failure counter.
/// Exits when the queue reports drained shutdown.
pub async fn run_worker(
    id: usize,
    queue: Arc<WorkQueue>,
    reconciler: Arc<Reconciler>,
) {
    debug!("[Worker-{}] started", id);

    while let Some(key) = queue.get().await {
        match reconciler.reconcile(&key).await {
            Ok(()) => {
                queue.forget(&key);
            }
            Err(e) => {
                error!("[Worker-{}] error reconciling {} (will retry): {}", id, key, e);
                queue.add_rate_limited(&key);
            }
        }
        queue.done(&key);
    }

    debug!("[Worker-{}] queue drained, exiting", id);
}
