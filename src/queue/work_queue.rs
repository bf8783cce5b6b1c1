use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;
use tracing::warn;

use crate::metrics;
use crate::BackoffPolicy;
use crate::ObjectKey;

/// All mutable queue state lives behind this single mutex. Dequeue, enqueue
/// and acknowledge interleave continuously across the ingestion task and
/// every worker, so one lock is the synchronization discipline for the
/// whole structure (order, membership sets, failure counters, drain flag).
struct QueueState {
    /// Dequeue order of the pending keys
    order: VecDeque<ObjectKey>,
    /// Keys queued but not yet handed to a worker
    pending: HashSet<ObjectKey>,
    /// Keys currently being processed (between `get` and `done`)
    in_flight: HashSet<ObjectKey>,
    /// In-flight keys that were re-added and must be re-queued at `done`
    dirty: HashSet<ObjectKey>,
    /// Consecutive failures per key, reset by `forget`
    failures: HashMap<ObjectKey, u32>,
    draining: bool,
}

pub struct WorkQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    backoff: BackoffPolicy,
}

impl WorkQueue {
    pub fn new(backoff: BackoffPolicy) -> Self {
        Self {
            state: Mutex::new(QueueState {
                order: VecDeque::new(),
                pending: HashSet::new(),
                in_flight: HashSet::new(),
                dirty: HashSet::new(),
                failures: HashMap::new(),
                draining: false,
            }),
            notify: Notify::new(),
            backoff,
        }
    }

    /// Enqueue a key.
    ///
    /// No-op when the key is already pending. A key currently in flight is
    /// marked dirty instead and re-queued once its pass acknowledges, so an
    /// update arriving mid-processing is never silently dropped while the
    /// key still never runs twice concurrently. Never blocks.
    pub fn add(
        &self,
        key: &ObjectKey,
    ) {
        let mut s = self.state.lock();
        if s.draining {
            debug!("[WorkQueue] draining, dropped add for {}", key);
            return;
        }
        if s.in_flight.contains(key) {
            s.dirty.insert(key.clone());
            return;
        }
        if s.pending.insert(key.clone()) {
            s.order.push_back(key.clone());
            metrics::QUEUE_DEPTH.set(s.order.len() as i64);
            self.notify.notify_one();
        }
    }

    /// Dequeue the next key, waiting while the queue is empty.
    ///
    /// Returns `None` once the queue is draining and every already-queued
    /// key has been handed out: the worker exit signal.
    pub async fn get(&self) -> Option<ObjectKey> {
        loop {
            let notified = self.notify.notified();
            {
                let mut s = self.state.lock();
                if let Some(key) = s.order.pop_front() {
                    s.pending.remove(&key);
                    s.in_flight.insert(key.clone());
                    metrics::QUEUE_DEPTH.set(s.order.len() as i64);
                    return Some(key);
                }
                if s.draining {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Acknowledge a completed pass. Re-queues the key exactly once if it
    /// went dirty while in flight.
    pub fn done(
        &self,
        key: &ObjectKey,
    ) {
        let mut s = self.state.lock();
        s.in_flight.remove(key);
        if s.dirty.remove(key) {
            if s.draining {
                debug!("[WorkQueue] draining, dropped dirty re-add for {}", key);
                return;
            }
            if s.pending.insert(key.clone()) {
                s.order.push_back(key.clone());
                metrics::QUEUE_DEPTH.set(s.order.len() as i64);
                self.notify.notify_one();
            }
        }
    }

    /// Re-queue a failed key after an exponentially growing delay.
    ///
    /// The delay is `min(base * 2^(n-1), max)` for the key's n-th
    /// consecutive failure. Past the policy's silent-retry budget every
    /// further failure logs a standing warning; the key is never abandoned,
    /// the delay just stays capped.
    pub fn add_rate_limited(
        self: &Arc<Self>,
        key: &ObjectKey,
    ) {
        let (attempt, delay) = {
            let mut s = self.state.lock();
            if s.draining {
                debug!("[WorkQueue] draining, dropped rate-limited add for {}", key);
                return;
            }
            let n = s.failures.entry(key.clone()).or_insert(0);
            *n += 1;
            (*n, self.backoff.delay_for(*n))
        };

        if attempt as usize > self.backoff.max_retries {
            warn!(
                "[WorkQueue] {} failed {} consecutive time(s), next retry in {:?}",
                key, attempt, delay
            );
        } else {
            debug!("[WorkQueue] retrying {} in {:?} (failure #{})", key, delay, attempt);
        }

        let queue = Arc::clone(self);
        let key = key.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // add() is a no-op if draining started while we slept
            queue.add(&key);
        });
    }

    /// Reset the failure counter after a successful pass
    pub fn forget(
        &self,
        key: &ObjectKey,
    ) {
        self.state.lock().failures.remove(key);
    }

    pub fn num_failures(
        &self,
        key: &ObjectKey,
    ) -> u32 {
        self.state.lock().failures.get(key).copied().unwrap_or(0)
    }

    /// Number of keys waiting to be dequeued
    pub fn len(&self) -> usize {
        self.state.lock().order.len()
    }

    /// Number of keys currently being processed
    pub fn in_flight_len(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark the queue as draining: no new keys are accepted, already-queued
    /// keys are still handed out, and `get` returns `None` once empty.
    /// Idempotent.
    pub fn shutdown(&self) {
        {
            let mut s = self.state.lock();
            if s.draining {
                return;
            }
            s.draining = true;
        }
        self.notify.notify_waiters();
    }

    pub fn is_draining(&self) -> bool {
        self.state.lock().draining
    }
}
