use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::watch;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::EventHandler;
use crate::metrics;
use crate::BackoffPolicy;
use crate::Error;
use crate::ObjectKey;
use crate::ObjectSource;
use crate::Removal;
use crate::Result;
use crate::SyncError;
use crate::TrackedObject;
use crate::WatchEvent;
use crate::WatchStream;

pub struct Mirror {
    objects: DashMap<ObjectKey, Arc<TrackedObject>>,
    synced_tx: watch::Sender<bool>,
    synced_rx: watch::Receiver<bool>,
    handler: Arc<dyn EventHandler>,
    sync_policy: BackoffPolicy,
    resync_interval: Duration,
}

impl Mirror {
    pub fn new(
        handler: Arc<dyn EventHandler>,
        sync_policy: BackoffPolicy,
        resync_interval: Duration,
    ) -> Self {
        let (synced_tx, synced_rx) = watch::channel(false);
        Self {
            objects: DashMap::new(),
            synced_tx,
            synced_rx,
            handler,
            sync_policy,
            resync_interval,
        }
    }

    /// Point-in-time snapshot lookup. Lock-free; safe from any worker.
    pub fn get(
        &self,
        key: &ObjectKey,
    ) -> Option<Arc<TrackedObject>> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    /// True once the initial upstream listing has been fully applied
    pub fn has_synced(&self) -> bool {
        *self.synced_rx.borrow()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Block until the initial sync completes, up to `timeout`.
    pub async fn wait_for_sync(
        &self,
        timeout: Duration,
    ) -> Result<()> {
        let mut rx = self.synced_rx.clone();
        tokio::time::timeout(timeout, rx.wait_for(|synced| *synced))
            .await
            .map_err(|_| Error::from(crate::SystemError::Sync(SyncError::SyncTimeout(timeout))))?
            .map_err(|_| {
                Error::from(crate::SystemError::Sync(SyncError::StreamLost(
                    "sync loop terminated".to_string(),
                )))
            })?;
        Ok(())
    }

    /// Ingestion loop: list, mark synced, then watch until shutdown.
    ///
    /// Startup failures (listing or watch establishment beyond the retry
    /// budget) are fatal and surface to the supervisor. After the initial
    /// sync a lost stream is recovered indefinitely: backoff, fresh list,
    /// diff against the cache, resume watching.
    pub async fn run(
        &self,
        source: Arc<dyn ObjectSource>,
        mut shutdown_signal: watch::Receiver<()>,
    ) -> Result<()> {
        // 1. Initial listing within the bounded retry budget
        let listing = match self.initial_list(&source, &mut shutdown_signal).await? {
            Some(listing) => listing,
            None => return Ok(()), // shutdown during startup
        };
        for obj in listing {
            self.apply_upsert(obj);
        }

        // 2. Establish the watch, same startup budget
        let mut stream = match self.initial_watch(&source, &mut shutdown_signal).await? {
            Some(stream) => stream,
            None => return Ok(()),
        };

        // 3. Sync is complete: the listing is applied and no further
        //    change can slip past the subscription
        self.synced_tx.send_replace(true);
        info!("[Mirror] initial sync complete, {} object(s) cached", self.objects.len());

        // 4. Ingest until told to stop
        let mut resync = interval_at(Instant::now() + self.resync_interval, self.resync_interval);
        resync.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                // P0: shutdown received;
                _ = shutdown_signal.changed() => {
                    warn!("[Mirror] shutdown signal received.");
                    return Ok(());
                }

                _ = resync.tick() => {
                    self.resync();
                }

                event = stream.next() => {
                    match event {
                        Some(Ok(event)) => self.apply_event(event),
                        Some(Err(e)) => {
                            match self.reconnect(&source, &mut shutdown_signal, e.to_string()).await {
                                Some(next) => stream = next,
                                None => return Ok(()),
                            }
                        }
                        None => {
                            let reason = "stream closed by upstream".to_string();
                            match self.reconnect(&source, &mut shutdown_signal, reason).await {
                                Some(next) => stream = next,
                                None => return Ok(()),
                            }
                        }
                    }
                }
            }
        }
    }

    /// Initial listing with the startup retry budget. `Ok(None)` means a
    /// shutdown arrived while retrying.
    async fn initial_list(
        &self,
        source: &Arc<dyn ObjectSource>,
        shutdown_signal: &mut watch::Receiver<()>,
    ) -> Result<Option<Vec<TrackedObject>>> {
        let budget = self.sync_policy.max_retries.max(1);
        for attempt in 1..=budget {
            match source.list().await {
                Ok(listing) => return Ok(Some(listing)),
                Err(e) => {
                    if attempt == budget {
                        return Err(crate::SystemError::Sync(SyncError::ListFailed {
                            attempts: attempt,
                            reason: e.to_string(),
                        })
                        .into());
                    }
                    let delay = self.sync_policy.delay_for(attempt as u32);
                    warn!("[Mirror] initial listing attempt {} failed: {}, retrying in {:?}", attempt, e, delay);
                    tokio::select! {
                        _ = shutdown_signal.changed() => return Ok(None),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
        unreachable!("retry budget loop always returns");
    }

    async fn initial_watch(
        &self,
        source: &Arc<dyn ObjectSource>,
        shutdown_signal: &mut watch::Receiver<()>,
    ) -> Result<Option<WatchStream>> {
        let budget = self.sync_policy.max_retries.max(1);
        for attempt in 1..=budget {
            match source.watch().await {
                Ok(stream) => return Ok(Some(stream)),
                Err(e) => {
                    if attempt == budget {
                        return Err(crate::SystemError::Sync(SyncError::WatchEstablishFailed {
                            attempts: attempt,
                            reason: e.to_string(),
                        })
                        .into());
                    }
                    let delay = self.sync_policy.delay_for(attempt as u32);
                    warn!("[Mirror] watch attempt {} failed: {}, retrying in {:?}", attempt, e, delay);
                    tokio::select! {
                        _ = shutdown_signal.changed() => return Ok(None),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
        unreachable!("retry budget loop always returns");
    }

    /// Recover a lost stream after the initial sync: backoff, re-list, diff
    /// the cache, resume watching. Never gives up; only a shutdown signal
    /// ends the loop (`None`).
    async fn reconnect(
        &self,
        source: &Arc<dyn ObjectSource>,
        shutdown_signal: &mut watch::Receiver<()>,
        reason: String,
    ) -> Option<WatchStream> {
        warn!("[Mirror] {}", SyncError::StreamLost(reason));

        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            metrics::WATCH_RECONNECTS_TOTAL.inc();
            let delay = self.sync_policy.delay_for(attempt);
            tokio::select! {
                _ = shutdown_signal.changed() => return None,
                _ = tokio::time::sleep(delay) => {}
            }

            // Subscribe before re-listing so no change slips between the
            // snapshot and the new stream; duplicates are the queue's job
            let stream = match source.watch().await {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("[Mirror] watch re-establish attempt {} failed: {}", attempt, e);
                    continue;
                }
            };

            match source.list().await {
                Ok(listing) => {
                    self.apply_relist(listing);
                    info!("[Mirror] watch re-established after {} attempt(s)", attempt);
                    return Some(stream);
                }
                Err(e) => {
                    warn!("[Mirror] re-list attempt {} failed: {}", attempt, e);
                }
            }
        }
    }

    pub(crate) fn apply_event(
        &self,
        event: WatchEvent,
    ) {
        match event {
            WatchEvent::Upserted(obj) => self.apply_upsert(obj),
            WatchEvent::Removed(obj) => {
                let key = obj.key.clone();
                let last_known = self
                    .objects
                    .remove(&key)
                    .map(|(_, cached)| cached)
                    .unwrap_or_else(|| Arc::new(obj));
                self.handler.on_remove(Removal::Known(last_known));
            }
            WatchEvent::RemovedUnknown(key) => match self.objects.remove(&key) {
                Some((_, cached)) => self.handler.on_remove(Removal::Known(cached)),
                None => self.handler.on_remove(Removal::Unknown(key)),
            },
        }
    }

    pub(crate) fn apply_upsert(
        &self,
        obj: TrackedObject,
    ) {
        let new = Arc::new(obj);
        let old = self.objects.insert(new.key.clone(), new.clone());
        self.handler.on_upsert(old, new);
    }

    /// Reconcile the cache against a fresh listing after a reconnect.
    /// Changed or new objects surface as upserts, vanished objects as
    /// removals with their last cached state.
    pub(crate) fn apply_relist(
        &self,
        listing: Vec<TrackedObject>,
    ) {
        let mut listed: HashSet<ObjectKey> = HashSet::with_capacity(listing.len());
        for obj in listing {
            listed.insert(obj.key.clone());
            let unchanged = self
                .objects
                .get(&obj.key)
                .map(|cur| cur.version == obj.version)
                .unwrap_or(false);
            if !unchanged {
                self.apply_upsert(obj);
            }
        }

        let vanished: Vec<ObjectKey> = self
            .objects
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|key| !listed.contains(key))
            .collect();
        for key in vanished {
            if let Some((_, cached)) = self.objects.remove(&key) {
                self.handler.on_remove(Removal::Known(cached));
            }
        }
    }

    /// Re-deliver every cached object as a synthetic upsert. The change
    /// filter tells these apart from genuine updates by the unchanged
    /// version marker.
    pub(crate) fn resync(&self) {
        metrics::RESYNC_TOTAL.inc();
        let snapshot: Vec<Arc<TrackedObject>> =
            self.objects.iter().map(|entry| entry.value().clone()).collect();
        debug!("[Mirror] resync tick, re-delivering {} object(s)", snapshot.len());
        for obj in snapshot {
            self.handler.on_upsert(Some(obj.clone()), obj);
        }
    }
}
