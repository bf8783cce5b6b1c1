//! Shared helpers for integration tests: a scripted upstream source and a
//! recording sink built against the public crate API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio_stream::wrappers::UnboundedReceiverStream;

use vigil::Controller;
use vigil::ControllerBuilder;
use vigil::EmitError;
use vigil::NotificationSink;
use vigil::ObjectKey;
use vigil::ObjectSource;
use vigil::ReasonCode;
use vigil::Settings;
use vigil::Severity;
use vigil::StoreError;
use vigil::TrackedObject;
use vigil::WatchEvent;
use vigil::WatchStream;

type EventResult = Result<WatchEvent, StoreError>;

/// In-memory upstream store: `list` serves the current map, `watch` fans
/// pushed events out to every live subscriber.
#[derive(Default)]
pub struct ScriptedSource {
    objects: Mutex<HashMap<ObjectKey, TrackedObject>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<EventResult>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_upsert(
        &self,
        obj: TrackedObject,
    ) {
        self.objects.lock().insert(obj.key.clone(), obj.clone());
        self.broadcast(Ok(WatchEvent::Upserted(obj)));
    }

    pub fn push_remove(
        &self,
        key: &ObjectKey,
    ) {
        let removed = self.objects.lock().remove(key);
        match removed {
            Some(obj) => self.broadcast(Ok(WatchEvent::Removed(obj))),
            None => self.broadcast(Ok(WatchEvent::RemovedUnknown(key.clone()))),
        }
    }

    fn broadcast(
        &self,
        event: EventResult,
    ) {
        let mut subs = self.subscribers.lock();
        subs.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl ObjectSource for ScriptedSource {
    async fn list(&self) -> Result<Vec<TrackedObject>, StoreError> {
        Ok(self.objects.lock().values().cloned().collect())
    }

    async fn watch(&self) -> Result<WatchStream, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub subject: ObjectKey,
    pub severity: Severity,
    pub reason: ReasonCode,
    pub message: String,
}

#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.notifications.lock().len()
    }

    pub fn count_for(
        &self,
        subject: &ObjectKey,
    ) -> usize {
        self.notifications
            .lock()
            .iter()
            .filter(|n| &n.subject == subject)
            .count()
    }

    pub async fn wait_for_count(
        &self,
        n: usize,
        timeout: Duration,
    ) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.count() >= n {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.count() >= n
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn emit(
        &self,
        subject: &ObjectKey,
        severity: Severity,
        reason: ReasonCode,
        message: String,
    ) -> Result<(), EmitError> {
        self.notifications.lock().push(Notification {
            subject: subject.clone(),
            severity,
            reason,
            message,
        });
        Ok(())
    }
}

pub fn object_with(
    namespace: &str,
    name: &str,
    version: &str,
    annotations: &[(&str, &str)],
) -> TrackedObject {
    let annotations: HashMap<String, String> = annotations
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    TrackedObject::new(ObjectKey::new(namespace, name), annotations, version)
}

/// Date `offset_days` from today, formatted the way the expires-at
/// annotation expects.
pub fn date_from_today(offset_days: i64) -> String {
    (chrono::Local::now().date_naive() + chrono::Duration::days(offset_days))
        .format("%Y-%m-%d")
        .to_string()
}

pub struct TestController {
    pub source: Arc<ScriptedSource>,
    pub sink: Arc<RecordingSink>,
    pub controller: Arc<Controller>,
    pub shutdown_tx: watch::Sender<()>,
}

/// Build a controller over a scripted source with fast retry policies.
pub fn test_controller() -> TestController {
    let source = Arc::new(ScriptedSource::new());
    let sink = Arc::new(RecordingSink::new());

    let mut settings = Settings::default();
    settings.retry.sync.base_delay_ms = 1;
    settings.retry.sync.max_delay_ms = 5;
    settings.retry.reconcile.base_delay_ms = 1;
    settings.retry.reconcile.max_delay_ms = 5;

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let controller = ControllerBuilder::new(settings, shutdown_rx)
        .source(source.clone())
        .sink(sink.clone())
        .build()
        .ready()
        .expect("controller builds");

    TestController {
        source,
        sink,
        controller,
        shutdown_tx,
    }
}

pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        if tokio::time::Instant::now() > deadline {
            panic!("condition not reached in time");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
