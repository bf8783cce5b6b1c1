//! Builder for constructing a [`Controller`] instance.
//!
//! Assembles the queue, dispatcher, mirror and reconciler in dependency
//! order and wires the shutdown channel through every task.
//!
//! ## Key Design Points
//! - **Defaults**: only the object source is mandatory; the sink defaults
//!   to [`TracingSink`].
//! - **Lifecycle**: `build()` assembles the component graph, `ready()`
//!   returns the initialized [`Controller`].

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use crate::ChangeDispatcher;
use crate::Controller;
use crate::Mirror;
use crate::NotificationSink;
use crate::ObjectSource;
use crate::Reconciler;
use crate::Result;
use crate::Settings;
use crate::SystemError;
use crate::TracingSink;
use crate::WorkQueue;

pub struct ControllerBuilder {
    settings: Settings,
    source: Option<Arc<dyn ObjectSource>>,
    sink: Option<Arc<dyn NotificationSink>>,
    shutdown_signal: watch::Receiver<()>,
    controller: Option<Arc<Controller>>,
}

impl ControllerBuilder {
    pub fn new(
        settings: Settings,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        Self {
            settings,
            source: None,
            sink: None,
            shutdown_signal,
            controller: None,
        }
    }

    /// Creates a builder with settings loaded from the optional config path
    /// plus environment overrides
    pub fn from_config_path(
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<()>,
    ) -> Result<Self> {
        if let Some(p) = config_path {
            info!("loading settings from: {}", p);
        }
        let settings = Settings::load(config_path)?;
        Ok(Self::new(settings, shutdown_signal))
    }

    /// Sets the upstream object source (mandatory)
    pub fn source(
        mut self,
        source: Arc<dyn ObjectSource>,
    ) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets a custom notification sink
    pub fn sink(
        mut self,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Assembles the component graph. A missing source is reported by
    /// `ready()`.
    pub fn build(mut self) -> Self {
        let source = match self.source.take() {
            Some(source) => source,
            None => return self,
        };

        let sink = self
            .sink
            .take()
            .unwrap_or_else(|| Arc::new(TracingSink));

        let queue = Arc::new(WorkQueue::new(self.settings.retry.reconcile));
        let dispatcher = Arc::new(ChangeDispatcher::new(queue.clone()));
        let mirror = Arc::new(Mirror::new(
            dispatcher,
            self.settings.retry.sync,
            Duration::from_millis(self.settings.sync.resync_interval_ms),
        ));
        let reconciler = Arc::new(Reconciler::new(mirror.clone(), sink));

        let controller = Controller {
            mirror,
            queue,
            reconciler,
            source,
            settings: Arc::new(self.settings.clone()),
            shutdown_signal: self.shutdown_signal.clone(),
            ready: AtomicBool::new(false),
        };

        self.controller = Some(Arc::new(controller));
        self
    }

    /// Returns the built controller instance after successful construction.
    ///
    /// # Errors
    /// Returns `ControllerStartFailed` if `build` hasn't completed (e.g. no
    /// object source was configured)
    pub fn ready(self) -> Result<Arc<Controller>> {
        self.controller.ok_or_else(|| {
            SystemError::ControllerStartFailed("no object source configured".to_string()).into()
        })
    }
}
