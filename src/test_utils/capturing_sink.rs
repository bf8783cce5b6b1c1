use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::EmitError;
use crate::NotificationSink;
use crate::ObjectKey;
use crate::ReasonCode;
use crate::Severity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedNotification {
    pub subject: ObjectKey,
    pub severity: Severity,
    pub reason: ReasonCode,
    pub message: String,
}

/// Notification sink that records every emission for later assertions.
/// Can be scripted to fail its next N emissions to drive the retry path.
#[derive(Default)]
pub struct CapturingSink {
    notifications: Mutex<Vec<CapturedNotification>>,
    emit_failures: AtomicUsize,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` emit() calls
    pub fn fail_next_emits(
        &self,
        n: usize,
    ) {
        self.emit_failures.store(n, Ordering::SeqCst);
    }

    pub fn notifications(&self) -> Vec<CapturedNotification> {
        self.notifications.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.notifications.lock().len()
    }

    pub fn clear(&self) {
        self.notifications.lock().clear();
    }

    /// Poll until at least `n` notifications were captured, or time out.
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
impl NotificationSink for CapturingSink {
    async fn emit(
        &self,
        subject: &ObjectKey,
        severity: Severity,
        reason: ReasonCode,
        message: String,
    ) -> std::result::Result<(), EmitError> {
        if self
            .emit_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(EmitError::SinkUnavailable("scripted emit failure".to_string()));
        }
        self.notifications.lock().push(CapturedNotification {
            subject: subject.clone(),
            severity,
            reason,
            message,
        });
        Ok(())
    }
}
