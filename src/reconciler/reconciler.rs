use std::sync::Arc;

use chrono::Local;
use chrono::NaiveDateTime;
use tracing::info;
use tracing::warn;

use crate::classify;
use crate::metrics;
use crate::ClassifyOutcome;
use crate::ExpirationStatus;
use crate::ExpirationVerdict;
use crate::Mirror;
use crate::NotificationSink;
use crate::ObjectKey;
use crate::ReasonCode;
use crate::ReconcileError;
use crate::Result;
use crate::Severity;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub struct Reconciler {
    mirror: Arc<Mirror>,
    sink: Arc<dyn NotificationSink>,
    clock: fn() -> NaiveDateTime,
}

impl Reconciler {
    pub fn new(
        mirror: Arc<Mirror>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            mirror,
            sink,
            clock: local_now,
        }
    }

    /// Test constructor with a fixed clock
    #[cfg(test)]
    pub(crate) fn with_clock(
        mirror: Arc<Mirror>,
        sink: Arc<dyn NotificationSink>,
        clock: fn() -> NaiveDateTime,
    ) -> Self {
        Self { mirror, sink, clock }
    }

    /// One reconciliation pass for `key`.
    ///
    /// A missing or untracked object is a clean no-op. A malformed
    /// annotation is a data error: diagnosed, treated as untracked, never
    /// retried. Only a failed emission returns `Err`, which routes the key
    /// through the rate-limited retry path.
    pub async fn reconcile(
        &self,
        key: &ObjectKey,
    ) -> Result<()> {
        let obj = match self.mirror.get(key) {
            Some(obj) => obj,
            None => {
                info!("[Reconciler] {} no longer exists", key);
                metrics::RECONCILE_TOTAL.with_label_values(&["gone"]).inc();
                return Ok(());
            }
        };

        match classify(&obj.annotations, (self.clock)()) {
            ClassifyOutcome::Untracked => {
                metrics::RECONCILE_TOTAL.with_label_values(&["untracked"]).inc();
                Ok(())
            }
            ClassifyOutcome::Invalid { reason } => {
                warn!("[Reconciler] {} treated as untracked: {}", key, reason);
                metrics::RECONCILE_TOTAL.with_label_values(&["invalid"]).inc();
                Ok(())
            }
            ClassifyOutcome::Tracked(verdict) => {
                info!(
                    "[Reconciler] {} | expires: {} | days: {}",
                    key,
                    verdict.expires_at.format("%Y-%m-%d"),
                    verdict.days_until
                );
                if verdict.lead_time_defaulted {
                    warn!(
                        "[Reconciler] {} has an invalid warn-before value, using the 7-day default",
                        key
                    );
                }
                self.emit_status(key, &verdict).await?;
                metrics::RECONCILE_TOTAL.with_label_values(&["emitted"]).inc();
                Ok(())
            }
        }
    }

    /// Report the current status. Runs on every pass, including unchanged
    /// ones: the sink is the system of record for "last known status" and
    /// must tolerate idempotent repeats.
    async fn emit_status(
        &self,
        key: &ObjectKey,
        verdict: &ExpirationVerdict,
    ) -> Result<()> {
        let date = verdict.expires_at.format("%Y-%m-%d");
        let (severity, reason, message) = match verdict.status() {
            ExpirationStatus::Expired => (
                Severity::Warning,
                ReasonCode::SecretExpired,
                format!(
                    "Secret expired {} days ago (expired on {})",
                    -verdict.days_until, date
                ),
            ),
            ExpirationStatus::ExpiringSoon => (
                Severity::Warning,
                ReasonCode::SecretExpiringSoon,
                format!(
                    "Secret expires in {} days (on {}). Warning threshold: {} days",
                    verdict.days_until,
                    date,
                    verdict.warn_days()
                ),
            ),
            ExpirationStatus::Valid => (
                Severity::Info,
                ReasonCode::SecretValid,
                format!(
                    "Secret is valid. Expires in {} days (on {})",
                    verdict.days_until, date
                ),
            ),
        };

        self.sink
            .emit(key, severity, reason, message)
            .await
            .map_err(ReconcileError::Emit)?;
        metrics::NOTIFICATIONS_EMITTED_TOTAL
            .with_label_values(&[reason.as_str()])
            .inc();
        Ok(())
    }
}
