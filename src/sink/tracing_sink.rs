use async_trait::async_trait;
use tracing::info;
use tracing::warn;

use super::NotificationSink;
use super::ReasonCode;
use super::Severity;
use crate::EmitError;
use crate::ObjectKey;

/// Sink that writes notifications to the process log stream.
///
/// Useful for wiring tests and for deployments where the audit system is
/// the log pipeline itself. Never fails.
#[derive(Debug, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn emit(
        &self,
        subject: &ObjectKey,
        severity: Severity,
        reason: ReasonCode,
        message: String,
    ) -> std::result::Result<(), EmitError> {
        match severity {
            Severity::Warning => {
                warn!(subject = %subject, reason = reason.as_str(), "{}", message)
            }
            Severity::Info => {
                info!(subject = %subject, reason = reason.as_str(), "{}", message)
            }
        }
        Ok(())
    }
}
