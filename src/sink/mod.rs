//! Notification sink boundary.
//!
//! The reconciler reports every classification result through
//! [`NotificationSink::emit`]. Delivery, storage and retention are the
//! sink's problem; the engine only requires that emission either succeeds
//! or returns an error it can retry. Sinks must tolerate idempotent
//! repeats: an unchanged `Valid` object is re-reported on every pass.

mod tracing_sink;
pub use tracing_sink::*;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::EmitError;
use crate::ObjectKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
}

/// Machine-readable reason attached to every notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    SecretValid,
    SecretExpiringSoon,
    SecretExpired,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::SecretValid => "SecretValid",
            ReasonCode::SecretExpiringSoon => "SecretExpiringSoon",
            ReasonCode::SecretExpired => "SecretExpired",
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn emit(
        &self,
        subject: &ObjectKey,
        severity: Severity,
        reason: ReasonCode,
        message: String,
    ) -> std::result::Result<(), EmitError>;
}
