//! Structured logging for the submission pipeline

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SubmitError;
use crate::types::TxId;

/// Correlation id threading one submission through the logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured logger for submission events
#[derive(Debug, Clone)]
pub struct SubmitLogger {
    correlation_id: CorrelationId,
}

impl SubmitLogger {
    pub fn new() -> Self {
        Self {
            correlation_id: CorrelationId::new(),
        }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    pub fn log_submission_started(&self, program: &str, method: &str) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            program = %program,
            method = %method,
            "Submission started"
        );
    }

    pub fn log_sent(&self, tx_id: &TxId) {
        tracing::debug!(
            correlation_id = %self.correlation_id,
            tx_id = %tx_id,
            "Instruction sent"
        );
    }

    pub fn log_confirmed(&self, tx_id: &TxId, polls: u32, elapsed_ms: u64) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            tx_id = %tx_id,
            polls = %polls,
            elapsed_ms = %elapsed_ms,
            "Submission confirmed"
        );
    }

    pub fn log_rejected(&self, reason: &str) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            reason = %reason,
            "Submission rejected"
        );
    }

    pub fn log_reconnect(&self, attempt: u32, budget: u32) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            attempt = %attempt,
            budget = %budget,
            "Transient fault, reconnecting"
        );
    }

    pub fn log_timeout(&self, elapsed_ms: u64) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            elapsed_ms = %elapsed_ms,
            "Confirmation deadline exceeded"
        );
    }

    pub fn log_failed(&self, category: &str, error: &SubmitError) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            category = %category,
            error = %error,
            "Submission failed"
        );
    }
}

impl Default for SubmitLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize the tracing subscriber; called once by the binary, never
/// by the library
pub fn init_logging(verbose: bool, json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = if verbose {
        "ferry=debug,info"
    } else {
        "ferry=info,warn,error"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| env_filter.into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = CorrelationId::new();
        let b = CorrelationId::new();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_logger_carries_its_id() {
        let logger = SubmitLogger::new();
        let id = logger.correlation_id().clone();
        let cloned = logger.clone();
        assert_eq!(cloned.correlation_id(), &id);
    }
}
