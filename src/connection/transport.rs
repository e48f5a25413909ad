//! Wire boundary with the remote execution service
//!
//! The exchange is opaque request/response: "send instruction" and
//! "query status by identifier". Everything chain-specific sits behind
//! [`Transport`].

use async_trait::async_trait;
use thiserror::Error;

use crate::error::SubmitError;
use crate::instruction::Instruction;
use crate::types::{Endpoint, TxId, TxStatus};

/// Transport-level failure taxonomy
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Endpoint could not be reached at all
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// An established session dropped mid-exchange
    #[error("session dropped: {0}")]
    SessionDropped(String),

    /// The endpoint refused our credentials
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// The endpoint answered with something we cannot interpret
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    /// Whether the fault is presumed recoverable by reconnecting
    ///
    /// Transient faults trigger the coordinator's reconnect path; the
    /// rest surface immediately.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::SessionDropped(_))
    }

    /// Lift into the caller-facing error, attaching endpoint context
    pub fn into_submit_error(self, endpoint: &Endpoint) -> SubmitError {
        SubmitError::connection(endpoint.url.clone(), self.to_string())
    }
}

/// Opaque exchange with the execution service
///
/// Implementations must be safe to share across tasks; the coordinator
/// holds one per connection and never sends the same instruction twice.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hand the instruction to the endpoint; returns its transaction id
    async fn send_instruction(&self, instruction: &Instruction) -> Result<TxId, TransportError>;

    /// Ask the endpoint for the current status of a submitted instruction
    async fn query_status(&self, id: &TxId) -> Result<TxStatus, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(TransportError::Unreachable("down".into()).is_transient());
        assert!(TransportError::SessionDropped("reset".into()).is_transient());

        assert!(!TransportError::AuthRejected("bad key".into()).is_transient());
        assert!(!TransportError::Protocol("garbage".into()).is_transient());
    }

    #[test]
    fn test_lift_to_submit_error() {
        let endpoint = Endpoint::new("http://127.0.0.1:8899", "localnet");
        let err = TransportError::Unreachable("refused".into()).into_submit_error(&endpoint);
        match err {
            SubmitError::Connection { endpoint, message } => {
                assert_eq!(endpoint, "http://127.0.0.1:8899");
                assert!(message.contains("refused"));
            }
            other => panic!("expected Connection, got {:?}", other),
        }
    }
}
