use thiserror::Error;

/// Caller-facing error taxonomy for a single submission
///
/// Every `submit` call resolves to a [`crate::types::SubmissionReceipt`]
/// or exactly one of these variants. Nothing is swallowed along the way:
/// encoding defects surface before any I/O, transient transport faults are
/// retried internally up to the reconnect budget and then surface as
/// `Connection`, and a rejection reported by the endpoint is final.
#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    /// Endpoint unreachable or session dropped beyond the reconnect budget
    #[error("Connection error: {message} (endpoint: {endpoint})")]
    Connection { endpoint: String, message: String },

    /// Malformed call description (bad program id, signature mismatch,
    /// unencodable argument)
    #[error("Encoding error: {reason}")]
    Encoding { reason: String },

    /// The execution service explicitly refused the instruction
    #[error("Instruction rejected: {reason}")]
    Rejected { reason: String },

    /// No confirmation within the policy window
    #[error("Timeout after {elapsed_ms}ms (policy: {timeout_ms}ms)")]
    Timeout { elapsed_ms: u64, timeout_ms: u64 },

    /// Caller-initiated cancellation observed mid-poll
    #[error("Submission cancelled")]
    Cancelled,
}

impl SubmitError {
    /// Whether re-submitting as a new logical operation might succeed
    ///
    /// The coordinator never resubmits internally; this is advice for the
    /// caller. A rejection is a definitive outcome, an encoding error is a
    /// caller input defect, and a cancellation was asked for.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Timeout { .. } => true,

            Self::Encoding { .. } => false,
            Self::Rejected { .. } => false,
            Self::Cancelled => false,
        }
    }

    /// Error category label for metrics and structured logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::Encoding { .. } => "encoding",
            Self::Rejected { .. } => "rejected",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}

// Convenience constructors for common failure sites
impl SubmitError {
    pub fn connection(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn encoding(reason: impl Into<String>) -> Self {
        Self::Encoding {
            reason: reason.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SubmitError::connection("http://localhost:8899", "refused");
        assert_eq!(
            err.to_string(),
            "Connection error: refused (endpoint: http://localhost:8899)"
        );

        let err = SubmitError::Timeout {
            elapsed_ms: 1200,
            timeout_ms: 1000,
        };
        assert_eq!(err.to_string(), "Timeout after 1200ms (policy: 1000ms)");
    }

    #[test]
    fn test_error_retryability() {
        assert!(SubmitError::connection("e", "down").is_retryable());
        assert!(SubmitError::Timeout {
            elapsed_ms: 30_000,
            timeout_ms: 30_000,
        }
        .is_retryable());

        assert!(!SubmitError::encoding("bad arg").is_retryable());
        assert!(!SubmitError::rejected("reverted").is_retryable());
        assert!(!SubmitError::Cancelled.is_retryable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(SubmitError::connection("e", "m").category(), "connection");
        assert_eq!(SubmitError::encoding("m").category(), "encoding");
        assert_eq!(SubmitError::rejected("m").category(), "rejected");
        assert_eq!(SubmitError::Cancelled.category(), "cancelled");
    }
}
