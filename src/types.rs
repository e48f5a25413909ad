//! Shared value types for the submission pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::SubmitError;

/// Remote execution service identity
///
/// Immutable once a connection is established; owned by the connection
/// manager for the session lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Network address of the execution service
    pub url: String,

    /// Network identifier (cluster name)
    pub network: String,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            network: network.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.network)
    }
}

/// On-chain program identifier: 32 bytes, rendered as base58
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramId([u8; 32]);

impl ProgramId {
    pub const LEN: usize = 32;

    /// Parse a base58 string into a program id
    ///
    /// Fails with an `Encoding` error on malformed base58 or wrong length,
    /// so a bad program id surfaces at instruction build time, before any
    /// network traffic.
    pub fn parse(s: &str) -> Result<Self, SubmitError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SubmitError::encoding(format!("invalid program id '{}': {}", s, e)))?;

        if bytes.len() != Self::LEN {
            return Err(SubmitError::encoding(format!(
                "invalid program id '{}': expected {} bytes, got {}",
                s,
                Self::LEN,
                bytes.len()
            )));
        }

        let mut id = [0u8; Self::LEN];
        id.copy_from_slice(&bytes);
        Ok(Self(id))
    }

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

/// Opaque transaction identifier assigned by the execution service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Execution status reported by the endpoint for a submitted instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TxStatus {
    /// Not yet confirmed or rejected; keep polling
    Pending,

    /// Durably accepted and executed
    Confirmed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        slot: Option<u64>,
    },

    /// Definitively refused; never retried by the coordinator
    Rejected { reason: String },
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Terminal success value for one submission
///
/// Not mutated after creation; one receipt per submitted instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    /// Identifier assigned by the endpoint at send time
    pub tx_id: TxId,

    /// Confirmation slot, when the endpoint reports one
    pub slot: Option<u64>,

    /// Number of status queries performed before the terminal answer
    pub polls: u32,

    /// Wall-clock time the instruction was sent
    pub submitted_at: DateTime<Utc>,

    /// Time from send to confirmation
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_id_round_trip() {
        let id = ProgramId::from_bytes([7u8; 32]);
        let encoded = id.to_string();
        let parsed = ProgramId::parse(&encoded).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_program_id_rejects_wrong_length() {
        let short = bs58::encode(&[1u8; 16]).into_string();
        let err = ProgramId::parse(&short).unwrap_err();
        assert!(matches!(err, SubmitError::Encoding { .. }));
    }

    #[test]
    fn test_program_id_rejects_bad_base58() {
        // '0', 'I', 'O' and 'l' are outside the base58 alphabet
        let err = ProgramId::parse("0OIl").unwrap_err();
        assert!(matches!(err, SubmitError::Encoding { .. }));
    }

    #[test]
    fn test_status_serde_shape() {
        let confirmed: TxStatus =
            serde_json::from_str(r#"{"status":"confirmed","slot":42}"#).unwrap();
        assert_eq!(confirmed, TxStatus::Confirmed { slot: Some(42) });

        let pending: TxStatus = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert_eq!(pending, TxStatus::Pending);

        let rejected: TxStatus =
            serde_json::from_str(r#"{"status":"rejected","reason":"reverted"}"#).unwrap();
        assert!(rejected.is_terminal());
    }

    #[test]
    fn test_endpoint_display() {
        let ep = Endpoint::new("http://127.0.0.1:8899", "localnet");
        assert_eq!(ep.to_string(), "http://127.0.0.1:8899 (localnet)");
    }
}
