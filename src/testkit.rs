//! Scripted transports for deterministic testing
//!
//! No network, no timing dependence: a [`ScriptedTransport`] answers
//! status queries from a fixed script and counts every exchange, so tests
//! can assert exact send/poll/dial totals. Only compiled for tests or
//! when the `testkit` feature is enabled.

#![cfg(any(test, feature = "testkit"))]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::connection::{ConnectionManager, Connector, Transport, TransportError};
use crate::instruction::{CallDescription, Instruction};
use crate::submit::{SubmissionCoordinator, SubmitPolicy};
use crate::types::{Endpoint, TxId, TxStatus};

/// What the simulated endpoint answers, in query order
#[derive(Debug, Clone)]
pub enum StatusScript {
    /// Pending until query number `polls`, which confirms
    ConfirmAfter { polls: u32, slot: u64 },

    /// Rejected on the first query
    RejectWith { reason: String },

    /// The first `failures` queries fail transiently, then `polls_after`
    /// more queries run (pending until the last, which confirms)
    TransientThenConfirm {
        failures: u32,
        polls_after: u32,
        slot: u64,
    },

    /// Pending forever
    NeverConfirm,
}

/// Deterministic transport driven by a [`StatusScript`]
///
/// Counters survive reconnects because the connector hands out the same
/// transport on every dial, the way a real endpoint's state survives a
/// dropped session.
pub struct ScriptedTransport {
    script: StatusScript,
    sends: AtomicU64,
    queries: AtomicU64,
}

impl ScriptedTransport {
    pub fn new(script: StatusScript) -> Self {
        Self {
            script,
            sends: AtomicU64::new(0),
            queries: AtomicU64::new(0),
        }
    }

    /// Instructions sent so far
    pub fn sends(&self) -> u64 {
        self.sends.load(Ordering::SeqCst)
    }

    /// Status queries so far, including ones that failed transiently
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    fn fake_tx_id(n: u64) -> TxId {
        let mut bytes = [0u8; 64];
        bytes[0] = n as u8;
        bytes[1] = (n >> 8) as u8;
        TxId::new(bs58::encode(&bytes).into_string())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_instruction(&self, _instruction: &Instruction) -> Result<TxId, TransportError> {
        let n = self.sends.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Self::fake_tx_id(n))
    }

    async fn query_status(&self, _id: &TxId) -> Result<TxStatus, TransportError> {
        let n = (self.queries.fetch_add(1, Ordering::SeqCst) + 1) as u32;

        match &self.script {
            StatusScript::ConfirmAfter { polls, slot } => {
                if n >= *polls {
                    Ok(TxStatus::Confirmed { slot: Some(*slot) })
                } else {
                    Ok(TxStatus::Pending)
                }
            }
            StatusScript::RejectWith { reason } => Ok(TxStatus::Rejected {
                reason: reason.clone(),
            }),
            StatusScript::TransientThenConfirm {
                failures,
                polls_after,
                slot,
            } => {
                if n <= *failures {
                    Err(TransportError::SessionDropped(format!(
                        "scripted drop on query {}",
                        n
                    )))
                } else if n >= failures + polls_after {
                    Ok(TxStatus::Confirmed { slot: Some(*slot) })
                } else {
                    Ok(TxStatus::Pending)
                }
            }
            StatusScript::NeverConfirm => Ok(TxStatus::Pending),
        }
    }
}

/// Connector handing out one shared [`ScriptedTransport`]
pub struct ScriptedConnector {
    transport: Arc<ScriptedTransport>,
    dials: AtomicU64,
    failing_dials: u32,
}

impl ScriptedConnector {
    pub fn new(transport: Arc<ScriptedTransport>) -> Self {
        Self {
            transport,
            dials: AtomicU64::new(0),
            failing_dials: 0,
        }
    }

    /// The first `n` dials fail as unreachable
    pub fn failing_first(transport: Arc<ScriptedTransport>, n: u32) -> Self {
        Self {
            transport,
            dials: AtomicU64::new(0),
            failing_dials: n,
        }
    }

    pub fn dials(&self) -> u64 {
        self.dials.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn dial(&self, endpoint: &Endpoint) -> Result<Arc<dyn Transport>, TransportError> {
        let d = self.dials.fetch_add(1, Ordering::SeqCst) + 1;
        if d <= self.failing_dials as u64 {
            return Err(TransportError::Unreachable(format!(
                "scripted dial failure {} to {}",
                d, endpoint.url
            )));
        }
        Ok(Arc::clone(&self.transport) as Arc<dyn Transport>)
    }
}

/// A well-formed 32-byte program id fixture
pub fn test_program_id() -> String {
    bs58::encode(&[1u8; 32]).into_string()
}

/// The call the simplest caller makes: `initialize` with no arguments
pub fn initialize_call() -> CallDescription {
    CallDescription::no_args(test_program_id(), "initialize")
}

/// Wire a coordinator to a scripted endpoint
pub fn harness(
    script: StatusScript,
    policy: SubmitPolicy,
) -> (
    SubmissionCoordinator,
    Arc<ScriptedTransport>,
    Arc<ScriptedConnector>,
) {
    let transport = Arc::new(ScriptedTransport::new(script));
    let connector = Arc::new(ScriptedConnector::new(Arc::clone(&transport)));
    let manager = ConnectionManager::new(
        Endpoint::new("http://127.0.0.1:18899", "localnet"),
        Arc::clone(&connector) as Arc<dyn Connector>,
    );
    (
        SubmissionCoordinator::new(manager, policy),
        transport,
        connector,
    )
}
