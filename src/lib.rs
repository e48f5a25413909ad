//! Ferry - Program-Call Submission Client
//!
//! A client for invoking methods on programs hosted by a remote execution
//! endpoint: build a typed instruction, send it over a managed connection,
//! and poll for confirmation under a retry/timeout policy.
//!
//! ## Architecture
//!
//! - **instruction**: pure call-description-to-payload encoding
//! - **connection**: session lifecycle and the transport boundary
//! - **submit**: the send-then-poll coordinator with backoff, reconnect
//!   budget, and cooperative cancellation
//! - **config / logging / metrics**: explicit configuration, structured
//!   tracing, lock-free accounting
//!
//! Everything is dependency-injected: callers build a
//! [`ConnectionManager`] and [`SubmissionCoordinator`] from explicit
//! configuration, never from ambient process-wide state.

pub mod config;
pub mod connection;
pub mod error;
pub mod instruction;
pub mod logging;
pub mod metrics;
pub mod submit;
pub mod testkit;
pub mod types;

// Re-export the caller-facing surface
pub use config::SubmitterConfig;
pub use connection::{
    Connection, ConnectionManager, Connector, HttpConnector, HttpTransport, Transport,
    TransportError,
};
pub use error::SubmitError;
pub use instruction::{ArgKind, ArgValue, CallDescription, Instruction};
pub use submit::{CancelHandle, SubmissionCoordinator, SubmitPolicy};
pub use types::{Endpoint, ProgramId, SubmissionReceipt, TxId, TxStatus};
