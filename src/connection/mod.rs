//! Connection management
//!
//! Owns the session to the remote execution endpoint. The wire protocol
//! lives behind the [`Transport`] trait so chain-specific formats stay an
//! external collaborator's concern; [`HttpTransport`] is the provided
//! JSON-over-HTTP implementation. The [`ConnectionManager`] establishes
//! and tears down sessions and reports connect failures without retrying
//! them itself (retry policy lives in the submission coordinator).

mod http;
mod manager;
mod transport;

pub use http::{HttpConnector, HttpTransport};
pub use manager::{Connection, ConnectionManager, Connector};
pub use transport::{Transport, TransportError};
