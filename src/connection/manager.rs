//! Session establishment and teardown
//!
//! The manager is constructed with an explicit endpoint and a dialing
//! strategy; nothing is read from ambient process-wide state. It reports
//! connect failures without retrying (the submission coordinator owns the
//! retry policy and calls back into `connect` for reconnects).

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::connection::transport::{Transport, TransportError};
use crate::error::SubmitError;
use crate::types::Endpoint;

/// Dialing strategy: how a transport session is established
#[async_trait]
pub trait Connector: Send + Sync {
    async fn dial(&self, endpoint: &Endpoint) -> Result<Arc<dyn Transport>, TransportError>;
}

/// An established session to the execution endpoint
///
/// Owned by a single submission; not shared across concurrent submits.
pub struct Connection {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
    session_id: Uuid,
    opened_at: Instant,
}

impl Connection {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// How long this session has been open
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

/// Owns connectivity to one endpoint
#[derive(Clone)]
pub struct ConnectionManager {
    endpoint: Endpoint,
    connector: Arc<dyn Connector>,
}

impl ConnectionManager {
    pub fn new(endpoint: Endpoint, connector: Arc<dyn Connector>) -> Self {
        Self {
            endpoint,
            connector,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Establish a session
    ///
    /// Failure conditions (unreachable endpoint, authentication
    /// rejection) are reported, never silently retried here.
    pub async fn connect(&self) -> Result<Connection, SubmitError> {
        match self.connector.dial(&self.endpoint).await {
            Ok(transport) => {
                let conn = Connection {
                    endpoint: self.endpoint.clone(),
                    transport,
                    session_id: Uuid::new_v4(),
                    opened_at: Instant::now(),
                };
                debug!(
                    endpoint = %conn.endpoint,
                    session_id = %conn.session_id,
                    "Connection established"
                );
                Ok(conn)
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Connect failed");
                Err(e.into_submit_error(&self.endpoint))
            }
        }
    }

    /// Release a session
    pub fn close(&self, conn: Connection) {
        debug!(
            endpoint = %conn.endpoint,
            session_id = %conn.session_id,
            age_ms = conn.age().as_millis() as u64,
            "Connection closed"
        );
        drop(conn);
    }

    /// Scoped acquisition: run `f` with a fresh connection, releasing it
    /// on every exit path, including failure inside `f`.
    pub async fn with_connection<T, F, Fut>(&self, f: F) -> Result<T, SubmitError>
    where
        F: FnOnce(Arc<Connection>) -> Fut,
        Fut: Future<Output = Result<T, SubmitError>>,
    {
        let conn = Arc::new(self.connect().await?);
        let result = f(Arc::clone(&conn)).await;

        match Arc::try_unwrap(conn) {
            Ok(conn) => self.close(conn),
            Err(leaked) => warn!(
                session_id = %leaked.session_id,
                "Connection still referenced at scope exit"
            ),
        }

        result
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
