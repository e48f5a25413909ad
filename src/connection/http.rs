//! JSON-over-HTTP transport
//!
//! Request bodies are a small JSON envelope; the instruction payload
//! travels base64-encoded, the program id as base58, the selector as
//! hex. Faults are classified so the coordinator can tell transient
//! infrastructure trouble from definitive answers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connection::manager::Connector;
use crate::connection::transport::{Transport, TransportError};
use crate::instruction::Instruction;
use crate::types::{Endpoint, TxId, TxStatus};

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

#[derive(Serialize)]
struct RpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendParams {
    program: String,
    selector: String,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResult {
    tx_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusParams<'a> {
    tx_id: &'a str,
}

/// HTTP implementation of the transport boundary
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(endpoint: &Endpoint, request_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Protocol(format!("client build failed: {}", e)))?;

        Ok(Self {
            client,
            url: endpoint.url.clone(),
        })
    }

    /// Cheap liveness probe used at dial time
    ///
    /// An unreachable endpoint must fail `connect`, not the first send.
    pub async fn probe(&self) -> Result<(), TransportError> {
        let _: serde_json::Value = self.exchange("health", serde_json::json!({})).await?;
        Ok(())
    }

    async fn exchange<P: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: P,
    ) -> Result<T, TransportError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TransportError::AuthRejected(format!("HTTP {}", status)));
        }
        if status.is_server_error() {
            return Err(TransportError::SessionDropped(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(TransportError::Protocol(format!("HTTP {}", status)));
        }

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Protocol(format!("malformed response body: {}", e)))?;

        if let Some(err) = envelope.error {
            return Err(TransportError::Protocol(format!(
                "endpoint error {}: {}",
                err.code, err.message
            )));
        }

        envelope
            .result
            .ok_or_else(|| TransportError::Protocol("response carries neither result nor error".to_string()))
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Unreachable(err.to_string())
    } else if err.is_timeout() {
        TransportError::SessionDropped(format!("request timed out: {}", err))
    } else if err.is_request() || err.is_body() {
        TransportError::SessionDropped(err.to_string())
    } else {
        TransportError::Protocol(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_instruction(&self, instruction: &Instruction) -> Result<TxId, TransportError> {
        let params = SendParams {
            program: instruction.program_id().to_string(),
            selector: instruction.selector_hex(),
            data: base64::engine::general_purpose::STANDARD.encode(instruction.data()),
        };

        let result: SendResult = self.exchange("sendInstruction", params).await?;
        debug!(tx_id = %result.tx_id, "Instruction accepted by endpoint");
        Ok(TxId::new(result.tx_id))
    }

    async fn query_status(&self, id: &TxId) -> Result<TxStatus, TransportError> {
        self.exchange("getStatus", StatusParams { tx_id: id.as_str() })
            .await
    }
}

/// Dialing strategy producing [`HttpTransport`] sessions
///
/// The dial probes the endpoint so unreachable hosts surface as connect
/// failures.
pub struct HttpConnector {
    request_timeout: Duration,
}

impl HttpConnector {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS))
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn dial(&self, endpoint: &Endpoint) -> Result<Arc<dyn Transport>, TransportError> {
        let transport = HttpTransport::new(endpoint, self.request_timeout)?;
        transport.probe().await?;
        Ok(Arc::new(transport))
    }
}
