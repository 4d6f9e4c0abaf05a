//! Execution transport seam
//!
//! The coordinator talks to the engine through these traits so tests
//! can script submissions and event streams without a network. The
//! production implementation submits over HTTP and streams engine
//! events over a websocket.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::wire::{EngineMessage, ExecuteRequest, ExecuteResponse};

/// A stream of engine messages for one execution
#[async_trait]
pub trait EventStream: Send {
    /// Next message; `Ok(None)` means the channel closed cleanly
    async fn next_message(&mut self) -> RuntimeResult<Option<EngineMessage>>;
}

/// Submits executions and opens their event streams
#[async_trait]
pub trait ExecutionTransport: Send + Sync {
    /// Submit a workflow for execution on behalf of a tenant
    async fn submit(
        &self,
        project_id: &str,
        tenant: &str,
        request: &ExecuteRequest,
    ) -> RuntimeResult<ExecuteResponse>;

    /// Open the event stream announced by a submission response
    async fn connect(&self, url: &str) -> RuntimeResult<Box<dyn EventStream>>;
}

/// Production transport: HTTP submission + websocket streaming
pub struct HttpExecutionTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExecutionTransport {
    /// Create a transport against the configured execution engine
    pub fn new(config: &RuntimeConfig) -> RuntimeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| RuntimeError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.execution_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ExecutionTransport for HttpExecutionTransport {
    async fn submit(
        &self,
        project_id: &str,
        tenant: &str,
        request: &ExecuteRequest,
    ) -> RuntimeResult<ExecuteResponse> {
        let url = format!("{}/realtime/{}/{}/execute", self.base_url, project_id, tenant);
        debug!(%url, "Submitting execution");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| RuntimeError::SubmissionError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RuntimeError::SubmissionError(format!(
                "Execution submission failed with status {}: {}",
                status, body
            )));
        }

        response
            .json::<ExecuteResponse>()
            .await
            .map_err(|e| RuntimeError::SubmissionError(e.to_string()))
    }

    async fn connect(&self, url: &str) -> RuntimeResult<Box<dyn EventStream>> {
        debug!(%url, "Opening execution event stream");
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| RuntimeError::StreamingError(e.to_string()))?;
        Ok(Box::new(WebSocketEventStream { stream }))
    }
}

struct WebSocketEventStream {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl EventStream for WebSocketEventStream {
    async fn next_message(&mut self) -> RuntimeResult<Option<EngineMessage>> {
        loop {
            let frame = match self.stream.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => return Err(RuntimeError::StreamingError(e.to_string())),
                None => return Ok(None),
            };

            match frame {
                Message::Text(text) => match serde_json::from_str::<EngineMessage>(&text) {
                    Ok(message) => return Ok(Some(message)),
                    Err(e) => {
                        // Unknown event types and malformed frames are
                        // skipped rather than killing the run
                        warn!(error = %e, "Skipping unparseable engine message");
                    }
                },
                Message::Close(_) => return Ok(None),
                // Pings are answered by the protocol layer; binary and
                // pong frames carry nothing for us
                _ => {}
            }
        }
    }
}
