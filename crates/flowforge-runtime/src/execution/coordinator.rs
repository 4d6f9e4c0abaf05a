//! Execution coordinator
//!
//! Drives one test run at a time: checks preconditions, submits the
//! full graph to the engine, then pumps the streaming channel into the
//! execution log and a typed event channel until a terminal event
//! arrives. Starting a new run supersedes the previous one.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use flowforge_core::GraphSnapshot;

use crate::error::{RuntimeError, RuntimeResult};
use crate::execution::log::{ExecutionLog, ExecutionLogEntry, NodeRunStatus};
use crate::execution::transport::{EventStream, ExecutionTransport};
use crate::wire::{EngineEvent, ExecuteRequest, RunInput};

/// Lifecycle of the coordinator's current run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run submitted yet
    Idle,
    /// Submission request in flight
    Submitting,
    /// Event stream open, run in progress
    Streaming,
    /// Terminal: the run finished successfully
    Completed,
    /// Terminal: the run failed (submission, transport, or engine)
    Failed,
    /// Terminal: the run was aborted or superseded
    Cancelled,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Finished successfully with the engine's final response payload
    Completed(Value),
    /// Failed with an error description
    Failed(String),
    /// Aborted locally or superseded by a newer run
    Cancelled,
}

/// Typed events forwarded to the run's consumer
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    /// The engine acknowledged the run
    Started {
        /// Engine-assigned execution id
        execution_id: String,
    },
    /// A node's log entry was created or updated
    NodeUpdated(ExecutionLogEntry),
    /// The run reached a terminal state
    Finished(RunOutcome),
}

/// Client-side handle to a streaming run
///
/// Dropping or aborting the handle detaches the client; the engine is
/// not asked to cancel the remote execution.
pub struct RunHandle {
    execution_id: String,
    events: mpsc::UnboundedReceiver<ExecutionEvent>,
    outcome: oneshot::Receiver<RunOutcome>,
    log: Arc<RwLock<ExecutionLog>>,
    state: Arc<RwLock<RunState>>,
    task: AbortHandle,
}

impl RunHandle {
    /// The engine-assigned execution id
    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Receive the next event; `None` once the run has finished and
    /// all events were drained
    pub async fn next_event(&mut self) -> Option<ExecutionEvent> {
        self.events.recv().await
    }

    /// Wait for the terminal outcome
    pub async fn outcome(self) -> RunOutcome {
        // A dropped sender means the streaming task was aborted
        self.outcome.await.unwrap_or(RunOutcome::Cancelled)
    }

    /// Snapshot of the execution log as of now
    pub async fn log(&self) -> ExecutionLog {
        self.log.read().await.clone()
    }

    /// Detach from the run without waiting for a terminal event
    pub async fn abort(&self) {
        self.task.abort();
        *self.state.write().await = RunState::Cancelled;
    }
}

/// Coordinates workflow test runs against the execution engine
pub struct ExecutionCoordinator {
    transport: Arc<dyn ExecutionTransport>,
    project_id: String,
    state: Arc<RwLock<RunState>>,
    log: Arc<RwLock<ExecutionLog>>,
    current: Mutex<Option<AbortHandle>>,
}

impl ExecutionCoordinator {
    /// Create a coordinator for a project
    pub fn new(transport: Arc<dyn ExecutionTransport>, project_id: impl Into<String>) -> Self {
        Self {
            transport,
            project_id: project_id.into(),
            state: Arc::new(RwLock::new(RunState::Idle)),
            log: Arc::new(RwLock::new(ExecutionLog::new())),
            current: Mutex::new(None),
        }
    }

    /// Current run state
    pub async fn state(&self) -> RunState {
        *self.state.read().await
    }

    /// Snapshot of the current run's execution log
    pub async fn log(&self) -> ExecutionLog {
        self.log.read().await.clone()
    }

    /// Submit the graph for execution and start streaming its events
    ///
    /// Preconditions are checked before any network call: the workflow
    /// must be non-empty and an acting user must be known (the tenant
    /// segment of the submission path is derived from it). A run
    /// already in flight is superseded: its task is aborted and its
    /// handle resolves as cancelled.
    pub async fn run(
        &self,
        acting_user: Option<&str>,
        snapshot: GraphSnapshot,
        input: RunInput,
    ) -> RuntimeResult<RunHandle> {
        let tenant = acting_user
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                RuntimeError::PreconditionError("no acting user to derive a tenant from".to_string())
            })?
            .to_string();

        if snapshot.nodes.is_empty() {
            return Err(RuntimeError::PreconditionError(
                "cannot run an empty workflow".to_string(),
            ));
        }

        // Supersede any run still in flight
        {
            let mut current = self.current.lock().await;
            if let Some(previous) = current.take() {
                info!("Superseding previous run");
                previous.abort();
            }
        }

        *self.state.write().await = RunState::Submitting;
        self.log.write().await.clear();

        let request = ExecuteRequest::new(snapshot, input);
        let response = match self.transport.submit(&self.project_id, &tenant, &request).await {
            Ok(response) => response,
            Err(e) => {
                self.log
                    .write()
                    .await
                    .upsert(ExecutionLogEntry::system_error(e.to_string()));
                *self.state.write().await = RunState::Failed;
                return Err(e);
            }
        };
        info!(execution_id = %response.execution_id, "Execution submitted");

        let stream = match self.transport.connect(&response.websocket_url).await {
            Ok(stream) => stream,
            Err(e) => {
                self.log
                    .write()
                    .await
                    .upsert(ExecutionLogEntry::system_error(e.to_string()));
                *self.state.write().await = RunState::Failed;
                return Err(e);
            }
        };
        *self.state.write().await = RunState::Streaming;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let log = Arc::clone(&self.log);
        let state = Arc::clone(&self.state);

        let task = tokio::spawn(pump_events(stream, log, Arc::clone(&state), events_tx, outcome_tx));
        let abort = task.abort_handle();
        *self.current.lock().await = Some(abort.clone());

        Ok(RunHandle {
            execution_id: response.execution_id,
            events: events_rx,
            outcome: outcome_rx,
            log: Arc::clone(&self.log),
            state,
            task: abort,
        })
    }
}

// Reads the stream to a terminal event, mirroring node events into the
// shared log and forwarding typed events to the handle.
async fn pump_events(
    mut stream: Box<dyn EventStream>,
    log: Arc<RwLock<ExecutionLog>>,
    state: Arc<RwLock<RunState>>,
    events: mpsc::UnboundedSender<ExecutionEvent>,
    outcome_tx: oneshot::Sender<RunOutcome>,
) {
    let outcome = loop {
        let message = match stream.next_message().await {
            Ok(Some(message)) => message,
            Ok(None) => {
                break RunOutcome::Failed(
                    "event stream closed before a terminal event".to_string(),
                )
            }
            Err(e) => {
                log.write()
                    .await
                    .upsert(ExecutionLogEntry::system_error(e.to_string()));
                break RunOutcome::Failed(e.to_string());
            }
        };

        match message.event {
            EngineEvent::ExecutionStarted => {
                debug!("Execution started");
                let _ = events.send(ExecutionEvent::Started {
                    execution_id: message.execution_id.clone().unwrap_or_default(),
                });
            }
            EngineEvent::NodeStarted | EngineEvent::NodeCompleted | EngineEvent::NodeFailed => {
                let Some(node_id) = message.node_id() else {
                    warn!("Node event without a nodeId; skipping");
                    continue;
                };
                let status = match message.event {
                    EngineEvent::NodeStarted => NodeRunStatus::Running,
                    EngineEvent::NodeCompleted => NodeRunStatus::Completed,
                    _ => NodeRunStatus::Error,
                };
                let mut entry = ExecutionLogEntry::new(
                    node_id,
                    message.node_name().unwrap_or(node_id),
                    status,
                );
                entry.node_kind = message.node_kind().map(str::to_string);
                if let Some(timestamp) = message.timestamp {
                    entry.timestamp = timestamp;
                }
                entry.duration_ms = message.duration_ms();
                entry.output = message.output().cloned();
                entry.error = message.error().map(str::to_string);

                log.write().await.upsert(entry.clone());
                let _ = events.send(ExecutionEvent::NodeUpdated(entry));
            }
            EngineEvent::ExecutionCompleted => {
                break RunOutcome::Completed(message.response().cloned().unwrap_or(Value::Null));
            }
            EngineEvent::ExecutionFailed => {
                break RunOutcome::Failed(
                    message.error().unwrap_or("execution failed").to_string(),
                );
            }
        }
    };

    *state.write().await = match &outcome {
        RunOutcome::Completed(_) => RunState::Completed,
        RunOutcome::Failed(_) => RunState::Failed,
        RunOutcome::Cancelled => RunState::Cancelled,
    };
    let _ = events.send(ExecutionEvent::Finished(outcome.clone()));
    let _ = outcome_tx.send(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::wire::ExecuteResponse;

    // Transport that must never be reached: preconditions fail first
    struct UnreachableTransport;

    #[async_trait]
    impl ExecutionTransport for UnreachableTransport {
        async fn submit(
            &self,
            _project_id: &str,
            _tenant: &str,
            _request: &ExecuteRequest,
        ) -> RuntimeResult<ExecuteResponse> {
            Err(RuntimeError::InternalError(
                "transport reached despite failed precondition".to_string(),
            ))
        }

        async fn connect(&self, _url: &str) -> RuntimeResult<Box<dyn EventStream>> {
            Err(RuntimeError::InternalError(
                "transport reached despite failed precondition".to_string(),
            ))
        }
    }

    fn non_empty_snapshot() -> GraphSnapshot {
        use flowforge_core::{Node, NodeKind, Position};
        GraphSnapshot {
            nodes: vec![Node::new("1", NodeKind::ApiEntry, Position::default())],
            edges: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_missing_identity_fails_before_any_network_call() {
        let coordinator =
            ExecutionCoordinator::new(Arc::new(UnreachableTransport), "p1");

        let result = coordinator
            .run(None, non_empty_snapshot(), RunInput::default())
            .await;
        assert!(matches!(result, Err(RuntimeError::PreconditionError(_))));
        assert_eq!(coordinator.state().await, RunState::Idle);
        assert!(coordinator.log().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_workflow_fails_before_any_network_call() {
        let coordinator =
            ExecutionCoordinator::new(Arc::new(UnreachableTransport), "p1");

        let result = coordinator
            .run(Some("user-1"), GraphSnapshot::default(), RunInput::default())
            .await;
        assert!(matches!(result, Err(RuntimeError::PreconditionError(_))));
        assert_eq!(coordinator.state().await, RunState::Idle);
    }
}
