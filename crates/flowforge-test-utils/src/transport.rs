//! Scripted execution transport
//!
//! Replays prepared frame sequences instead of opening a network
//! connection; each `connect` consumes the next script in order.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use flowforge_runtime::error::{RuntimeError, RuntimeResult};
use flowforge_runtime::execution::transport::{EventStream, ExecutionTransport};
use flowforge_runtime::wire::{EngineMessage, ExecuteRequest, ExecuteResponse};

/// One scripted step of an event stream
#[derive(Debug, Clone)]
pub enum ScriptedFrame {
    /// Deliver an engine message
    Message(EngineMessage),
    /// Fail the stream with an error
    Error(String),
    /// Never resolve (the stream hangs until the task is aborted)
    Hang,
}

/// An [`ExecutionTransport`] that replays scripts
#[derive(Default)]
pub struct ScriptedTransport {
    submit_error: Option<String>,
    scripts: Mutex<VecDeque<Vec<ScriptedFrame>>>,
    submissions: Mutex<Vec<ExecuteRequest>>,
}

impl ScriptedTransport {
    /// A transport with no scripts queued
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose submissions are rejected with the given error
    pub fn rejecting(message: &str) -> Self {
        Self {
            submit_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Queue a stream script of plain messages for the next `connect`
    pub async fn script(&self, messages: Vec<EngineMessage>) {
        self.script_frames(messages.into_iter().map(ScriptedFrame::Message).collect())
            .await;
    }

    /// Queue a stream script of raw frames for the next `connect`
    pub async fn script_frames(&self, frames: Vec<ScriptedFrame>) {
        self.scripts.lock().await.push_back(frames);
    }

    /// Requests submitted so far, in order
    pub async fn submissions(&self) -> Vec<ExecuteRequest> {
        self.submissions.lock().await.clone()
    }
}

#[async_trait]
impl ExecutionTransport for ScriptedTransport {
    async fn submit(
        &self,
        _project_id: &str,
        tenant: &str,
        request: &ExecuteRequest,
    ) -> RuntimeResult<ExecuteResponse> {
        if let Some(message) = &self.submit_error {
            return Err(RuntimeError::SubmissionError(message.clone()));
        }

        let mut submissions = self.submissions.lock().await;
        submissions.push(request.clone());
        let n = submissions.len();
        Ok(ExecuteResponse {
            execution_id: format!("exec-{}", n),
            status: Some("running".to_string()),
            websocket_url: format!("ws://scripted/{}/exec-{}", tenant, n),
        })
    }

    async fn connect(&self, _url: &str) -> RuntimeResult<Box<dyn EventStream>> {
        let frames = self
            .scripts
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| RuntimeError::StreamingError("no script queued".to_string()))?;
        Ok(Box::new(ScriptedStream {
            frames: frames.into(),
        }))
    }
}

struct ScriptedStream {
    frames: VecDeque<ScriptedFrame>,
}

#[async_trait]
impl EventStream for ScriptedStream {
    async fn next_message(&mut self) -> RuntimeResult<Option<EngineMessage>> {
        match self.frames.pop_front() {
            Some(ScriptedFrame::Message(message)) => Ok(Some(message)),
            Some(ScriptedFrame::Error(e)) => Err(RuntimeError::StreamingError(e)),
            Some(ScriptedFrame::Hang) => std::future::pending().await,
            None => Ok(None),
        }
    }
}
