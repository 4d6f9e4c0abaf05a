//! Persistence bridge
//!
//! Loads and saves workflow documents through the persistence API and
//! keeps the editor session's dirty flag honest: loading installs a
//! clean graph, saving clears the flag only once the server accepted
//! the document.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use flowforge_core::EditorSession;

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::wire::WorkflowRecord;

/// Repository abstraction over workflow storage
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// List all workflows in a project
    async fn list_workflows(&self, project_id: &str) -> RuntimeResult<Vec<WorkflowRecord>>;

    /// Fetch a single workflow, if it exists
    ///
    /// The persistence API has no single-document read, so the default
    /// implementation filters the project listing.
    async fn fetch_workflow(
        &self,
        project_id: &str,
        workflow_id: &str,
    ) -> RuntimeResult<Option<WorkflowRecord>> {
        let workflows = self.list_workflows(project_id).await?;
        Ok(workflows.into_iter().find(|w| w.id == workflow_id))
    }

    /// Persist a workflow document, returning the stored version
    async fn save_workflow(
        &self,
        workflow_id: &str,
        record: &WorkflowRecord,
    ) -> RuntimeResult<WorkflowRecord>;
}

/// HTTP implementation of [`WorkflowRepository`]
pub struct HttpWorkflowRepository {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWorkflowRepository {
    /// Create a repository against the configured persistence API
    pub fn new(config: &RuntimeConfig) -> RuntimeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| RuntimeError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WorkflowRepository for HttpWorkflowRepository {
    async fn list_workflows(&self, project_id: &str) -> RuntimeResult<Vec<WorkflowRecord>> {
        let url = format!("{}/workflows/projects/{}", self.base_url, project_id);
        debug!(%url, "Listing workflows");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RuntimeError::PersistenceError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RuntimeError::PersistenceError(format!(
                "Workflow listing failed with status {}: {}",
                status, body
            )));
        }

        response
            .json::<Vec<WorkflowRecord>>()
            .await
            .map_err(|e| RuntimeError::PersistenceError(e.to_string()))
    }

    async fn save_workflow(
        &self,
        workflow_id: &str,
        record: &WorkflowRecord,
    ) -> RuntimeResult<WorkflowRecord> {
        let url = format!("{}/workflows/{}", self.base_url, workflow_id);
        debug!(%url, "Saving workflow");

        let response = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| RuntimeError::PersistenceError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RuntimeError::PersistenceError(format!(
                "Workflow save failed with status {}: {}",
                status, body
            )));
        }

        response
            .json::<WorkflowRecord>()
            .await
            .map_err(|e| RuntimeError::PersistenceError(e.to_string()))
    }
}

/// Bridges the editor session and the workflow repository
pub struct PersistenceBridge {
    repository: Arc<dyn WorkflowRepository>,
}

impl PersistenceBridge {
    /// Create a bridge over a repository
    pub fn new(repository: Arc<dyn WorkflowRepository>) -> Self {
        Self { repository }
    }

    /// Load a workflow into the session
    ///
    /// Replaces the session graph wholesale, restarts history around
    /// the loaded state, and clears the dirty flag.
    pub async fn load(
        &self,
        session: &mut EditorSession,
        project_id: &str,
        workflow_id: &str,
    ) -> RuntimeResult<WorkflowRecord> {
        let record = self
            .repository
            .fetch_workflow(project_id, workflow_id)
            .await?
            .ok_or_else(|| RuntimeError::NotFound(format!("Workflow {}", workflow_id)))?;

        session.replace_graph(record.nodes.clone(), record.edges.clone())?;
        info!(
            workflow_id = %record.id,
            nodes = record.nodes.len(),
            edges = record.edges.len(),
            "Loaded workflow into session"
        );
        Ok(record)
    }

    /// Save the session's current graph
    ///
    /// The dirty flag is cleared only on success; a rejected save
    /// leaves it raised so the caller can retry.
    pub async fn save(
        &self,
        session: &mut EditorSession,
        workflow_id: &str,
        name: &str,
    ) -> RuntimeResult<WorkflowRecord> {
        let record = WorkflowRecord::from_snapshot(workflow_id, name, session.snapshot());
        let saved = self.repository.save_workflow(workflow_id, &record).await?;
        session.mark_saved();
        info!(workflow_id = %saved.id, "Saved workflow");
        Ok(saved)
    }
}

/// In-memory repository for tests
#[cfg(any(test, feature = "testing"))]
pub mod memory {
    use std::collections::HashMap;

    use tokio::sync::Mutex;

    use super::*;

    /// A [`WorkflowRepository`] backed by a map, keyed by project id
    #[derive(Default)]
    pub struct MemoryWorkflowRepository {
        workflows: Mutex<HashMap<String, Vec<WorkflowRecord>>>,
    }

    impl MemoryWorkflowRepository {
        /// Create an empty repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a workflow into a project
        pub async fn insert(&self, project_id: &str, record: WorkflowRecord) {
            let mut workflows = self.workflows.lock().await;
            workflows
                .entry(project_id.to_string())
                .or_default()
                .push(record);
        }
    }

    #[async_trait]
    impl WorkflowRepository for MemoryWorkflowRepository {
        async fn list_workflows(&self, project_id: &str) -> RuntimeResult<Vec<WorkflowRecord>> {
            let workflows = self.workflows.lock().await;
            Ok(workflows.get(project_id).cloned().unwrap_or_default())
        }

        async fn save_workflow(
            &self,
            workflow_id: &str,
            record: &WorkflowRecord,
        ) -> RuntimeResult<WorkflowRecord> {
            let mut workflows = self.workflows.lock().await;
            for project in workflows.values_mut() {
                if let Some(existing) = project.iter_mut().find(|w| w.id == workflow_id) {
                    *existing = record.clone();
                    return Ok(record.clone());
                }
            }
            Err(RuntimeError::NotFound(format!("Workflow {}", workflow_id)))
        }
    }
}
