use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::model::board::{Board, TaskId};
use crate::model::config::{BackendConfig, BackendKind};
use crate::model::status::{StatusResponse, StatusUpdate};

/// Why a status update did not go through. Every variant triggers rollback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("could not reach backend: {0}")]
    Transport(String),
    #[error("backend returned HTTP {status}")]
    Http { status: u16, body: String },
    #[error("malformed response from backend: {0}")]
    MalformedBody(String),
    #[error("{message}")]
    Rejected { message: String },
    #[error("backend misconfigured: {0}")]
    Misconfigured(String),
}

/// The one backend call the drag engine depends on.
pub trait StatusBackend: Send + Sync {
    fn update_status(&self, update: &StatusUpdate) -> Result<StatusResponse, BackendError>;
}

/// Collapse a raw reply into success (with the backend's message) or failure.
/// Anything but `success: true` is a failure.
pub fn confirm(outcome: Result<StatusResponse, BackendError>) -> Result<String, BackendError> {
    let response = outcome?;
    if response.success {
        Ok(response.message)
    } else {
        let message = if response.message.is_empty() {
            "status update rejected".to_string()
        } else {
            response.message
        };
        Err(BackendError::Rejected { message })
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// POSTs `{task_id, status}` as JSON and expects `{success, message}` back.
pub struct HttpBackend {
    agent: ureq::Agent,
    url: String,
}

impl HttpBackend {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        HttpBackend {
            agent,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StatusBackend for HttpBackend {
    fn update_status(&self, update: &StatusUpdate) -> Result<StatusResponse, BackendError> {
        debug!(task_id = update.task_id, status = %update.status, url = %self.url, "posting status update");
        let response = match self
            .agent
            .post(&self.url)
            .set("Accept", "application/json")
            .send_json(update)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                warn!(task_id = update.task_id, status, "status update failed");
                return Err(BackendError::Http { status, body });
            }
            Err(ureq::Error::Transport(err)) => {
                warn!(task_id = update.task_id, error = %err, "status update transport error");
                return Err(BackendError::Transport(err.to_string()));
            }
        };
        let body = response
            .into_string()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| BackendError::MalformedBody(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Local
// ---------------------------------------------------------------------------

/// Validates updates against a snapshot of the board without any network
/// I/O: the task must exist and the status must name a column.
pub struct LocalBackend {
    columns: HashSet<String>,
    tasks: HashSet<TaskId>,
}

impl LocalBackend {
    pub fn from_board(board: &Board) -> Self {
        LocalBackend {
            columns: board.columns.keys().cloned().collect(),
            tasks: board
                .columns
                .values()
                .flat_map(|c| c.cards.iter().map(|card| card.id))
                .collect(),
        }
    }
}

impl StatusBackend for LocalBackend {
    fn update_status(&self, update: &StatusUpdate) -> Result<StatusResponse, BackendError> {
        if !self.tasks.contains(&update.task_id) {
            return Ok(StatusResponse::failed(format!(
                "task {} not found",
                update.task_id
            )));
        }
        if !self.columns.contains(&update.status) {
            return Ok(StatusResponse::failed(format!(
                "invalid status: {}",
                update.status
            )));
        }
        Ok(StatusResponse::ok("task status updated"))
    }
}

/// Build the backend named by board.toml
pub fn backend_from_config(
    config: &BackendConfig,
    board: &Board,
) -> Result<Arc<dyn StatusBackend>, BackendError> {
    match config.kind {
        BackendKind::Local => Ok(Arc::new(LocalBackend::from_board(board))),
        BackendKind::Http => {
            let url = config
                .url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| {
                    BackendError::Misconfigured("backend.kind = \"http\" needs backend.url".into())
                })?;
            Ok(Arc::new(HttpBackend::new(
                url,
                Duration::from_millis(config.timeout_ms),
            )))
        }
    }
}
