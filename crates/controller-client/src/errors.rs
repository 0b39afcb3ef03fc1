use thiserror::Error;

use pagepilot_core_types::AgentError;

#[derive(Debug, Error)]
pub enum ControllerError {
    /// Network-level failure to any endpoint. Recovered locally by
    /// treating the agent as disconnected; never fatal to persisted
    /// progress.
    #[error("controller unreachable: {0}")]
    Unreachable(String),
    #[error("controller rejected request with status {status}")]
    Rejected { status: u16 },
    #[error("malformed controller payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ControllerError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ControllerError::Rejected {
                status: status.as_u16(),
            },
            None => ControllerError::Unreachable(err.to_string()),
        }
    }
}

impl From<ControllerError> for AgentError {
    fn from(err: ControllerError) -> Self {
        AgentError::new(err.to_string())
    }
}
