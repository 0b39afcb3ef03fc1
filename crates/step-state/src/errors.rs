use thiserror::Error;

use pagepilot_core_types::AgentError;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state store i/o failure: {0}")]
    Io(String),
    #[error("corrupt state record: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StateError {
    fn from(err: std::io::Error) -> Self {
        StateError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Corrupt(err.to_string())
    }
}

impl From<StateError> for AgentError {
    fn from(err: StateError) -> Self {
        AgentError::new(err.to_string())
    }
}
