use thiserror::Error;

use pagepilot_core_types::AgentError;

#[derive(Debug, Error, Clone)]
pub enum PageError {
    /// The selector text is not valid in the host's selector engine.
    /// Callers walking a strategy chain treat this as "try the next
    /// strategy", not as a fault.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    /// The handle no longer resolves to a live node.
    #[error("stale element handle: {0}")]
    StaleHandle(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("page i/o failure: {0}")]
    Io(String),
}

impl From<PageError> for AgentError {
    fn from(err: PageError) -> Self {
        AgentError::new(err.to_string())
    }
}
