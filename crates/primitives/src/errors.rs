use thiserror::Error;

use page_port::PageError;
use pagepilot_core_types::AgentError;

#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// The element is no longer interactable at call time.
    #[error("element not interactable: {0}")]
    NotInteractable(String),
    #[error(transparent)]
    Page(#[from] PageError),
}

impl From<PrimitiveError> for AgentError {
    fn from(err: PrimitiveError) -> Self {
        AgentError::new(err.to_string())
    }
}
