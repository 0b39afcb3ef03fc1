use thiserror::Error;

use page_port::PageError;
use pagepilot_core_types::AgentError;

#[derive(Debug, Error)]
pub enum LocateError {
    /// No strategy in the chain produced a visible match.
    #[error("no visible element matched {target}")]
    NotFound { target: String },
    /// The page itself failed underneath the lookup. Invalid selectors
    /// never surface here; they are skipped inside the chain.
    #[error(transparent)]
    Page(#[from] PageError),
}

impl From<LocateError> for AgentError {
    fn from(err: LocateError) -> Self {
        AgentError::new(err.to_string())
    }
}
