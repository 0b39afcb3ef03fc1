use thiserror::Error;

use pagepilot_core_types::{AgentError, StepStage};

/// Why the agent stopped. Once set, no further commands are requested
/// until an explicit reset.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum HaltReason {
    #[error("workflow complete")]
    Completed,
    /// CAPTCHA or verification UI observed. Always fatal to the run;
    /// the agent surfaces it and never attempts a bypass.
    #[error("challenge detected ({indicator}); resolve manually and reset")]
    ChallengeDetected { indicator: String },
    #[error("expected page transition did not occur: {context}")]
    NavigationTimeout { context: String },
    #[error("stopped")]
    Stopped,
}

/// Failure of one guarded step action. The action stays armed: the
/// ledger did not advance, so the same step can be retried without
/// restarting the workflow.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("step already completed")]
    AlreadyCompleted,
    #[error("step requires stage {required:?} first")]
    OutOfOrder { required: StepStage },
    #[error("controller disconnected; step actions disabled")]
    Disconnected,
    #[error("no generated profile available")]
    MissingProfile,
    #[error("halted: {0}")]
    Halted(HaltReason),
    #[error("{0}")]
    Locate(#[from] element_locator::LocateError),
    #[error("{0}")]
    Interact(#[from] interaction_primitives::PrimitiveError),
    #[error("{0}")]
    Page(#[from] page_port::PageError),
    #[error("{0}")]
    State(#[from] step_state::StateError),
    #[error("{0}")]
    Controller(#[from] controller_client::ControllerError),
}

impl From<StepError> for AgentError {
    fn from(err: StepError) -> Self {
        AgentError::new(err.to_string())
    }
}
