//! The controller's command vocabulary and execution outcomes.
//!
//! Commands arrive as flat JSON objects discriminated by a `type` tag.
//! The vocabulary is a closed enum: an unknown tag is rejected at
//! decode time and surfaced as `CommandFailure::UnknownCommandType`, so
//! the executor's handling stays exhaustively checked.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SessionId;

/// Element collection a positional (`index`) lookup resolves against.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementRole {
    Button,
    Link,
    Input,
}

/// Command payload, discriminated by the wire `type` tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CommandKind {
    Click {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        #[serde(
            default,
            rename = "elementType",
            skip_serializing_if = "Option::is_none"
        )]
        role: Option<ElementRole>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, rename = "delay", skip_serializing_if = "Option::is_none")]
        delay_ms: Option<u64>,
    },
    #[serde(rename = "type")]
    TypeText {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        value: String,
    },
    Wait {
        #[serde(default, rename = "duration", skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
    Navigate {
        url: String,
    },
    Check {
        condition: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Complete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Click { .. } => "click",
            CommandKind::TypeText { .. } => "type",
            CommandKind::Wait { .. } => "wait",
            CommandKind::Navigate { .. } => "navigate",
            CommandKind::Check { .. } => "check",
            CommandKind::Complete { .. } => "complete",
        }
    }
}

/// A unit of work issued by the controller. Pure input value: the agent
/// interprets it, never mutates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: CommandKind,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            id: None,
            description: None,
            kind,
        }
    }

    /// Identifier used in result reports: the explicit id when the
    /// controller set one, otherwise the command type.
    pub fn report_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| self.kind.name().to_string())
    }
}

/// Typed execution failure. Reported to the controller, never silently
/// dropped.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CommandFailure {
    #[error("no element matched the target: {0}")]
    ElementNotFound(String),
    #[error("element matched but is not visible: {0}")]
    ElementNotVisible(String),
    #[error("unknown command type: {0}")]
    UnknownCommandType(String),
    #[error("unknown check condition: {0}")]
    UnknownCheckCondition(String),
}

/// Boolean observation produced by a `check` command. A negative
/// observation is still a success.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CheckObservation {
    Exists {
        exists: bool,
        selector: String,
    },
    TextContains {
        contains: bool,
        text: String,
    },
    UrlContains {
        #[serde(rename = "urlMatch")]
        url_match: bool,
        #[serde(rename = "currentUrl")]
        current_url: String,
    },
}

/// Success payload per command kind, mirroring what the controller's
/// result log expects.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutcome {
    Clicked {
        clicked: bool,
        element: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Typed {
        typed: bool,
        field: String,
        value: String,
    },
    Waited {
        waited: bool,
        duration: u64,
    },
    Navigated {
        navigated: bool,
        url: String,
    },
    Checked(CheckObservation),
    Completed {
        completed: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl CommandOutcome {
    pub fn clicked(element: impl Into<String>, text: Option<String>) -> Self {
        CommandOutcome::Clicked {
            clicked: true,
            element: element.into(),
            text,
        }
    }

    pub fn typed(field: impl Into<String>, value: impl Into<String>) -> Self {
        CommandOutcome::Typed {
            typed: true,
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn waited(duration: u64) -> Self {
        CommandOutcome::Waited {
            waited: true,
            duration,
        }
    }

    pub fn navigated(url: impl Into<String>) -> Self {
        CommandOutcome::Navigated {
            navigated: true,
            url: url.into(),
        }
    }

    pub fn completed(message: Option<String>) -> Self {
        CommandOutcome::Completed {
            completed: true,
            message,
        }
    }
}

/// Outcome report for one executed command, shaped for
/// `POST /report-result`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandReport {
    pub session_id: SessionId,
    pub command_id: String,
    pub command: Command,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CommandOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: i64,
    pub url: String,
}

impl CommandReport {
    pub fn new(
        session_id: SessionId,
        command: Command,
        url: impl Into<String>,
        outcome: Result<CommandOutcome, CommandFailure>,
    ) -> Self {
        let command_id = command.report_id();
        let (success, result, error) = match outcome {
            Ok(payload) => (true, Some(payload), None),
            Err(failure) => (false, None, Some(failure.to_string())),
        };
        Self {
            session_id,
            command_id,
            command,
            success,
            result,
            error,
            timestamp: Utc::now().timestamp_millis(),
            url: url.into(),
        }
    }

    /// Report for a command that failed outside the typed taxonomy
    /// (the page itself broke underneath the executor). The error is
    /// carried verbatim; it still counts as a reported failure.
    pub fn failed(
        session_id: SessionId,
        command: Command,
        url: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let command_id = command.report_id();
        Self {
            session_id,
            command_id,
            command,
            success: false,
            result: None,
            error: Some(error.into()),
            timestamp: Utc::now().timestamp_millis(),
            url: url.into(),
        }
    }

    pub fn failure(&self) -> bool {
        !self.success
    }
}
