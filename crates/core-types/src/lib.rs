//! Shared primitives for the pagepilot automation agent.
//!
//! Identifier newtypes, the shared error type, and the data model that
//! crosses crate boundaries: step stages, commands and their outcomes,
//! page snapshots, and site classification.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod command;
pub mod profile;
pub mod site;
pub mod snapshot;
pub mod step;

pub use command::{
    CheckObservation, Command, CommandFailure, CommandKind, CommandOutcome, CommandReport,
    ElementRole,
};
pub use profile::UserProfile;
pub use site::{PageType, SiteHosts};
pub use snapshot::{ButtonEntry, ElementInventory, InputEntry, LinkEntry, PageSnapshot};
pub use step::StepStage;

/// Shared error type for the agent crates. Specific failures live in
/// per-crate error enums and convert into this at the boundaries.
#[derive(Debug, Error, Clone)]
pub enum AgentError {
    #[error("{message}")]
    Message { message: String },
}

impl AgentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Opaque identifier for one logical automation run, generated once per
/// page agent instance.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(format!("session-{}", Uuid::new_v4()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for a browser tab as observed by the background context.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// One logical automation run. Not persisted: a fresh session is minted
/// on every agent instantiation; continuity across navigations is
/// carried by the persisted step record instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn start() -> Self {
        Self {
            id: SessionId::new(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn agent_error_displays_message() {
        let err = AgentError::new("element vanished");
        assert_eq!(err.to_string(), "element vanished");
    }
}
