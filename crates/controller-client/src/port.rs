use async_trait::async_trait;
use serde_json::Value;

use pagepilot_core_types::{CommandReport, UserProfile};

use crate::errors::ControllerError;
use crate::model::{ControllerReply, NextCommandRequest, StateReport};

/// The controller as the agent sees it. Fronted by a trait so the poll
/// loop can run against a scripted double in tests.
#[async_trait]
pub trait ControllerPort: Send + Sync {
    /// Connectivity probe (`GET /status`).
    async fn check_status(&self) -> Result<(), ControllerError>;

    /// Generate a throwaway identity (`POST /generate-email`).
    async fn generate_profile(&self) -> Result<UserProfile, ControllerError>;

    /// Refetch the current identity (`GET /get-user-data`).
    async fn fetch_profile(&self) -> Result<UserProfile, ControllerError>;

    /// Report the observed page state (`POST /report-state`).
    async fn report_state(&self, report: &StateReport) -> Result<(), ControllerError>;

    /// Ask for the next command (`POST /get-next-command`).
    async fn next_command(
        &self,
        request: &NextCommandRequest,
    ) -> Result<ControllerReply, ControllerError>;

    /// Report a command outcome (`POST /report-result`).
    async fn report_result(&self, report: &CommandReport) -> Result<(), ControllerError>;

    /// Report an outcome for a payload that never decoded into a
    /// command (unknown tag); the raw body is echoed back.
    async fn report_raw_result(&self, body: Value) -> Result<(), ControllerError>;
}
