//! In-memory controller double for agent tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use pagepilot_core_types::{CommandReport, UserProfile};

use crate::errors::ControllerError;
use crate::model::{ControllerReply, NextCommandRequest, StateReport};
use crate::port::ControllerPort;

/// Replays a fixed queue of replies and records everything the agent
/// sends. When the queue runs dry it answers `Empty`.
#[derive(Default)]
pub struct ScriptedController {
    replies: Mutex<VecDeque<ControllerReply>>,
    profile: Mutex<Option<UserProfile>>,
    unreachable: AtomicBool,
    state_reports: Mutex<Vec<StateReport>>,
    result_reports: Mutex<Vec<CommandReport>>,
    raw_reports: Mutex<Vec<Value>>,
    command_requests: Mutex<Vec<NextCommandRequest>>,
}

impl ScriptedController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: ControllerReply) {
        self.replies.lock().push_back(reply);
    }

    pub fn set_profile(&self, profile: UserProfile) {
        *self.profile.lock() = Some(profile);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn state_reports(&self) -> Vec<StateReport> {
        self.state_reports.lock().clone()
    }

    pub fn result_reports(&self) -> Vec<CommandReport> {
        self.result_reports.lock().clone()
    }

    pub fn raw_reports(&self) -> Vec<Value> {
        self.raw_reports.lock().clone()
    }

    pub fn command_requests(&self) -> Vec<NextCommandRequest> {
        self.command_requests.lock().clone()
    }

    fn gate(&self) -> Result<(), ControllerError> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(ControllerError::Unreachable("scripted offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ControllerPort for ScriptedController {
    async fn check_status(&self) -> Result<(), ControllerError> {
        self.gate()
    }

    async fn generate_profile(&self) -> Result<UserProfile, ControllerError> {
        self.gate()?;
        self.profile
            .lock()
            .clone()
            .ok_or_else(|| ControllerError::Rejected { status: 500 })
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ControllerError> {
        self.gate()?;
        self.profile
            .lock()
            .clone()
            .ok_or_else(|| ControllerError::Rejected { status: 404 })
    }

    async fn report_state(&self, report: &StateReport) -> Result<(), ControllerError> {
        self.gate()?;
        self.state_reports.lock().push(report.clone());
        Ok(())
    }

    async fn next_command(
        &self,
        request: &NextCommandRequest,
    ) -> Result<ControllerReply, ControllerError> {
        self.gate()?;
        self.command_requests.lock().push(request.clone());
        Ok(self
            .replies
            .lock()
            .pop_front()
            .unwrap_or(ControllerReply::Empty))
    }

    async fn report_result(&self, report: &CommandReport) -> Result<(), ControllerError> {
        self.gate()?;
        self.result_reports.lock().push(report.clone());
        Ok(())
    }

    async fn report_raw_result(&self, body: Value) -> Result<(), ControllerError> {
        self.gate()?;
        self.raw_reports.lock().push(body);
        Ok(())
    }
}
