//! Agent instance and the cooperative poll loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use command_executor::CommandExecutor;
use context_bridge::{AgentNotice, BridgeSignal};
use controller_client::{
    ControllerError, ControllerPort, ControllerReply, NextCommandRequest, StateReport,
};
use element_locator::{detect_challenge, scan_page};
use page_port::PagePort;
use pagepilot_core_types::{
    Command, CommandFailure, CommandKind, PageSnapshot, PageType, Session, StepStage, TabId,
    UserProfile,
};
use step_state::{StateStore, StepLedger, StepRecord};

use crate::config::AgentConfig;
use crate::errors::{HaltReason, StepError};

/// What one poll tick did. The loop exits on `Cancelled` and `Halted`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    Cancelled,
    Halted(HaltReason),
    Disconnected,
    Idle,
    Executed { success: bool, completed: bool },
}

pub struct PageAgent {
    session: Session,
    tab: TabId,
    config: AgentConfig,
    page: Arc<dyn PagePort>,
    controller: Arc<dyn ControllerPort>,
    ledger: tokio::sync::Mutex<StepLedger>,
    cancel: CancellationToken,
    connected: AtomicBool,
    polling: AtomicBool,
    processing: AtomicBool,
    halted: Mutex<Option<HaltReason>>,
    last_reported: Mutex<Option<PageSnapshot>>,
    current_step: Mutex<Option<String>>,
    notices: Mutex<Option<mpsc::UnboundedSender<AgentNotice>>>,
}

impl PageAgent {
    /// Restore persisted progress and build a fresh agent instance for
    /// the just-loaded page. Every instantiation mints a new session;
    /// continuity lives in the step record, not the session.
    pub async fn restore(
        page: Arc<dyn PagePort>,
        controller: Arc<dyn ControllerPort>,
        store: Arc<dyn StateStore>,
        tab: TabId,
        config: AgentConfig,
    ) -> Result<Arc<Self>, StepError> {
        let ledger = StepLedger::restore(store, Utc::now()).await?;
        Ok(Arc::new(Self {
            session: Session::start(),
            tab,
            config,
            page,
            controller,
            ledger: tokio::sync::Mutex::new(ledger),
            cancel: CancellationToken::new(),
            connected: AtomicBool::new(false),
            polling: AtomicBool::new(false),
            processing: AtomicBool::new(false),
            halted: Mutex::new(None),
            last_reported: Mutex::new(None),
            current_step: Mutex::new(None),
            notices: Mutex::new(None),
        }))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub(crate) fn page(&self) -> &dyn PagePort {
        self.page.as_ref()
    }

    pub(crate) fn pacing(&self) -> &interaction_primitives::Pacing {
        &self.config.pacing
    }

    /// Wire the upward notice channel toward the background relay.
    pub fn set_notices(&self, sender: mpsc::UnboundedSender<AgentNotice>) {
        *self.notices.lock() = Some(sender);
    }

    pub(crate) fn notify(&self, notice: AgentNotice) {
        if let Some(sender) = self.notices.lock().as_ref() {
            if sender.send(notice).is_err() {
                debug!("background context gone; notice dropped");
            }
        }
    }

    pub async fn stage(&self) -> StepStage {
        self.ledger.lock().await.stage()
    }

    pub async fn record(&self) -> StepRecord {
        self.ledger.lock().await.record().clone()
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halted.lock().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Single authoritative stop: set the reason, cancel the token.
    /// In-flight work finishes but triggers no further transitions.
    pub fn halt(&self, reason: HaltReason) {
        let mut halted = self.halted.lock();
        if halted.is_none() {
            info!(%reason, "agent halted");
            *halted = Some(reason);
        }
        drop(halted);
        self.cancel.cancel();
    }

    pub fn stop(&self) {
        self.halt(HaltReason::Stopped);
    }

    /// Explicit reset of persisted progress. The halted flag clears,
    /// but a fresh agent instance is expected to pick up from here —
    /// a cancelled poll loop stays cancelled.
    pub async fn reset(&self) -> Result<(), StepError> {
        self.ledger.lock().await.reset(Utc::now()).await?;
        *self.halted.lock() = None;
        *self.last_reported.lock() = None;
        Ok(())
    }

    /// Connectivity probe; flips the connected flag both ways.
    pub async fn check_connectivity(&self) -> bool {
        let ok = self.controller.check_status().await.is_ok();
        self.connected.store(ok, Ordering::SeqCst);
        if !ok {
            debug!("controller unreachable");
        }
        ok
    }

    /// Whether the guarded action for `target` is currently offered.
    pub async fn step_enabled(&self, target: StepStage) -> bool {
        if self.halt_reason().is_some() || !self.is_connected() {
            return false;
        }
        self.ledger.lock().await.action_enabled(target)
    }

    /// Generate a throwaway identity via the controller and persist it.
    pub async fn generate_identity(&self) -> Result<UserProfile, StepError> {
        if !self.is_connected() {
            return Err(StepError::Disconnected);
        }
        let profile = self.controller.generate_profile().await?;
        self.ledger
            .lock()
            .await
            .mark_email_generated(profile.clone(), Utc::now())
            .await?;
        Ok(profile)
    }

    /// The stored profile, refetched from the controller when a
    /// restored record knew an identity existed but lost the payload.
    pub async fn profile(&self) -> Result<UserProfile, StepError> {
        {
            let ledger = self.ledger.lock().await;
            if let Some(profile) = ledger.profile() {
                return Ok(profile.clone());
            }
            if !ledger.email_generated() {
                return Err(StepError::MissingProfile);
            }
        }
        let profile = self.controller.fetch_profile().await?;
        self.ledger
            .lock()
            .await
            .set_profile(profile.clone(), Utc::now())
            .await?;
        Ok(profile)
    }

    pub(crate) async fn ledger(&self) -> tokio::sync::MutexGuard<'_, StepLedger> {
        self.ledger.lock().await
    }

    /// React to a relayed bridge signal. Signals describe the tab at
    /// send-time, so the page type is re-validated here before acting.
    pub async fn handle_signal(self: &Arc<Self>, signal: BridgeSignal) {
        match signal {
            BridgeSignal::PageReady { .. } => {
                let _ = self.check_connectivity().await;
            }
            BridgeSignal::AutoStartRequested { session_id, .. } => {
                let url = match self.page.current_url().await {
                    Ok(url) => url,
                    Err(err) => {
                        warn!(error = %err, "cannot read url for auto-start validation");
                        return;
                    }
                };
                if self.config.hosts.classify(&url) != PageType::Authenticator {
                    debug!(%url, "auto-start refused: page is not the authenticator");
                    return;
                }
                info!(relayed_session = %session_id, "auto-start accepted");
                self.ensure_polling();
            }
        }
    }

    /// Start the poll loop once; later calls are no-ops.
    pub fn ensure_polling(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.polling.swap(true, Ordering::SeqCst) {
            return None;
        }
        let agent = Arc::clone(self);
        Some(tokio::spawn(async move { agent.run().await }))
    }

    /// The cooperative loop: strictly sequential ticks, cancellation
    /// checked at the top of every tick so stale ticks no-op.
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = interval.tick() => {
                    match self.poll_tick().await {
                        TickOutcome::Cancelled | TickOutcome::Halted(_) => break,
                        outcome => debug!(?outcome, "tick finished"),
                    }
                }
            }
        }
        debug!("poll loop ended");
    }

    /// One tick: snapshot/report, fetch, execute, report, re-report.
    /// Never issues a second command while a first is in flight — the
    /// whole tick is awaited end to end.
    pub async fn poll_tick(&self) -> TickOutcome {
        if self.cancel.is_cancelled() {
            if let Some(reason) = self.halt_reason() {
                return TickOutcome::Halted(reason);
            }
            return TickOutcome::Cancelled;
        }
        if let Some(reason) = self.halt_reason() {
            return TickOutcome::Halted(reason);
        }

        if !self.is_connected() && !self.check_connectivity().await {
            return TickOutcome::Disconnected;
        }

        match detect_challenge(self.page.as_ref()).await {
            Ok(Some(indicator)) => {
                let reason = HaltReason::ChallengeDetected { indicator };
                self.halt(reason.clone());
                return TickOutcome::Halted(reason);
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "challenge scan failed"),
        }

        if let Err(err) = self.report_state_if_changed().await {
            return self.on_controller_error(err);
        }

        let request = match self.next_command_request().await {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "cannot build command request");
                return TickOutcome::Idle;
            }
        };
        let reply = match self.controller.next_command(&request).await {
            Ok(reply) => reply,
            Err(err) => return self.on_controller_error(err),
        };

        match reply {
            ControllerReply::Command(command) => self.execute_and_report(command).await,
            ControllerReply::WaitForNext { .. } | ControllerReply::Empty => TickOutcome::Idle,
            ControllerReply::Unrecognized { tag, raw } => {
                self.report_unknown_command(tag, raw, &request.url).await;
                TickOutcome::Executed {
                    success: false,
                    completed: false,
                }
            }
        }
    }

    async fn execute_and_report(&self, command: Command) -> TickOutcome {
        *self.current_step.lock() = Some(command.kind.name().to_string());
        self.processing.store(true, Ordering::SeqCst);

        let executor = CommandExecutor::new(
            self.page.as_ref(),
            self.session.id.clone(),
            self.config.pacing.clone(),
        );
        let report = executor.execute(&command).await;

        self.processing.store(false, Ordering::SeqCst);

        let success = report.success;
        if let Err(err) = self.controller.report_result(&report).await {
            warn!(error = %err, "result report failed");
            if matches!(err, ControllerError::Unreachable(_)) {
                self.connected.store(false, Ordering::SeqCst);
            }
        }

        let completed = success && matches!(command.kind, CommandKind::Complete { .. });
        if completed {
            self.halt(HaltReason::Completed);
        }

        // Post-execution snapshot so the controller sees what changed.
        if let Err(err) = self.report_state_if_changed().await {
            debug!(error = %err, "post-execution state report failed");
        }

        TickOutcome::Executed { success, completed }
    }

    async fn report_unknown_command(&self, tag: String, raw: serde_json::Value, url: &str) {
        let failure = CommandFailure::UnknownCommandType(tag.clone());
        warn!(%failure, "controller sent a command outside the vocabulary");
        let body = serde_json::json!({
            "sessionId": self.session.id,
            "commandId": tag,
            "command": raw,
            "success": false,
            "error": failure.to_string(),
            "timestamp": Utc::now().timestamp_millis(),
            "url": url,
        });
        if let Err(err) = self.controller.report_raw_result(body).await {
            warn!(error = %err, "unknown-command report failed");
        }
    }

    async fn next_command_request(&self) -> Result<NextCommandRequest, page_port::PageError> {
        let url = self.page.current_url().await?;
        Ok(NextCommandRequest {
            session_id: self.session.id.clone(),
            page_type: self.config.hosts.classify(&url),
            url,
            current_step: self.current_step.lock().clone(),
        })
    }

    /// Send the snapshot only when it differs structurally from the
    /// last one the controller saw.
    pub async fn report_state_if_changed(&self) -> Result<(), ControllerError> {
        let snapshot = scan_page(self.page.as_ref(), &self.session.id, &self.config.hosts)
            .await
            .map_err(|err| ControllerError::Malformed(err.to_string()))?;

        if self.last_reported.lock().as_ref() == Some(&snapshot) {
            return Ok(());
        }

        let report = StateReport::new(
            snapshot.clone(),
            self.processing.load(Ordering::SeqCst),
            self.current_step.lock().clone(),
        );
        self.controller.report_state(&report).await?;
        *self.last_reported.lock() = Some(snapshot);
        Ok(())
    }

    fn on_controller_error(&self, err: ControllerError) -> TickOutcome {
        match err {
            ControllerError::Unreachable(_) => {
                self.connected.store(false, Ordering::SeqCst);
                TickOutcome::Disconnected
            }
            other => {
                warn!(error = %other, "controller error; tick skipped");
                TickOutcome::Idle
            }
        }
    }
}
