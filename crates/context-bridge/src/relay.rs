//! Background relay: classifies tab events and arms auto-start.
//!
//! One auto-start signal per logical run. The run record is keyed by a
//! session id minted when a fresh sign-in click is noticed — not by an
//! ambient boolean — so concurrent tabs cannot leak start signals into
//! each other's runs, and the latch resets exactly when a new sign-in
//! click begins a new run.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info};

use pagepilot_core_types::{PageType, SessionId, SiteHosts, TabId};

use crate::signals::{AgentNotice, BridgeSignal, TabEvent, TabStatus};

/// How long after a sign-in click a newly created tab is considered
/// part of that run.
const NEW_TAB_WINDOW: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
struct RunRecord {
    origin_tab: TabId,
    auth_tab: Option<TabId>,
    auto_start_sent: bool,
    started_at: Instant,
}

/// Read-only view of a run record, for diagnostics and tests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunView {
    pub origin_tab: TabId,
    pub auth_tab: Option<TabId>,
    pub auto_start_sent: bool,
}

pub struct BackgroundRelay {
    hosts: SiteHosts,
    signals: broadcast::Sender<BridgeSignal>,
    runs: DashMap<SessionId, RunRecord>,
    current_run: Mutex<Option<SessionId>>,
}

impl BackgroundRelay {
    pub fn new(hosts: SiteHosts) -> Arc<Self> {
        let (signals, _) = broadcast::channel(16);
        Arc::new(Self {
            hosts,
            signals,
            runs: DashMap::new(),
            current_run: Mutex::new(None),
        })
    }

    /// Subscribe a page agent to downward signals.
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeSignal> {
        self.signals.subscribe()
    }

    /// Handle an upward notice from a page agent.
    pub fn notice(&self, notice: AgentNotice) {
        match notice {
            AgentNotice::SigninClicked { tab } => {
                let session_id = SessionId::new();
                info!(%session_id, origin = %tab, "sign-in clicked, new run armed");
                self.runs.insert(
                    session_id.clone(),
                    RunRecord {
                        origin_tab: tab,
                        auth_tab: None,
                        auto_start_sent: false,
                        started_at: Instant::now(),
                    },
                );
                *self.current_run.lock() = Some(session_id);
            }
        }
    }

    /// Feed one tab lifecycle observation through classification.
    pub fn observe(&self, event: TabEvent) {
        match event {
            TabEvent::Created { tab } => self.on_tab_created(tab),
            TabEvent::Updated { tab, url, status } => {
                if status == TabStatus::Complete {
                    self.on_load_complete(tab, &url);
                }
            }
        }
    }

    pub fn run_view(&self, session_id: &SessionId) -> Option<RunView> {
        self.runs.get(session_id).map(|record| RunView {
            origin_tab: record.origin_tab,
            auth_tab: record.auth_tab,
            auto_start_sent: record.auto_start_sent,
        })
    }

    fn on_tab_created(&self, tab: TabId) {
        let current = self.current_run.lock().clone();
        let Some(session_id) = current else {
            return;
        };
        if let Some(mut record) = self.runs.get_mut(&session_id) {
            if record.auth_tab.is_none() && record.started_at.elapsed() <= NEW_TAB_WINDOW {
                debug!(%session_id, tab = %tab, "auth tab attached to run");
                record.auth_tab = Some(tab);
            } else if record.started_at.elapsed() > NEW_TAB_WINDOW {
                debug!(%session_id, tab = %tab, "new tab outside the run window, ignored");
            }
        }
    }

    fn on_load_complete(&self, tab: TabId, url: &str) {
        if !self.hosts.is_tracked(url) {
            return;
        }

        // Readiness is broadcast for every tracked load; a not-yet-ready
        // or already-dead page agent simply misses it.
        self.send(BridgeSignal::PageReady {
            tab,
            url: url.to_string(),
        });

        if self.hosts.classify(url) != PageType::Authenticator {
            return;
        }
        let current = self.current_run.lock().clone();
        let Some(session_id) = current else {
            return;
        };
        let Some(mut record) = self.runs.get_mut(&session_id) else {
            return;
        };
        let is_runs_tab = record.auth_tab == Some(tab) || record.origin_tab == tab;
        if !is_runs_tab {
            return;
        }
        if record.auto_start_sent {
            debug!(%session_id, "auto-start already sent for this run, duplicate suppressed");
            return;
        }
        record.auto_start_sent = true;
        info!(%session_id, tab = %tab, "auto-start requested");
        self.send(BridgeSignal::AutoStartRequested {
            tab,
            url: url.to_string(),
            session_id,
        });
    }

    /// At-most-once delivery: no receiver means the signal is dropped,
    /// logged, and never retried. Recovery is the next page load.
    fn send(&self, signal: BridgeSignal) {
        if self.signals.send(signal).is_err() {
            debug!("no live page agent; bridge signal dropped");
        }
    }
}
