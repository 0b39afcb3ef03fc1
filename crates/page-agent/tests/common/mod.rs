//! Shared harness: fake page + scripted controller + in-memory store.

use std::sync::Arc;

use chrono::Utc;

use controller_client::ScriptedController;
use page_agent::{AgentConfig, PageAgent};
use page_port::fake::FakePage;
use pagepilot_core_types::{SiteHosts, StepStage, TabId, UserProfile};
use step_state::{MemoryStore, StepRecord};

pub struct Harness {
    pub page: Arc<FakePage>,
    pub controller: Arc<ScriptedController>,
    pub store: Arc<MemoryStore>,
    pub agent: Arc<PageAgent>,
}

pub fn hosts() -> SiteHosts {
    SiteHosts::new("app.example.com", "auth.example.com")
}

pub fn profile() -> UserProfile {
    UserProfile {
        first_name: "Ada".into(),
        last_name: "Byron".into(),
        email: "ada@tmp.example.com".into(),
        password: Some("s3cret-pw".into()),
    }
}

pub fn record_at(stage: StepStage) -> StepRecord {
    let mut record = StepRecord::fresh(Utc::now());
    record.stage = stage;
    record.email_generated = true;
    record.profile = Some(profile());
    record
}

pub async fn harness(url: &str, record: Option<StepRecord>) -> Harness {
    let page = Arc::new(FakePage::new(url));
    let controller = Arc::new(ScriptedController::new());
    let store = Arc::new(match record {
        Some(record) => MemoryStore::with_record(record),
        None => MemoryStore::new(),
    });
    let agent = PageAgent::restore(
        page.clone(),
        controller.clone(),
        store.clone(),
        TabId(1),
        AgentConfig::immediate(hosts()),
    )
    .await
    .expect("agent restore");
    Harness {
        page,
        controller,
        store,
        agent,
    }
}

/// Connectivity is a precondition for most flows; probe it eagerly.
pub async fn connected_harness(url: &str, record: Option<StepRecord>) -> Harness {
    let h = harness(url, record).await;
    assert!(h.agent.check_connectivity().await);
    h
}
