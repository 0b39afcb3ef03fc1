//! Runtime wiring: browser, background relay, agent lifecycle.
//!
//! The background pieces (relay, navigation watcher) live for the whole
//! run; a fresh [`PageAgent`] is minted for every completed navigation,
//! restoring its step ledger each time. That asymmetry of lifetimes is
//! the whole point: signals may be lost across the gap, persisted step
//! state may not.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use context_bridge::{BackgroundRelay, TabEvent, TabStatus};
use controller_client::{ControllerPort, HttpController};
use page_agent::{HaltReason, PageAgent};
use page_port::cdp::CdpBrowser;
use page_port::PagePort;
use pagepilot_core_types::TabId;
use step_state::{FileStore, StateStore};

use crate::config::PilotConfig;

/// How often the background watcher samples the tab's URL.
const NAV_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);
/// How often the lifecycle loop checks the agent's halt flag.
const HALT_SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

pub struct RunOptions {
    pub start_url: Option<String>,
    pub headless: bool,
    pub attach: Option<String>,
}

pub async fn run_agent(config: PilotConfig, options: RunOptions) -> Result<()> {
    let controller: Arc<dyn ControllerPort> = Arc::new(
        HttpController::new(&config.controller_url).context("controller client")?,
    );
    let store: Arc<dyn StateStore> = Arc::new(FileStore::new(&config.state_path));

    let browser = match &options.attach {
        Some(endpoint) => {
            info!(endpoint, "attaching to running browser");
            CdpBrowser::connect(endpoint).await?
        }
        None => {
            info!(headless = options.headless, "launching browser");
            CdpBrowser::launch(options.headless).await?
        }
    };

    let start_url = options
        .start_url
        .unwrap_or_else(|| config.start_url.clone());
    info!(url = %start_url, "opening start page");
    let page = Arc::new(browser.open(&start_url).await?);
    let tab = TabId(1);

    let relay = BackgroundRelay::new(config.hosts());

    // Upward notices from agents feed the relay.
    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    {
        let relay = Arc::clone(&relay);
        tokio::spawn(async move {
            while let Some(notice) = notice_rx.recv().await {
                relay.notice(notice);
            }
        });
    }

    // Background navigation watcher: samples the tab URL and turns
    // changes into tab lifecycle events plus a recycle signal for the
    // lifecycle loop below.
    let (nav_tx, mut nav_rx) = mpsc::unbounded_channel();
    {
        let page = Arc::clone(&page);
        let relay = Arc::clone(&relay);
        let mut last = start_url.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(NAV_SAMPLE_INTERVAL).await;
                let url = match page.current_url().await {
                    Ok(url) => url,
                    Err(err) => {
                        debug!(error = %err, "url sample failed; watcher stopping");
                        break;
                    }
                };
                if url != last {
                    last = url.clone();
                    relay.observe(TabEvent::Updated {
                        tab,
                        url: url.clone(),
                        status: TabStatus::Complete,
                    });
                    if nav_tx.send(url).is_err() {
                        break;
                    }
                }
            }
        });
    }

    let final_reason = loop {
        // One agent instance per loaded page.
        let agent = PageAgent::restore(
            Arc::clone(&page) as Arc<dyn page_port::PagePort>,
            Arc::clone(&controller),
            Arc::clone(&store),
            tab,
            config.agent_config(),
        )
        .await?;
        agent.set_notices(notice_tx.clone());

        if !agent.check_connectivity().await {
            warn!("controller not reachable yet; agent starts disconnected");
        }

        // Relay signals to this instance for as long as it lives.
        let mut signals = relay.subscribe();
        let signal_agent = Arc::clone(&agent);
        let signal_task = tokio::spawn(async move {
            while let Ok(signal) = signals.recv().await {
                signal_agent.handle_signal(signal).await;
            }
        });

        agent.ensure_polling();
        info!(session = %agent.session().id, "agent instance started");

        let ended = wait_for_instance_end(&agent, &mut nav_rx).await;
        agent.stop();
        signal_task.abort();

        match ended {
            InstanceEnd::Navigated(url) => {
                info!(%url, "navigation observed; recycling agent instance");
                continue;
            }
            InstanceEnd::Halted(reason) => break reason,
            InstanceEnd::Interrupted => break HaltReason::Stopped,
        }
    };

    match &final_reason {
        HaltReason::Completed => info!("workflow complete"),
        reason => warn!(%reason, "run ended"),
    }

    browser.shutdown().await;
    Ok(())
}

enum InstanceEnd {
    Navigated(String),
    Halted(HaltReason),
    Interrupted,
}

async fn wait_for_instance_end(
    agent: &Arc<PageAgent>,
    nav_rx: &mut mpsc::UnboundedReceiver<String>,
) -> InstanceEnd {
    loop {
        tokio::select! {
            navigated = nav_rx.recv() => {
                return match navigated {
                    Some(url) => InstanceEnd::Navigated(url),
                    None => InstanceEnd::Interrupted,
                };
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received");
                return InstanceEnd::Interrupted;
            }
            _ = tokio::time::sleep(HALT_SAMPLE_INTERVAL) => {
                if let Some(reason) = agent.halt_reason() {
                    return InstanceEnd::Halted(reason);
                }
            }
        }
    }
}

pub async fn show_status(config: &PilotConfig) -> Result<()> {
    let controller = HttpController::new(&config.controller_url)?;
    match controller.check_status().await {
        Ok(()) => println!("controller: reachable at {}", config.controller_url),
        Err(err) => println!("controller: unreachable ({err})"),
    }

    let store = FileStore::new(&config.state_path);
    match store.load().await? {
        Some(record) => {
            let saved = Utc
                .timestamp_millis_opt(record.saved_at_ms)
                .single()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| record.saved_at_ms.to_string());
            println!("step:            {}", record.stage.describe());
            println!("email generated: {}", record.email_generated);
            if let Some(profile) = &record.profile {
                println!("profile:         {} <{}>", profile.display_name(), profile.email);
            }
            println!("saved at:        {saved}");
        }
        None => println!("no persisted step state at {}", config.state_path.display()),
    }
    Ok(())
}

pub async fn reset_state(config: &PilotConfig) -> Result<()> {
    let store = FileStore::new(&config.state_path);
    store.clear().await?;
    println!("cleared {}", config.state_path.display());
    Ok(())
}
