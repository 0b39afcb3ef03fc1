//! Layered configuration: defaults, optional file, environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use page_agent::AgentConfig;
use pagepilot_core_types::SiteHosts;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    /// Base URL of the controller service.
    pub controller_url: String,
    /// Host carrying the main site and dashboard.
    pub root_host: String,
    /// Host carrying the authenticator.
    pub auth_host: String,
    /// Where a `run` starts when no URL is given on the command line.
    pub start_url: String,
    /// Persisted step-state location.
    pub state_path: PathBuf,
    pub poll_interval_ms: u64,
    pub headless: bool,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            controller_url: "http://localhost:8080".to_string(),
            root_host: "app.example.com".to_string(),
            auth_host: "auth.example.com".to_string(),
            start_url: "https://app.example.com/".to_string(),
            state_path: default_state_path(),
            poll_interval_ms: 2000,
            headless: false,
        }
    }
}

fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pagepilot")
        .join("state.json")
}

impl PilotConfig {
    /// Defaults, overlaid by an optional config file, overlaid by
    /// `PAGEPILOT_*` environment variables.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let defaults =
            config::Config::try_from(&PilotConfig::default()).context("serialize defaults")?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file.to_path_buf()));
        }
        builder = builder.add_source(config::Environment::with_prefix("PAGEPILOT"));
        builder
            .build()
            .context("assemble configuration")?
            .try_deserialize()
            .context("deserialize configuration")
    }

    pub fn hosts(&self) -> SiteHosts {
        SiteHosts::new(self.root_host.clone(), self.auth_host.clone())
    }

    pub fn agent_config(&self) -> AgentConfig {
        let mut agent = AgentConfig::new(self.hosts());
        agent.poll_interval = Duration::from_millis(self.poll_interval_ms.max(100));
        agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_file() {
        let config = PilotConfig::load(None).unwrap();
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.hosts().root_host, "app.example.com");
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pagepilot.toml");
        std::fs::write(
            &path,
            "controller_url = \"http://10.0.0.2:9090\"\npoll_interval_ms = 500\n",
        )
        .unwrap();

        let config = PilotConfig::load(Some(&path)).unwrap();
        assert_eq!(config.controller_url, "http://10.0.0.2:9090");
        assert_eq!(
            config.agent_config().poll_interval,
            Duration::from_millis(500)
        );
        // Untouched keys keep their defaults.
        assert_eq!(config.auth_host, "auth.example.com");
    }
}
