use std::time::Duration;

use interaction_primitives::Pacing;
use pagepilot_core_types::SiteHosts;

/// Tuning knobs for one agent instance.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub hosts: SiteHosts,
    /// Poll loop cadence.
    pub poll_interval: Duration,
    /// Bound on the post-click page transition watch.
    pub transition_window: Duration,
    pub transition_poll: Duration,
    /// Bound on waiting for the password phase of the signup form.
    pub password_window: Duration,
    pub password_poll: Duration,
    pub pacing: Pacing,
}

impl AgentConfig {
    pub fn new(hosts: SiteHosts) -> Self {
        Self {
            hosts,
            poll_interval: Duration::from_secs(2),
            transition_window: Duration::from_secs(15),
            transition_poll: Duration::from_secs(1),
            password_window: Duration::from_secs(15),
            password_poll: Duration::from_millis(500),
            pacing: Pacing::human(),
        }
    }

    /// Test profile: same structure, no real-time delays.
    pub fn immediate(hosts: SiteHosts) -> Self {
        Self {
            hosts,
            poll_interval: Duration::from_millis(10),
            transition_window: Duration::from_millis(50),
            transition_poll: Duration::from_millis(5),
            password_window: Duration::from_millis(50),
            password_poll: Duration::from_millis(5),
            pacing: Pacing::none(),
        }
    }
}
