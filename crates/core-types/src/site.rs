//! Page-type classification by hostname and path.
//!
//! A relayed bridge signal describes the tab at send-time, so every
//! consumer re-classifies the URL it actually observes instead of
//! trusting the sender.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Coarse page classification used for controller reporting and for
/// gating which step action makes sense on the current page.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Main,
    Dashboard,
    Authenticator,
    #[default]
    Unknown,
}

impl PageType {
    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Main => "main",
            PageType::Dashboard => "dashboard",
            PageType::Authenticator => "authenticator",
            PageType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hostnames the automation targets. The main site and its
/// authenticator may live on different hosts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SiteHosts {
    pub root_host: String,
    pub auth_host: String,
}

impl SiteHosts {
    pub fn new(root_host: impl Into<String>, auth_host: impl Into<String>) -> Self {
        Self {
            root_host: root_host.into(),
            auth_host: auth_host.into(),
        }
    }

    /// Classify a URL. Unparseable URLs classify as `Unknown` rather
    /// than failing: the agent still reports them, it just cannot gate
    /// step actions on them.
    pub fn classify(&self, url: &str) -> PageType {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return PageType::Unknown,
        };
        let host = match parsed.host_str() {
            Some(host) => host,
            None => return PageType::Unknown,
        };

        if host.eq_ignore_ascii_case(&self.auth_host) {
            return PageType::Authenticator;
        }
        if host.eq_ignore_ascii_case(&self.root_host) {
            let path = parsed.path();
            if path == "/" || path.is_empty() {
                return PageType::Main;
            }
            if path == "/dashboard" || path.starts_with("/dashboard/") {
                return PageType::Dashboard;
            }
        }
        PageType::Unknown
    }

    /// Whether the URL belongs to either targeted host at all.
    pub fn is_tracked(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(|h| h.to_ascii_lowercase()))
            .map(|host| {
                host.eq_ignore_ascii_case(&self.root_host)
                    || host.eq_ignore_ascii_case(&self.auth_host)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> SiteHosts {
        SiteHosts::new("app.example.com", "auth.example.com")
    }

    #[test]
    fn classifies_main_and_dashboard() {
        let hosts = hosts();
        assert_eq!(hosts.classify("https://app.example.com/"), PageType::Main);
        assert_eq!(
            hosts.classify("https://app.example.com/dashboard"),
            PageType::Dashboard
        );
        assert_eq!(
            hosts.classify("https://app.example.com/dashboard/settings"),
            PageType::Dashboard
        );
    }

    #[test]
    fn classifies_authenticator_regardless_of_path() {
        assert_eq!(
            hosts().classify("https://auth.example.com/sign-up/password"),
            PageType::Authenticator
        );
    }

    #[test]
    fn foreign_hosts_and_garbage_are_unknown() {
        let hosts = hosts();
        assert_eq!(hosts.classify("https://other.example.com/"), PageType::Unknown);
        assert_eq!(hosts.classify("not a url"), PageType::Unknown);
        assert_eq!(
            hosts.classify("https://app.example.com/pricing"),
            PageType::Unknown
        );
    }

    #[test]
    fn tracked_hosts() {
        let hosts = hosts();
        assert!(hosts.is_tracked("https://auth.example.com/login"));
        assert!(!hosts.is_tracked("https://elsewhere.example.com/"));
    }
}
