//! Message shapes carried across the bridge.

use serde::{Deserialize, Serialize};

use pagepilot_core_types::{SessionId, TabId};

/// Downward signals, background to page agent. Delivery is
/// at-most-once: a signal describes the tab at send-time, so receivers
/// re-validate their own page classification before acting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BridgeSignal {
    PageReady {
        tab: TabId,
        url: String,
    },
    AutoStartRequested {
        tab: TabId,
        url: String,
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },
}

/// Upward notices, page agent to background.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum AgentNotice {
    SigninClicked { tab: TabId },
}

/// Loading state reported with a tab update.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Loading,
    Complete,
}

/// Tab lifecycle observation fed into the background relay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TabEvent {
    Created {
        tab: TabId,
    },
    Updated {
        tab: TabId,
        url: String,
        status: TabStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_wire_tags_are_kebab_case() {
        let signal = BridgeSignal::AutoStartRequested {
            tab: TabId(4),
            url: "https://auth.example.com/".into(),
            session_id: SessionId("session-x".into()),
        };
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["type"], "auto-start-requested");
        assert_eq!(json["sessionId"], "session-x");

        let notice = AgentNotice::SigninClicked { tab: TabId(1) };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["action"], "signin-clicked");
    }
}
