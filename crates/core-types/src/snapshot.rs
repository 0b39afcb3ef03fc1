//! Point-in-time structural description of the interactive page.
//!
//! Snapshots are ephemeral: recomputed on demand, compared by structural
//! equality against the last one reported so unchanged pages are not
//! re-sent, and never persisted.

use serde::{Deserialize, Serialize};

use crate::{PageType, SessionId};

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonEntry {
    pub index: usize,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub class_name: String,
    pub id: String,
    pub visible: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEntry {
    pub index: usize,
    pub text: String,
    pub href: String,
    pub class_name: String,
    pub id: String,
    pub visible: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEntry {
    pub index: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub placeholder: String,
    pub class_name: String,
    pub id: String,
    pub visible: bool,
}

/// Interactive elements grouped the way positional command lookups
/// resolve them: buttons, links, inputs, each indexed in DOM order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ElementInventory {
    pub buttons: Vec<ButtonEntry>,
    pub links: Vec<LinkEntry>,
    pub inputs: Vec<InputEntry>,
}

impl ElementInventory {
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty() && self.links.is_empty() && self.inputs.is_empty()
    }
}

/// Structural page description sent to the controller. Deliberately
/// carries no timestamp so that equality means "nothing observable
/// changed".
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub session_id: SessionId,
    pub url: String,
    pub hostname: String,
    pub pathname: String,
    pub page_type: PageType,
    #[serde(rename = "availableElements")]
    pub elements: ElementInventory,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(url: &str) -> PageSnapshot {
        PageSnapshot {
            session_id: SessionId("session-fixed".into()),
            url: url.into(),
            hostname: "app.example.com".into(),
            pathname: "/".into(),
            page_type: PageType::Main,
            elements: ElementInventory::default(),
        }
    }

    #[test]
    fn equal_snapshots_suppress_reporting() {
        assert_eq!(
            snapshot("https://app.example.com/"),
            snapshot("https://app.example.com/")
        );
        assert_ne!(
            snapshot("https://app.example.com/"),
            snapshot("https://app.example.com/dashboard")
        );
    }

    #[test]
    fn wire_shape_matches_controller_expectations() {
        let mut snap = snapshot("https://app.example.com/");
        snap.elements.buttons.push(ButtonEntry {
            index: 0,
            text: "Sign in".into(),
            kind: "button".into(),
            class_name: "btn".into(),
            id: String::new(),
            visible: true,
        });
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["pageType"], "main");
        assert_eq!(json["availableElements"]["buttons"][0]["type"], "button");
        assert_eq!(
            json["availableElements"]["buttons"][0]["className"],
            "btn"
        );
    }
}
