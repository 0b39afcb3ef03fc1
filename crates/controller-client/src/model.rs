//! Wire payloads for the controller protocol.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pagepilot_core_types::{Command, PageSnapshot, PageType, SessionId};

/// Body of `POST /get-next-command`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextCommandRequest {
    pub session_id: SessionId,
    pub url: String,
    pub page_type: PageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
}

/// Body of `POST /report-state`: the structural snapshot plus the
/// volatile fields the controller logs but the agent does not compare.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReport {
    #[serde(flatten)]
    pub snapshot: PageSnapshot,
    pub timestamp: i64,
    pub is_processing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
}

impl StateReport {
    pub fn new(snapshot: PageSnapshot, is_processing: bool, current_step: Option<String>) -> Self {
        Self {
            snapshot,
            timestamp: Utc::now().timestamp_millis(),
            is_processing,
            current_step,
        }
    }
}

/// What `POST /get-next-command` produced.
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerReply {
    /// A concrete command to execute.
    Command(Command),
    /// The controller has nothing for us yet; the tick ends.
    WaitForNext { message: Option<String> },
    /// Empty or null body; treated like wait-for-next.
    Empty,
    /// The payload carried a tag outside the closed vocabulary. Kept
    /// verbatim so the failure report can echo the original command.
    Unrecognized { tag: String, raw: Value },
}

/// Decode the reply body. Unknown tags are data, not faults: they are
/// reported back as `UnknownCommandType` by the caller instead of
/// being dropped.
pub fn decode_reply(value: Option<Value>) -> ControllerReply {
    let value = match value {
        None | Some(Value::Null) => return ControllerReply::Empty,
        Some(value) => value,
    };
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if tag == "wait_for_next" {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        return ControllerReply::WaitForNext { message };
    }
    match serde_json::from_value::<Command>(value.clone()) {
        Ok(command) => ControllerReply::Command(command),
        Err(_) => ControllerReply::Unrecognized { tag, raw: value },
    }
}
