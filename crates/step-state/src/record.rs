//! The persisted record itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pagepilot_core_types::{StepStage, UserProfile};

/// Records older than this are treated as absent on load.
pub const FRESHNESS_WINDOW_MS: i64 = 3_600_000;

/// Durable workflow progress, written wholesale after every successful
/// transition. Wire keys match the record layout the controller side
/// already understands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    #[serde(rename = "stepNumber")]
    pub stage: StepStage,
    pub email_generated: bool,
    #[serde(rename = "userProfile", default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(rename = "savedAt")]
    pub saved_at_ms: i64,
}

impl StepRecord {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            stage: StepStage::Init,
            email_generated: false,
            profile: None,
            saved_at_ms: now.timestamp_millis(),
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() - self.saved_at_ms < FRESHNESS_WINDOW_MS
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.saved_at_ms = now.timestamp_millis();
    }
}
