//! Monotonic step ledger.
//!
//! Owns the live record and the transition rules. Every successful
//! transition hits the store before the caller hears about it, so a
//! crash between action and persistence re-attempts the same step
//! instead of corrupting forward progress.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use pagepilot_core_types::{StepStage, UserProfile};

use crate::errors::StateError;
use crate::record::StepRecord;
use crate::store::StateStore;

/// Result of attempting a step transition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AdvanceOutcome {
    Advanced,
    /// The stage was already reached. Duplicate signals (two tab-update
    /// events for one navigation) land here instead of re-executing.
    AlreadyCompleted,
    /// The prerequisite stage has not been reached yet.
    OutOfOrder { required: StepStage },
}

pub struct StepLedger {
    store: Arc<dyn StateStore>,
    record: StepRecord,
}

impl StepLedger {
    /// Load persisted progress. A record older than the freshness
    /// window behaves exactly like no record at all: reset to `Init`,
    /// stale profile discarded, stale file cleared.
    pub async fn restore(store: Arc<dyn StateStore>, now: DateTime<Utc>) -> Result<Self, StateError> {
        let record = match store.load().await? {
            Some(record) if record.is_fresh(now) => {
                info!(
                    step = record.stage.step_number(),
                    email_generated = record.email_generated,
                    "restored persisted step state"
                );
                record
            }
            Some(stale) => {
                debug!(
                    saved_at = stale.saved_at_ms,
                    "persisted state too old, resetting"
                );
                store.clear().await?;
                StepRecord::fresh(now)
            }
            None => StepRecord::fresh(now),
        };
        Ok(Self { store, record })
    }

    pub fn record(&self) -> &StepRecord {
        &self.record
    }

    pub fn stage(&self) -> StepStage {
        self.record.stage
    }

    pub fn email_generated(&self) -> bool {
        self.record.email_generated
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.record.profile.as_ref()
    }

    /// A step action is offered only when the workflow sits exactly on
    /// its prerequisite stage.
    pub fn action_enabled(&self, target: StepStage) -> bool {
        target.prerequisite() == Some(self.record.stage)
    }

    /// Attempt the transition to `target`, persisting before returning
    /// `Advanced`.
    pub async fn advance(
        &mut self,
        target: StepStage,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, StateError> {
        if self.record.stage >= target {
            debug!(
                target = target.step_number(),
                current = self.record.stage.step_number(),
                "step already completed"
            );
            return Ok(AdvanceOutcome::AlreadyCompleted);
        }
        match target.prerequisite() {
            Some(required) if required == self.record.stage => {}
            Some(required) => return Ok(AdvanceOutcome::OutOfOrder { required }),
            None => return Ok(AdvanceOutcome::AlreadyCompleted),
        }

        let mut next = self.record.clone();
        next.stage = target;
        next.touch(now);
        self.store.save(&next).await?;
        self.record = next;
        info!(step = target.step_number(), "step state advanced");
        Ok(AdvanceOutcome::Advanced)
    }

    /// Record a freshly generated profile. The workflow stays at its
    /// current stage; this only marks identity availability.
    pub async fn mark_email_generated(
        &mut self,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Result<(), StateError> {
        let mut next = self.record.clone();
        next.email_generated = true;
        next.profile = Some(profile);
        next.touch(now);
        self.store.save(&next).await?;
        self.record = next;
        Ok(())
    }

    /// Attach a refetched profile to a restored record that knew an
    /// email existed but did not carry the payload.
    pub async fn set_profile(
        &mut self,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Result<(), StateError> {
        let mut next = self.record.clone();
        next.profile = Some(profile);
        next.touch(now);
        self.store.save(&next).await?;
        self.record = next;
        Ok(())
    }

    /// Explicit reset: clear persistence and start over at `Init`.
    pub async fn reset(&mut self, now: DateTime<Utc>) -> Result<(), StateError> {
        self.store.clear().await?;
        self.record = StepRecord::fresh(now);
        info!("step state reset");
        Ok(())
    }
}
