//! Durable record of workflow progress.
//!
//! The per-page agent is destroyed and recreated on every navigation;
//! this crate is what survives. A single wholesale-written record keeps
//! the current step, whether an email identity was generated, and the
//! generated profile. The ledger on top enforces the two hard rules:
//! the step number only ever advances, and a transition is persisted
//! before anyone is told about it.

pub mod errors;
pub mod ledger;
pub mod record;
pub mod store;

pub use errors::StateError;
pub use ledger::{AdvanceOutcome, StepLedger};
pub use record::{StepRecord, FRESHNESS_WINDOW_MS};
pub use store::{FileStore, MemoryStore, StateStore};
