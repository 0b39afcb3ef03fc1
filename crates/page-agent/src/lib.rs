//! The per-page automation agent.
//!
//! One instance lives exactly as long as one loaded page. On startup it
//! restores the persisted step ledger, then either executes guarded
//! step actions or hands control to the cooperative poll loop, which
//! reports page state to the controller and executes whatever command
//! comes back. Everything stops at one authoritative cancellation
//! point, checked at the top of every tick.

pub mod agent;
pub mod config;
pub mod errors;
pub mod steps;
pub mod watch;

pub use agent::{PageAgent, TickOutcome};
pub use config::AgentConfig;
pub use errors::{HaltReason, StepError};
