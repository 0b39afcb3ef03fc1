//! Cross-context signaling.
//!
//! The background context outlives every page; each page agent dies on
//! navigation. The bridge relays tab lifecycle observations downward
//! and agent notices upward, with at-most-once, may-be-dropped delivery:
//! a signal sent while no page agent is alive is logged and forgotten,
//! and the receiving side can always rebuild from persisted step state.

pub mod relay;
pub mod signals;

pub use relay::{BackgroundRelay, RunView};
pub use signals::{AgentNotice, BridgeSignal, TabEvent, TabStatus};
