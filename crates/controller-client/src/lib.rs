//! HTTP surface to the remote controller.
//!
//! The agent only ever *executes* what it is given; this crate carries
//! the conversation: connectivity probe, profile generation/fetch,
//! state reporting, command polling and result reporting. Every
//! transport failure maps to [`ControllerError::Unreachable`] so the
//! agent can drop into disconnected mode without losing persisted
//! progress.

pub mod client;
pub mod errors;
pub mod model;
pub mod port;
pub mod scripted;

pub use client::HttpController;
pub use errors::ControllerError;
pub use model::{decode_reply, ControllerReply, NextCommandRequest, StateReport};
pub use port::ControllerPort;
pub use scripted::ScriptedController;
