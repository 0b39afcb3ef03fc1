//! Element location against an uncontrolled, drifting DOM.
//!
//! Real-world markup is heterogeneous and class names are unstable, so
//! a single selector is brittle. This crate resolves targets through a
//! ranked chain of strategies — attribute selectors first, text
//! containment as fallback — with a hard visibility gate: a match
//! without a rendered layout box is treated as not found, because
//! acting on it would be a false positive.

pub mod challenge;
pub mod errors;
pub mod heuristics;
pub mod resolver;
pub mod scan;
pub mod strategies;

pub use challenge::detect_challenge;
pub use errors::LocateError;
pub use heuristics::detect_signup_form;
pub use resolver::{locate, probe, Located, Probe};
pub use scan::scan_page;
pub use strategies::{RoleHint, Strategy};
