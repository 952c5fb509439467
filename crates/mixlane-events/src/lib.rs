//! # mixlane-events — Append-Only Audit Event Log
//!
//! Every state-changing action appends exactly one event; nothing is ever
//! updated or deleted. The log is the audit trail and the source for the
//! timeline both producer and client see.
//!
//! Event kinds are a closed tagged union with typed payloads. The host
//! system this engine grew out of used open string event types plus a
//! loose metadata bag; here an unknown event kind is unrepresentable, and
//! each payload carries exactly the fields its kind needs. A single
//! `Note` variant remains for free-text comments.
//!
//! ## Modules
//!
//! - **kind** (`kind.rs`): `EventKind` and `ContestPlacement`.
//! - **log** (`log.rs`): `EventRecord` and the append-only `EventLog`.

pub mod kind;
pub mod log;

pub use kind::{ContestPlacement, EventKind};
pub use log::{EventLog, EventRecord};
