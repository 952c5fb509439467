//! # mixlane-engine — Pitch Lifecycle Orchestration
//!
//! The top of the Mixlane workspace DAG. `Engine` is what the host
//! system calls: it wires the state machine, snapshot store, milestone
//! ledger, event log, and contest resolver together behind a per-pitch
//! mutual-exclusion boundary, and talks to the host through three
//! narrow collaborator traits (file storage, notifications, the
//! payment gateway).
//!
//! ## Modules
//!
//! - **engine** (`engine.rs`): the `Engine` itself — every produced
//!   operation, from `create_pitch` through `select_contest_winners`.
//! - **store** (`store.rs`): the in-memory record store; one `Mutex`
//!   per pitch aggregate, locked for the duration of each operation.
//! - **contest** (`contest.rs`): pure judging logic and the recorded
//!   `ContestResolution`.
//! - **collab** (`collab.rs`): the `FileStore`, `NotificationSink`,
//!   and `PaymentGateway` seams.
//! - **config** (`config.rs`): engine limits.
//! - **error** (`error.rs`): the unified `EngineError` taxonomy.
//!
//! ## Design
//!
//! Operations are request-scoped and synchronous. The only
//! asynchronous seam is payment settlement: `begin_milestone_payment`
//! leaves the milestone PROCESSING, and the gateway's webhook later
//! lands in `confirm_milestone_payment` or `fail_milestone_payment`,
//! both idempotent. Notification failures are logged and never roll
//! back a transition.

pub mod collab;
pub mod config;
pub mod contest;
pub mod engine;
pub mod error;
pub mod store;

pub use collab::{
    FileStore, FileStoreError, GatewayError, NotificationSink, NotifyError, PaymentGateway,
    Recipient,
};
pub use config::EngineConfig;
pub use contest::ContestResolution;
pub use engine::{ChargeOutcome, Engine};
pub use error::EngineError;
