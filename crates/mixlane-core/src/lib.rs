//! # mixlane-core — Foundational Types for the Mixlane Engine
//!
//! This crate is the bedrock of the Mixlane workspace. It defines the
//! type-system primitives every other crate builds on. Every other crate in
//! the workspace depends on `mixlane-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `ProjectId`, `PitchId`,
//!    `SnapshotId`, `MilestoneId`, `EventId`, `FileId`, `UserId` — all
//!    newtypes over UUIDs. No bare strings or raw UUIDs for identifiers.
//!
//! 2. **Integer-cents money.** `Amount` stores cents as `u64`. Monetary
//!    values never pass through `f64` — float arithmetic has no place in a
//!    payment ledger.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision. Deadline presentation in user-local
//!    time is a concern for the host system, never for this core.
//!
//! 4. **Explicit actors.** Every state-changing operation takes an `Actor`
//!    parameter. The core never reaches into ambient session state.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mixlane-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod actor;
pub mod error;
pub mod identity;
pub mod money;
pub mod temporal;
pub mod workflow;

// Re-export primary types for ergonomic imports.
pub use actor::{Actor, ActorRole, ClientRef};
pub use error::CoreError;
pub use identity::{EventId, FileId, MilestoneId, PitchId, ProjectId, SnapshotId, UserId};
pub use money::Amount;
pub use temporal::Timestamp;
pub use workflow::WorkflowMode;
