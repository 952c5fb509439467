//! # mixlane-state — Pitch Lifecycle State Machine
//!
//! One state machine, parameterized over [`WorkflowMode`], governs every
//! pitch in the system. There are no per-mode machine variants: legality
//! of a transition is a function of (mode, current status, action), looked
//! up in a single table, and actor authorization is a separate function of
//! (action, role). This keeps the four workflow modes from drifting apart
//! the way scattered per-mode branching does.
//!
//! ## Modules
//!
//! - **status** (`status.rs`): the 14 pitch statuses, terminal/contest
//!   classification, and the initial status per workflow mode.
//!
//! - **machine** (`machine.rs`): `PitchAction`, the transition table, and
//!   role authorization. Pure functions — no records are mutated here.
//!
//! - **pitch** (`pitch.rs`): the `Pitch` record, including pitch-level
//!   payment state for non-milestone pitches.
//!
//! - **project** (`project.rs`): the `Project` record (mode, budget,
//!   deadlines, the external client reference for managed-client work).
//!
//! ## Design
//!
//! The statuses are a runtime enum with validated transitions rather than
//! typestate types. Fourteen statuses across four modes, with legality
//! depending on runtime data (mode, actor role, payment state), would
//! require a combinatorial typestate surface with no proportional safety
//! benefit; the enum approach rejects invalid transitions with structured
//! errors that the caller can render.
//!
//! [`WorkflowMode`]: mixlane_core::WorkflowMode

pub mod machine;
pub mod pitch;
pub mod project;
pub mod status;

pub use machine::{authorize, transition_target, PitchAction, ReviewerKind, StateError};
pub use pitch::{Pitch, PitchPaymentStatus};
pub use project::{Project, ProjectError, RevisionPolicy};
pub use status::PitchStatus;
