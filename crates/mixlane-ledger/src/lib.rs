//! # mixlane-ledger — Milestone Ledger & Payment Gate
//!
//! The ordered list of payable checkpoints for a pitch, and the gate that
//! keeps payments honest:
//!
//! - milestones are payable strictly in ascending `sort_order`;
//! - at most one milestone is PROCESSING per pitch at any time;
//! - `begin` is idempotent while PROCESSING, `confirm` is idempotent once
//!   PAID, and `fail` returns the milestone to payable rather than dead-ending;
//! - zero-amount milestones bypass the gate entirely via `approve`.
//!
//! Gateway confirmation arrives asynchronously (webhook-style); the
//! engine routes it into [`MilestoneLedger::confirm_payment`] /
//! [`MilestoneLedger::fail_payment`], which are safe to call repeatedly.
//!
//! ## Modules
//!
//! - **milestone** (`milestone.rs`): the `Milestone` record and its
//!   status vocabulary.
//! - **gate** (`gate.rs`): `MilestoneLedger` — the per-pitch container
//!   owning every mutation and both gate invariants.

pub mod gate;
pub mod milestone;

pub use gate::{LedgerError, MilestoneLedger, PaymentAttempt, PaymentHandle};
pub use milestone::{Milestone, MilestonePaymentStatus, MilestoneStatus};
