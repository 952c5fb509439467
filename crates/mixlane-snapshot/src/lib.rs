//! # mixlane-snapshot — Immutable Submission Snapshots
//!
//! Every submit-for-review freezes the pitch's files and response text
//! into a new `Snapshot` at version `max(existing) + 1`. Snapshots are
//! never mutated after creation except for their acceptance status, which
//! moves PENDING → ACCEPTED → SUPERSEDED in one direction only. History
//! is immutable: a recalled or superseded submission stays in the set.
//!
//! ## Modules
//!
//! - **snapshot** (`snapshot.rs`): `FileRef`, `Snapshot`,
//!   `AcceptanceStatus`, and `SnapshotSet` — the per-pitch container that
//!   owns version assignment and the at-most-one-ACCEPTED invariant.
//!
//! - **diff** (`diff.rs`): the pure diff over two snapshots' file sets,
//!   partitioning file identities into Added/Removed/Modified/Unchanged.

pub mod diff;
pub mod snapshot;

pub use diff::{diff, SnapshotDiff};
pub use snapshot::{AcceptanceStatus, FileRef, Snapshot, SnapshotError, SnapshotSet};
