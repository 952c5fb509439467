//! # Snapshots & the Per-Pitch Snapshot Set
//!
//! `SnapshotSet` is the only way snapshots are created or have their
//! acceptance status changed. It owns two invariants:
//!
//! - version numbers are strictly increasing with no gaps or duplicates
//!   (1, 2, 3, … per pitch);
//! - at most one snapshot is ACCEPTED at any time (the live deliverable).
//!
//! Callers must hold the pitch's mutual-exclusion boundary while calling
//! `create()` — version assignment reads `max(existing)` and two
//! concurrent submits must not both observe the same maximum.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mixlane_core::{FileId, PitchId, SnapshotId, Timestamp};

/// A reference to one stored file inside a snapshot.
///
/// The bytes live in the host system's file store; the engine only needs
/// identity, name, and size (the diff compares on those) plus the upload
/// time (the resubmission-eligibility rule compares on that).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef {
    /// Unique file identifier.
    pub id: FileId,
    /// File name as uploaded.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// When the file was uploaded.
    pub created_at: Timestamp,
}

/// Acceptance status of a snapshot. Moves in one direction only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcceptanceStatus {
    /// Awaiting reviewer action.
    Pending,
    /// The currently live deliverable.
    Accepted,
    /// Replaced by a later snapshot, or withdrawn.
    Superseded,
}

/// An immutable, versioned bundle of files + response text representing
/// one submission instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unique snapshot identifier.
    pub id: SnapshotId,
    /// The pitch this snapshot belongs to.
    pub pitch_id: PitchId,
    /// Monotonically increasing version number, 1-based per pitch.
    pub version: u32,
    /// The files frozen into this submission.
    pub files: Vec<FileRef>,
    /// The producer's response to the previous round of feedback.
    pub response_to_feedback: Option<String>,
    /// Acceptance status. The only mutable field.
    pub status: AcceptanceStatus,
    /// When the snapshot was created.
    pub created_at: Timestamp,
}

/// Errors from snapshot-set operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// No snapshot with the given id in this set.
    #[error("snapshot {0} not found")]
    NotFound(SnapshotId),

    /// The set has no pending snapshot to act on.
    #[error("pitch has no pending snapshot")]
    NoPendingSnapshot,
}

/// The ordered set of snapshots belonging to one pitch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotSet {
    snapshots: Vec<Snapshot>,
}

impl SnapshotSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new snapshot at version `max(existing) + 1`.
    ///
    /// Any previously ACCEPTED snapshot is marked SUPERSEDED — a new
    /// submission always replaces the live deliverable candidate. The new
    /// snapshot starts PENDING.
    pub fn create(
        &mut self,
        pitch_id: PitchId,
        files: Vec<FileRef>,
        response_to_feedback: Option<String>,
    ) -> &Snapshot {
        for s in &mut self.snapshots {
            if s.status == AcceptanceStatus::Accepted {
                s.status = AcceptanceStatus::Superseded;
            }
        }
        let version = self.max_version() + 1;
        let idx = self.snapshots.len();
        self.snapshots.push(Snapshot {
            id: SnapshotId::new(),
            pitch_id,
            version,
            files,
            response_to_feedback,
            status: AcceptanceStatus::Pending,
            created_at: Timestamp::now(),
        });
        &self.snapshots[idx]
    }

    /// Mark the pending snapshot ACCEPTED, superseding any prior accepted
    /// one. Returns the accepted snapshot's id.
    pub fn accept_pending(&mut self) -> Result<SnapshotId, SnapshotError> {
        let pending = self
            .snapshots
            .iter()
            .position(|s| s.status == AcceptanceStatus::Pending)
            .ok_or(SnapshotError::NoPendingSnapshot)?;
        for s in &mut self.snapshots {
            if s.status == AcceptanceStatus::Accepted {
                s.status = AcceptanceStatus::Superseded;
            }
        }
        self.snapshots[pending].status = AcceptanceStatus::Accepted;
        Ok(self.snapshots[pending].id)
    }

    /// Mark the pending snapshot SUPERSEDED (submission recalled or
    /// revisions requested). The snapshot itself stays in the set —
    /// history is immutable. Returns the superseded snapshot's id.
    pub fn supersede_pending(&mut self) -> Result<SnapshotId, SnapshotError> {
        let pending = self
            .snapshots
            .iter_mut()
            .find(|s| s.status == AcceptanceStatus::Pending)
            .ok_or(SnapshotError::NoPendingSnapshot)?;
        pending.status = AcceptanceStatus::Superseded;
        Ok(pending.id)
    }

    /// Re-open review of the accepted snapshot: ACCEPTED → PENDING.
    ///
    /// Used when an approved pitch is returned to review; the inverse of
    /// `accept_pending` for the single live snapshot.
    pub fn reopen_accepted(&mut self) -> Result<SnapshotId, SnapshotError> {
        let accepted = self
            .snapshots
            .iter_mut()
            .find(|s| s.status == AcceptanceStatus::Accepted)
            .ok_or(SnapshotError::NoPendingSnapshot)?;
        accepted.status = AcceptanceStatus::Pending;
        Ok(accepted.id)
    }

    /// Look up a snapshot by id.
    pub fn get(&self, id: SnapshotId) -> Result<&Snapshot, SnapshotError> {
        self.snapshots
            .iter()
            .find(|s| s.id == id)
            .ok_or(SnapshotError::NotFound(id))
    }

    /// The highest version in the set, or 0 if empty.
    pub fn max_version(&self) -> u32 {
        self.snapshots.iter().map(|s| s.version).max().unwrap_or(0)
    }

    /// The currently pending snapshot, if any.
    pub fn pending(&self) -> Option<&Snapshot> {
        self.snapshots
            .iter()
            .find(|s| s.status == AcceptanceStatus::Pending)
    }

    /// The currently accepted snapshot (the live deliverable), if any.
    pub fn accepted(&self) -> Option<&Snapshot> {
        self.snapshots
            .iter()
            .find(|s| s.status == AcceptanceStatus::Accepted)
    }

    /// The most recent snapshot, if any.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// All snapshots, oldest first.
    pub fn all(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Whether the set is empty (no submission has happened yet).
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
