//! # The Engine Error Taxonomy
//!
//! One error type at the boundary. Domain errors from the inner crates
//! propagate typed and unmodified through `#[from]` variants; only
//! genuinely unexpected conditions collapse into `Internal`, and those
//! are logged with full context before they surface.

use thiserror::Error;

use mixlane_core::{ActorRole, MilestoneId, PitchId, ProjectId};
use mixlane_ledger::LedgerError;
use mixlane_snapshot::SnapshotError;
use mixlane_state::{ProjectError, StateError};

use crate::collab::GatewayError;

/// Any failure surfaced by an engine operation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The transition table or role check rejected the action.
    #[error(transparent)]
    State(#[from] StateError),

    /// The actor's role is right but their identity does not match the
    /// record (wrong producer, wrong owner, wrong client reference).
    #[error("actor identity does not match the {role:?} on record for this pitch")]
    IdentityMismatch {
        /// The role whose recorded identity failed to match.
        role: ActorRole,
    },

    /// Malformed or insufficient input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The milestone ledger rejected the operation (payment sequence,
    /// payment in progress, zero-amount rules).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Snapshot-set lookup or acceptance-state failure.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Project construction failure.
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Completion attempted with an unsettled milestone.
    #[error("cannot complete: milestone {milestone} ({name}) is not settled")]
    CompletionBlocked {
        /// The first unsettled milestone in payment order.
        milestone: MilestoneId,
        /// Its name, for the caller's error surface.
        name: String,
    },

    /// Completion attempted before the pitch-level payment settled.
    #[error("cannot complete: pitch payment has not settled")]
    PitchUnpaid,

    /// Judging attempted before submissions closed.
    #[error("contest {0} is not open for judging yet")]
    JudgingNotOpen(ProjectId),

    /// Judging attempted twice.
    #[error("contest {0} has already been resolved")]
    ContestAlreadyResolved(ProjectId),

    /// A judging selection referenced a pitch that is not an entry of
    /// this contest.
    #[error("pitch {0} is not an entry of this contest")]
    NotAContestEntry(PitchId),

    /// No project with the given id.
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),

    /// No pitch with the given id.
    #[error("pitch {0} not found")]
    PitchNotFound(PitchId),

    /// The gateway failed the charge synchronously.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Unexpected failure; context was logged before surfacing.
    #[error("internal error: {0}")]
    Internal(String),
}
