//! # Pitch Statuses
//!
//! The full status vocabulary of the pitch lifecycle, across all four
//! workflow modes. Contest-only statuses are listed alongside the core
//! set; the transition table in `machine.rs` keeps them out of reach for
//! non-contest projects.

use serde::{Deserialize, Serialize};

use mixlane_core::WorkflowMode;

/// The lifecycle status of a pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PitchStatus {
    /// Created, awaiting the project owner's go-ahead (open marketplace).
    Pending,
    /// Invite sent, awaiting the producer's acceptance (invite mode only).
    AwaitingAcceptance,
    /// The producer is actively working.
    InProgress,
    /// Submitted; a pending snapshot awaits reviewer action.
    ReadyForReview,
    /// The internal reviewer (project owner) requested changes.
    RevisionsRequested,
    /// The external client requested changes through the portal.
    ClientRevisionsRequested,
    /// The pending snapshot was accepted; payment can now settle.
    Approved,
    /// Rejected by the owner (terminal).
    Denied,
    /// Finished and fully paid (terminal).
    Completed,
    /// Cancelled by the owner (terminal).
    Closed,
    /// A contest entry, fixed until judging.
    ContestEntry,
    /// Contest winner (terminal).
    ContestWinner,
    /// Contest runner-up (terminal).
    ContestRunnerUp,
    /// Contest entry not selected (terminal).
    ContestNotSelected,
}

impl PitchStatus {
    /// The initial status of a newly created pitch under the given mode.
    pub fn initial_for(mode: WorkflowMode) -> Self {
        match mode {
            WorkflowMode::Contest => Self::ContestEntry,
            WorkflowMode::Invite => Self::AwaitingAcceptance,
            WorkflowMode::Open | WorkflowMode::ManagedClient => Self::Pending,
        }
    }

    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed
                | Self::Denied
                | Self::Closed
                | Self::ContestWinner
                | Self::ContestRunnerUp
                | Self::ContestNotSelected
        )
    }

    /// Whether this status belongs to the contest vocabulary.
    pub fn is_contest(&self) -> bool {
        matches!(
            self,
            Self::ContestEntry
                | Self::ContestWinner
                | Self::ContestRunnerUp
                | Self::ContestNotSelected
        )
    }

    /// Whether the pitch is waiting on a reviewer (a pending snapshot exists).
    pub fn is_under_review(&self) -> bool {
        matches!(self, Self::ReadyForReview)
    }
}

impl std::fmt::Display for PitchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::AwaitingAcceptance => "AWAITING_ACCEPTANCE",
            Self::InProgress => "IN_PROGRESS",
            Self::ReadyForReview => "READY_FOR_REVIEW",
            Self::RevisionsRequested => "REVISIONS_REQUESTED",
            Self::ClientRevisionsRequested => "CLIENT_REVISIONS_REQUESTED",
            Self::Approved => "APPROVED",
            Self::Denied => "DENIED",
            Self::Completed => "COMPLETED",
            Self::Closed => "CLOSED",
            Self::ContestEntry => "CONTEST_ENTRY",
            Self::ContestWinner => "CONTEST_WINNER",
            Self::ContestRunnerUp => "CONTEST_RUNNER_UP",
            Self::ContestNotSelected => "CONTEST_NOT_SELECTED",
        };
        f.write_str(s)
    }
}
