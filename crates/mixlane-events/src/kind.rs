//! # Event Kinds
//!
//! The closed vocabulary of things that can happen to a pitch. Each
//! variant carries its own typed payload; adding a kind forces every
//! exhaustive consumer to handle it.

use serde::{Deserialize, Serialize};

use mixlane_core::{ActorRole, Amount, FileId, MilestoneId, SnapshotId};
use mixlane_state::ReviewerKind;

/// How a contest entry placed at judging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "placement", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestPlacement {
    /// The winning entry.
    Winner,
    /// A runner-up, ranked from 1.
    RunnerUp {
        /// Rank among runner-ups (1-based).
        rank: u32,
    },
    /// Not selected.
    NotSelected,
}

/// One kind of state-changing action, with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// The pitch was created.
    PitchCreated,
    /// The work was accepted (invite accepted, or owner go-ahead).
    Accepted,
    /// A submission arrived for review; a new snapshot was frozen.
    SubmissionReceived {
        /// The snapshot created by this submission.
        snapshot_id: SnapshotId,
        /// Its version number.
        version: u32,
    },
    /// The producer withdrew a submission before reviewer action.
    SubmissionRecalled {
        /// The withdrawn snapshot.
        snapshot_id: SnapshotId,
    },
    /// A reviewer requested changes.
    RevisionsRequested {
        /// Internal reviewer or external client portal.
        reviewer: ReviewerKind,
        /// The reviewer's feedback.
        feedback: String,
    },
    /// The producer resumed work after revisions were requested.
    WorkResumed,
    /// The pending snapshot was accepted.
    SnapshotApproved {
        /// The accepted snapshot.
        snapshot_id: SnapshotId,
    },
    /// An approved pitch was returned to review.
    ReturnedToReview {
        /// The snapshot re-opened for review.
        snapshot_id: SnapshotId,
    },
    /// The pitch was rejected.
    Denied {
        /// Optional reason shown to the producer.
        reason: Option<String>,
    },
    /// The pitch was finalized.
    Completed {
        /// Optional closing feedback.
        feedback: Option<String>,
    },
    /// The pitch was cancelled by the owner.
    Closed {
        /// Optional reason.
        reason: Option<String>,
    },
    /// A file was uploaded to the pitch.
    FileUploaded {
        /// The stored file.
        file_id: FileId,
        /// File name as uploaded.
        name: String,
        /// Size in bytes.
        size_bytes: u64,
    },
    /// A milestone was added to the ledger.
    MilestoneAdded {
        /// The new milestone.
        milestone_id: MilestoneId,
        /// Its amount.
        amount: Amount,
    },
    /// A milestone charge was started at the gateway.
    MilestonePaymentStarted {
        /// The milestone being paid.
        milestone_id: MilestoneId,
        /// The amount in flight.
        amount: Amount,
    },
    /// A milestone charge settled.
    MilestonePaymentConfirmed {
        /// The paid milestone.
        milestone_id: MilestoneId,
        /// The gateway's reference for the settled charge.
        reference: String,
    },
    /// A milestone charge failed; the milestone is payable again.
    MilestonePaymentFailed {
        /// The milestone whose charge failed.
        milestone_id: MilestoneId,
        /// The gateway's failure reason.
        reason: String,
    },
    /// A zero-amount milestone was approved directly.
    MilestoneApproved {
        /// The approved milestone.
        milestone_id: MilestoneId,
    },
    /// The pitch-level charge settled (non-milestone pitches).
    PitchPaymentConfirmed {
        /// The gateway's reference for the settled charge.
        reference: String,
    },
    /// The pitch-level charge failed; a retry is allowed.
    PitchPaymentFailed {
        /// The gateway's failure reason.
        reason: String,
    },
    /// The owner closed contest submissions ahead of the deadline.
    ContestSubmissionsClosed,
    /// Judging resolved this entry.
    ContestResolved {
        /// How the entry placed.
        placement: ContestPlacement,
    },
    /// A free-text comment.
    Note {
        /// Who wrote it.
        author: ActorRole,
        /// The comment text.
        text: String,
    },
}

impl EventKind {
    /// A stable snake_case name for logging and display.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PitchCreated => "pitch_created",
            Self::Accepted => "accepted",
            Self::SubmissionReceived { .. } => "submission_received",
            Self::SubmissionRecalled { .. } => "submission_recalled",
            Self::RevisionsRequested {
                reviewer: ReviewerKind::Internal,
                ..
            } => "revisions_requested",
            Self::RevisionsRequested {
                reviewer: ReviewerKind::ClientPortal,
                ..
            } => "client_revisions_requested",
            Self::WorkResumed => "work_resumed",
            Self::SnapshotApproved { .. } => "snapshot_approved",
            Self::ReturnedToReview { .. } => "returned_to_review",
            Self::Denied { .. } => "denied",
            Self::Completed { .. } => "completed",
            Self::Closed { .. } => "closed",
            Self::FileUploaded { .. } => "file_uploaded",
            Self::MilestoneAdded { .. } => "milestone_added",
            Self::MilestonePaymentStarted { .. } => "milestone_payment_started",
            Self::MilestonePaymentConfirmed { .. } => "milestone_payment_confirmed",
            Self::MilestonePaymentFailed { .. } => "milestone_payment_failed",
            Self::MilestoneApproved { .. } => "milestone_approved",
            Self::PitchPaymentConfirmed { .. } => "pitch_payment_confirmed",
            Self::PitchPaymentFailed { .. } => "pitch_payment_failed",
            Self::ContestSubmissionsClosed => "contest_submissions_closed",
            Self::ContestResolved { .. } => "contest_resolved",
            Self::Note { .. } => "note",
        }
    }
}
