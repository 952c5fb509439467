//! # Transition Table & Authorization
//!
//! The single source of truth for which actions are legal in which status
//! under which workflow mode, and which actor role may perform them.
//!
//! Both checks are pure functions. The engine calls [`authorize`] first
//! (who may do this at all), then [`transition_target`] (is it legal right
//! now), then applies the mutation — so an illegal request never touches a
//! record.
//!
//! Contest resolution is deliberately absent from this table: contest
//! entries leave `CONTEST_ENTRY` only through the Contest Resolver's
//! one-shot bulk transition, never through a per-pitch action.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mixlane_core::{ActorRole, WorkflowMode};

use crate::status::PitchStatus;

/// Which kind of reviewer is requesting revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewerKind {
    /// The project owner reviewing internally.
    Internal,
    /// The external client reviewing through the portal.
    ClientPortal,
}

/// An actor action against a pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PitchAction {
    /// Accept the work: producer accepts an invite, or the owner
    /// green-lights a pending open-marketplace pitch.
    Accept,
    /// Submit the current work for review (creates a snapshot).
    SubmitForReview,
    /// Withdraw a submission that has not yet seen reviewer action.
    RecallSubmission,
    /// Request changes to the submitted work.
    RequestRevisions(ReviewerKind),
    /// Return to work after revisions were requested.
    ResumeWork,
    /// Accept the pending snapshot.
    Approve,
    /// Re-open review of an approved (not yet completed) pitch.
    ReturnToReview,
    /// Reject the pitch outright.
    Deny,
    /// Finalize an approved, fully paid pitch.
    Complete,
    /// Cancel the pitch.
    Close,
}

impl std::fmt::Display for PitchAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Accept => "accept",
            Self::SubmitForReview => "submit_for_review",
            Self::RecallSubmission => "recall_submission",
            Self::RequestRevisions(ReviewerKind::Internal) => "request_revisions",
            Self::RequestRevisions(ReviewerKind::ClientPortal) => "client_request_revisions",
            Self::ResumeWork => "resume_work",
            Self::Approve => "approve",
            Self::ReturnToReview => "return_to_review",
            Self::Deny => "deny",
            Self::Complete => "complete",
            Self::Close => "close",
        };
        f.write_str(s)
    }
}

/// Errors from the transition table and authorization checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The action is not legal in the pitch's current status.
    #[error("action {action} is not legal while the pitch is {from}")]
    InvalidTransition {
        /// The pitch's current status, returned so the caller can re-render.
        from: PitchStatus,
        /// The attempted action.
        action: PitchAction,
    },

    /// The pitch is in a terminal status; nothing further is legal.
    #[error("pitch is in terminal status {status}")]
    Terminal {
        /// The terminal status.
        status: PitchStatus,
    },

    /// The action does not exist under this workflow mode.
    #[error("action {action} is not available in {mode} mode")]
    WrongMode {
        /// The project's workflow mode.
        mode: WorkflowMode,
        /// The attempted action.
        action: PitchAction,
    },

    /// The actor's role may never perform this action.
    #[error("role {role:?} is not permitted to {action}")]
    Unauthorized {
        /// The attempted action.
        action: PitchAction,
        /// The role that attempted it.
        role: ActorRole,
    },
}

/// Check that `role` is permitted to perform `action` under `mode`.
///
/// This is the role-level check only; identity-level checks (is this
/// producer the pitch owner, does this client reference match the
/// project) are the engine's responsibility, since they need the records.
pub fn authorize(action: PitchAction, role: ActorRole, mode: WorkflowMode) -> Result<(), StateError> {
    use ActorRole::{Client, Producer, ProjectOwner};
    use PitchAction::*;

    let permitted = match action {
        // Invite acceptance belongs to the invited producer; in the open
        // marketplace the owner green-lights the pitch instead.
        Accept => match mode {
            WorkflowMode::Invite => role == Producer,
            WorkflowMode::Open | WorkflowMode::ManagedClient => role == ProjectOwner,
            WorkflowMode::Contest => false,
        },
        SubmitForReview | RecallSubmission | ResumeWork => role == Producer,
        RequestRevisions(ReviewerKind::Internal) => role == ProjectOwner,
        RequestRevisions(ReviewerKind::ClientPortal) => role == Client,
        Approve => match mode {
            WorkflowMode::ManagedClient => role == Client || role == ProjectOwner,
            _ => role == ProjectOwner,
        },
        ReturnToReview | Deny | Complete | Close => role == ProjectOwner,
    };

    if permitted {
        Ok(())
    } else {
        Err(StateError::Unauthorized { action, role })
    }
}

/// Resolve the target status for `action` given the current status and
/// workflow mode, or reject it.
///
/// Pure lookup — no record is touched here. A `Terminal` error is
/// returned for any action against a terminal status; `WrongMode` when
/// the action does not exist under the mode (e.g. client revisions
/// outside managed-client work, or any review action in a contest).
pub fn transition_target(
    mode: WorkflowMode,
    from: PitchStatus,
    action: PitchAction,
) -> Result<PitchStatus, StateError> {
    use PitchStatus::*;

    if from.is_terminal() {
        return Err(StateError::Terminal { status: from });
    }

    // Contest entries are frozen until judging; the owner may still
    // cancel the project out from under them.
    if mode == WorkflowMode::Contest && action != PitchAction::Close {
        return Err(StateError::WrongMode { mode, action });
    }
    if action == PitchAction::RequestRevisions(ReviewerKind::ClientPortal)
        && mode != WorkflowMode::ManagedClient
    {
        return Err(StateError::WrongMode { mode, action });
    }

    let target = match (from, action) {
        (Pending | AwaitingAcceptance, PitchAction::Accept) => InProgress,
        (InProgress, PitchAction::SubmitForReview) => ReadyForReview,
        (ReadyForReview, PitchAction::RecallSubmission) => InProgress,
        (ReadyForReview, PitchAction::RequestRevisions(ReviewerKind::Internal)) => {
            RevisionsRequested
        }
        (ReadyForReview, PitchAction::RequestRevisions(ReviewerKind::ClientPortal)) => {
            ClientRevisionsRequested
        }
        (RevisionsRequested | ClientRevisionsRequested, PitchAction::ResumeWork) => InProgress,
        (ReadyForReview, PitchAction::Approve) => Approved,
        (Approved, PitchAction::ReturnToReview) => ReadyForReview,
        (Approved, PitchAction::Complete) => Completed,
        (_, PitchAction::Deny) => Denied,
        (_, PitchAction::Close) => Closed,
        _ => return Err(StateError::InvalidTransition { from, action }),
    };

    Ok(target)
}
