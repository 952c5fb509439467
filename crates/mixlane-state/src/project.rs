//! # The Project Record
//!
//! A project is the owner-side unit of work a pitch belongs to. The mode
//! is fixed at creation; deadlines exist only for contests; a managed
//! client reference exists only for managed-client work. Constructor
//! validation enforces those shape rules so the rest of the engine can
//! rely on them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mixlane_core::{Amount, ClientRef, ProjectId, Timestamp, UserId, WorkflowMode};

/// Revision allowance for managed-client work.
///
/// Client revision requests beyond `included_revisions` carry the
/// additional fee, collected through a ledger-generated revision
/// milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionPolicy {
    /// Revision rounds included in the base price.
    pub included_revisions: u32,
    /// Fee for each additional revision round.
    pub additional_revision_fee: Amount,
}

impl Default for RevisionPolicy {
    fn default() -> Self {
        Self {
            included_revisions: 2,
            additional_revision_fee: Amount::ZERO,
        }
    }
}

/// Errors from project construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    /// Contest projects need both deadlines.
    #[error("contest projects require submission and judging deadlines")]
    MissingContestDeadlines,

    /// Contest deadlines must be ordered.
    #[error("judging deadline {judging} precedes submission deadline {submission}")]
    DeadlineOrder {
        /// The submission deadline.
        submission: Timestamp,
        /// The judging deadline.
        judging: Timestamp,
    },

    /// Managed-client projects need a client reference.
    #[error("managed-client projects require a client reference")]
    MissingClient,
}

/// The owner-side unit of work. Mode is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Workflow mode. Never changes after creation.
    pub mode: WorkflowMode,
    /// The project owner.
    pub owner: UserId,
    /// Total budget for the work.
    pub budget: Amount,
    /// The external client this work is for (managed-client mode only).
    pub client: Option<ClientRef>,
    /// Contest submission deadline (contest mode only).
    pub submission_deadline: Option<Timestamp>,
    /// Contest judging deadline (contest mode only).
    pub judging_deadline: Option<Timestamp>,
    /// Whether the owner closed contest submissions ahead of the deadline.
    pub submissions_closed_early: bool,
    /// Revision allowance for managed-client work.
    pub revision_policy: RevisionPolicy,
    /// When the project was created.
    pub created_at: Timestamp,
}

impl Project {
    /// Create a non-contest, non-managed project (open or invite).
    pub fn new(mode: WorkflowMode, owner: UserId, budget: Amount) -> Result<Self, ProjectError> {
        match mode {
            WorkflowMode::Contest => Err(ProjectError::MissingContestDeadlines),
            WorkflowMode::ManagedClient => Err(ProjectError::MissingClient),
            WorkflowMode::Open | WorkflowMode::Invite => Ok(Self {
                id: ProjectId::new(),
                mode,
                owner,
                budget,
                client: None,
                submission_deadline: None,
                judging_deadline: None,
                submissions_closed_early: false,
                revision_policy: RevisionPolicy::default(),
                created_at: Timestamp::now(),
            }),
        }
    }

    /// Create a contest project with its two deadlines.
    pub fn new_contest(
        owner: UserId,
        budget: Amount,
        submission_deadline: Timestamp,
        judging_deadline: Timestamp,
    ) -> Result<Self, ProjectError> {
        if judging_deadline < submission_deadline {
            return Err(ProjectError::DeadlineOrder {
                submission: submission_deadline,
                judging: judging_deadline,
            });
        }
        Ok(Self {
            id: ProjectId::new(),
            mode: WorkflowMode::Contest,
            owner,
            budget,
            client: None,
            submission_deadline: Some(submission_deadline),
            judging_deadline: Some(judging_deadline),
            submissions_closed_early: false,
            revision_policy: RevisionPolicy::default(),
            created_at: Timestamp::now(),
        })
    }

    /// Create a managed-client project for an external client.
    pub fn new_managed_client(
        owner: UserId,
        budget: Amount,
        client: ClientRef,
        revision_policy: RevisionPolicy,
    ) -> Self {
        Self {
            id: ProjectId::new(),
            mode: WorkflowMode::ManagedClient,
            owner,
            budget,
            client: Some(client),
            submission_deadline: None,
            judging_deadline: None,
            submissions_closed_early: false,
            revision_policy,
            created_at: Timestamp::now(),
        }
    }

    /// Whether contest submissions are closed (deadline passed or closed
    /// early by the owner).
    pub fn submissions_closed(&self, now: Timestamp) -> bool {
        self.submissions_closed_early
            || self
                .submission_deadline
                .map(|deadline| now > deadline)
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn test_contest_requires_deadlines() {
        let err = Project::new(WorkflowMode::Contest, UserId::new(), Amount::ZERO).unwrap_err();
        assert_eq!(err, ProjectError::MissingContestDeadlines);
    }

    #[test]
    fn test_contest_deadline_order_enforced() {
        let err = Project::new_contest(
            UserId::new(),
            Amount::from_dollars(500),
            ts("2026-04-01T00:00:00Z"),
            ts("2026-03-01T00:00:00Z"),
        )
        .unwrap_err();
        assert!(matches!(err, ProjectError::DeadlineOrder { .. }));
    }

    #[test]
    fn test_managed_client_requires_client() {
        let err =
            Project::new(WorkflowMode::ManagedClient, UserId::new(), Amount::ZERO).unwrap_err();
        assert_eq!(err, ProjectError::MissingClient);
    }

    #[test]
    fn test_submissions_closed_by_deadline() {
        let project = Project::new_contest(
            UserId::new(),
            Amount::from_dollars(500),
            ts("2026-03-01T00:00:00Z"),
            ts("2026-04-01T00:00:00Z"),
        )
        .unwrap();
        assert!(!project.submissions_closed(ts("2026-02-28T23:59:59Z")));
        assert!(!project.submissions_closed(ts("2026-03-01T00:00:00Z")));
        assert!(project.submissions_closed(ts("2026-03-01T00:00:01Z")));
    }

    #[test]
    fn test_submissions_closed_early_flag() {
        let mut project = Project::new_contest(
            UserId::new(),
            Amount::from_dollars(500),
            ts("2026-03-01T00:00:00Z"),
            ts("2026-04-01T00:00:00Z"),
        )
        .unwrap();
        project.submissions_closed_early = true;
        assert!(project.submissions_closed(ts("2026-01-01T00:00:00Z")));
    }

    #[test]
    fn test_open_project_has_no_deadlines() {
        let project = Project::new(WorkflowMode::Open, UserId::new(), Amount::ZERO).unwrap();
        assert!(project.submission_deadline.is_none());
        assert!(!project.submissions_closed(Timestamp::now()));
    }
}
