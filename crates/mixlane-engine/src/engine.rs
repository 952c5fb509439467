//! # The Orchestrator
//!
//! `Engine` is the produced interface of the crate: every operation the
//! host system calls lands here. Each operation locks the pitch's
//! aggregate, validates (role, identity, transition legality,
//! operation-specific preconditions), then mutates status, snapshots,
//! ledger, and event log as one unit. Validation failures return before
//! the first mutation, so a rejected request never leaves partial
//! effects behind.
//!
//! Notification delivery is fire-and-forget: a failed delivery is
//! logged at `warn` and never rolls back a transition.

use std::sync::Arc;

use tracing::{info, warn};

use mixlane_core::{
    Actor, ActorRole, Amount, ClientRef, FileId, MilestoneId, PitchId, ProjectId, SnapshotId,
    Timestamp, UserId, WorkflowMode,
};
use mixlane_events::{EventKind, EventRecord};
use mixlane_ledger::{Milestone, PaymentAttempt, PaymentHandle};
use mixlane_snapshot::{diff, FileRef, Snapshot, SnapshotDiff};
use mixlane_state::{
    authorize, transition_target, Pitch, PitchAction, PitchPaymentStatus, PitchStatus, Project,
    ReviewerKind, RevisionPolicy, StateError,
};

use crate::collab::{FileStore, NotificationSink, PaymentGateway, Recipient};
use crate::config::EngineConfig;
use crate::contest::{self, ContestResolution};
use crate::error::EngineError;
use crate::store::{lock, InMemoryStore, PitchAggregate};

/// Outcome of starting a milestone charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// A new charge was started at the gateway.
    Charged(PaymentHandle),
    /// A charge was already in flight; its handle is returned and no
    /// new charge was started.
    AlreadyInFlight(Option<PaymentHandle>),
}

/// The pitch lifecycle orchestration engine.
pub struct Engine {
    store: InMemoryStore,
    files: Arc<dyn FileStore>,
    notifier: Arc<dyn NotificationSink>,
    gateway: Arc<dyn PaymentGateway>,
    config: EngineConfig,
}

impl Engine {
    /// Build an engine over the host system's collaborators.
    pub fn new(
        files: Arc<dyn FileStore>,
        notifier: Arc<dyn NotificationSink>,
        gateway: Arc<dyn PaymentGateway>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store: InMemoryStore::new(),
            files,
            notifier,
            gateway,
            config,
        }
    }

    // ── projects & pitches ───────────────────────────────────────────

    /// Create an open-marketplace or invite project.
    pub fn create_project(
        &self,
        owner: UserId,
        mode: WorkflowMode,
        budget: Amount,
    ) -> Result<Project, EngineError> {
        let project = Project::new(mode, owner, budget)?;
        info!(project = %project.id, %mode, "project created");
        self.store.insert_project(project.clone());
        Ok(project)
    }

    /// Create a contest project with its two deadlines.
    pub fn create_contest_project(
        &self,
        owner: UserId,
        budget: Amount,
        submission_deadline: Timestamp,
        judging_deadline: Timestamp,
    ) -> Result<Project, EngineError> {
        let project = Project::new_contest(owner, budget, submission_deadline, judging_deadline)?;
        info!(project = %project.id, %submission_deadline, %judging_deadline, "contest created");
        self.store.insert_project(project.clone());
        Ok(project)
    }

    /// Create a managed-client project for an external client.
    pub fn create_managed_client_project(
        &self,
        owner: UserId,
        budget: Amount,
        client: ClientRef,
        revision_policy: RevisionPolicy,
    ) -> Result<Project, EngineError> {
        let project = Project::new_managed_client(owner, budget, client, revision_policy);
        info!(project = %project.id, "managed-client project created");
        self.store.insert_project(project.clone());
        Ok(project)
    }

    /// Create a pitch under a project.
    ///
    /// Enforces the one-pitch cardinality for invite and managed-client
    /// projects, and rejects contest entries once submissions are closed.
    pub fn create_pitch(
        &self,
        project_id: ProjectId,
        producer: UserId,
        amount: Amount,
    ) -> Result<Pitch, EngineError> {
        let project = self.store.project(project_id)?;
        if project.mode == WorkflowMode::Contest && project.submissions_closed(Timestamp::now()) {
            return Err(EngineError::Validation(format!(
                "contest {project_id} is no longer accepting entries"
            )));
        }
        let pitch = Pitch::new(project_id, producer, project.mode, amount);
        let agg = self.store.register_pitch(pitch.clone())?;

        let mut g = lock(&agg);
        let record = self.append(&mut g, EventKind::PitchCreated, None);
        drop(g);
        info!(pitch = %pitch.id, project = %project_id, status = %pitch.status, "pitch created");
        self.deliver(Recipient::User(project.owner), &record);
        Ok(pitch)
    }

    // ── files ────────────────────────────────────────────────────────

    /// Attach a file to the pitch's working set.
    ///
    /// Producer-only. Stores the bytes through the host's file store,
    /// enforces the per-pitch storage cap, and appends a file-uploaded
    /// event. Files in the working set are frozen into the next
    /// submission snapshot.
    pub fn attach_file(
        &self,
        pitch_id: PitchId,
        actor: &Actor,
        name: &str,
        bytes: &[u8],
    ) -> Result<FileRef, EngineError> {
        let agg = self.store.aggregate(pitch_id)?;
        let mut g = lock(&agg);
        if g.pitch.is_terminal() {
            return Err(StateError::Terminal {
                status: g.pitch.status,
            }
            .into());
        }
        require_producer(actor, &g.pitch)?;

        let incoming = bytes.len() as u64;
        if g.stored_bytes() + incoming > self.config.max_pitch_storage_bytes {
            return Err(EngineError::Validation(format!(
                "storage cap exceeded: pitch holds {} bytes, cap is {}",
                g.stored_bytes(),
                self.config.max_pitch_storage_bytes
            )));
        }

        let file = self.files.store(name, bytes).map_err(|e| {
            warn!(pitch = %pitch_id, error = %e, "file store failure");
            EngineError::Internal(format!("file store: {e}"))
        })?;
        g.files.push(file.clone());
        self.append(
            &mut g,
            EventKind::FileUploaded {
                file_id: file.id,
                name: file.name.clone(),
                size_bytes: file.size_bytes,
            },
            Some(actor.clone()),
        );
        info!(pitch = %pitch_id, file = %file.id, size = file.size_bytes, "file attached");
        Ok(file)
    }

    /// A time-limited signed download URL for a working-set file.
    pub fn download_url(
        &self,
        pitch_id: PitchId,
        file_id: FileId,
        ttl_secs: u64,
    ) -> Result<String, EngineError> {
        let agg = self.store.aggregate(pitch_id)?;
        let g = lock(&agg);
        let file = g
            .files
            .iter()
            .find(|f| f.id == file_id)
            .ok_or_else(|| EngineError::Validation(format!("file {file_id} is not attached")))?;
        self.files
            .signed_download_url(file, ttl_secs)
            .map_err(|e| EngineError::Internal(format!("file store: {e}")))
    }

    // ── lifecycle transitions ────────────────────────────────────────

    /// Accept the work: the invited producer accepts, or the owner
    /// green-lights an open-marketplace pitch.
    pub fn accept(&self, pitch_id: PitchId, actor: &Actor) -> Result<Pitch, EngineError> {
        self.transition(pitch_id, actor, PitchAction::Accept, |this, g, actor| {
            Ok(this.append(g, EventKind::Accepted, Some(actor.clone())))
        })
    }

    /// Submit the working file set for review.
    ///
    /// Freezes the working set into a new snapshot at the next version.
    /// Requires at least one attached file.
    pub fn submit_for_review(
        &self,
        pitch_id: PitchId,
        actor: &Actor,
        response_to_feedback: Option<String>,
    ) -> Result<Snapshot, EngineError> {
        let mut created: Option<Snapshot> = None;
        let out = &mut created;
        self.transition(
            pitch_id,
            actor,
            PitchAction::SubmitForReview,
            move |this, g, actor| {
                if g.files.is_empty() {
                    return Err(EngineError::Validation(
                        "submit requires at least one attached file".into(),
                    ));
                }
                let files = g.files.clone();
                let snapshot = g
                    .snapshots
                    .create(g.pitch.id, files, response_to_feedback)
                    .clone();
                let record = this.append(
                    g,
                    EventKind::SubmissionReceived {
                        snapshot_id: snapshot.id,
                        version: snapshot.version,
                    },
                    Some(actor.clone()),
                );
                *out = Some(snapshot);
                Ok(record)
            },
        )?;
        created.ok_or_else(|| EngineError::Internal("submission produced no snapshot".into()))
    }

    /// Withdraw a submission before any reviewer action.
    ///
    /// Only eligible when at least one file was attached strictly after
    /// the last submission — recall is gated on demonstrable new
    /// content, not just a desire to withdraw.
    pub fn recall_submission(&self, pitch_id: PitchId, actor: &Actor) -> Result<Pitch, EngineError> {
        self.transition(
            pitch_id,
            actor,
            PitchAction::RecallSubmission,
            |this, g, actor| {
                let cutoff = g.log.last_submission_at().ok_or_else(|| {
                    EngineError::Internal("pitch under review has no submission event".into())
                })?;
                if !g.files.iter().any(|f| f.created_at > cutoff) {
                    return Err(EngineError::Validation(
                        "recall requires new content uploaded since the last submission".into(),
                    ));
                }
                let snapshot_id = g.snapshots.supersede_pending()?;
                Ok(this.append(
                    g,
                    EventKind::SubmissionRecalled { snapshot_id },
                    Some(actor.clone()),
                ))
            },
        )
    }

    /// Request changes to the submitted work.
    ///
    /// The reviewer kind follows from the actor's role: the project
    /// owner reviews internally, the external client reviews through
    /// the portal. For managed-client work, client revision requests
    /// beyond the included rounds append a revision milestone for the
    /// additional fee.
    pub fn request_revisions(
        &self,
        pitch_id: PitchId,
        actor: &Actor,
        feedback: &str,
    ) -> Result<Pitch, EngineError> {
        let reviewer = match actor.role() {
            ActorRole::Client => ReviewerKind::ClientPortal,
            _ => ReviewerKind::Internal,
        };
        if feedback.chars().count() < self.config.min_feedback_chars {
            return Err(EngineError::Validation(format!(
                "revision feedback must be at least {} characters",
                self.config.min_feedback_chars
            )));
        }
        let agg = self.store.aggregate(pitch_id)?;
        let project_id = lock(&agg).pitch.project_id;
        let policy = self.store.project(project_id)?.revision_policy;

        self.transition(
            pitch_id,
            actor,
            PitchAction::RequestRevisions(reviewer),
            |this, g, actor| {
                g.snapshots.supersede_pending()?;
                let record = this.append(
                    g,
                    EventKind::RevisionsRequested {
                        reviewer,
                        feedback: feedback.to_string(),
                    },
                    Some(actor.clone()),
                );
                if reviewer == ReviewerKind::ClientPortal {
                    g.pitch.revision_rounds_used += 1;
                    let round = g.pitch.revision_rounds_used;
                    if round > policy.included_revisions
                        && !policy.additional_revision_fee.is_zero()
                    {
                        let pitch_id = g.pitch.id;
                        let milestone = g
                            .ledger
                            .add_revision_milestone(pitch_id, round, policy.additional_revision_fee);
                        let (milestone_id, amount) = (milestone.id, milestone.amount);
                        this.append(
                            g,
                            EventKind::MilestoneAdded {
                                milestone_id,
                                amount,
                            },
                            Some(actor.clone()),
                        );
                        info!(pitch = %pitch_id, milestone = %milestone_id, round, "revision milestone added");
                    }
                }
                Ok(record)
            },
        )
    }

    /// Return to work after revisions were requested.
    pub fn resume_work(&self, pitch_id: PitchId, actor: &Actor) -> Result<Pitch, EngineError> {
        self.transition(pitch_id, actor, PitchAction::ResumeWork, |this, g, actor| {
            Ok(this.append(g, EventKind::WorkResumed, Some(actor.clone())))
        })
    }

    /// Accept the pending snapshot; the pitch becomes APPROVED.
    pub fn approve(&self, pitch_id: PitchId, actor: &Actor) -> Result<Pitch, EngineError> {
        self.transition(pitch_id, actor, PitchAction::Approve, |this, g, actor| {
            let snapshot_id = g.snapshots.accept_pending()?;
            Ok(this.append(
                g,
                EventKind::SnapshotApproved { snapshot_id },
                Some(actor.clone()),
            ))
        })
    }

    /// Re-open review of an approved, not yet completed pitch.
    pub fn return_to_review(&self, pitch_id: PitchId, actor: &Actor) -> Result<Pitch, EngineError> {
        self.transition(
            pitch_id,
            actor,
            PitchAction::ReturnToReview,
            |this, g, actor| {
                let snapshot_id = g.snapshots.reopen_accepted()?;
                Ok(this.append(
                    g,
                    EventKind::ReturnedToReview { snapshot_id },
                    Some(actor.clone()),
                ))
            },
        )
    }

    /// Reject the pitch outright.
    pub fn deny(
        &self,
        pitch_id: PitchId,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<Pitch, EngineError> {
        self.transition(pitch_id, actor, PitchAction::Deny, move |this, g, actor| {
            // A pending snapshot under review is superseded, not left dangling.
            let _ = g.snapshots.supersede_pending();
            Ok(this.append(g, EventKind::Denied { reason }, Some(actor.clone())))
        })
    }

    /// Finalize an approved pitch.
    ///
    /// Requires every milestone settled, or for non-milestone pitches a
    /// settled pitch-level payment (or nothing to charge).
    pub fn complete(
        &self,
        pitch_id: PitchId,
        actor: &Actor,
        feedback: Option<String>,
    ) -> Result<Pitch, EngineError> {
        self.transition(pitch_id, actor, PitchAction::Complete, move |this, g, actor| {
            if g.ledger.is_empty() {
                if !g.pitch.payment_settled() {
                    return Err(EngineError::PitchUnpaid);
                }
            } else if let Some(m) = g.ledger.first_unsettled() {
                return Err(EngineError::CompletionBlocked {
                    milestone: m.id,
                    name: m.name.clone(),
                });
            }
            Ok(this.append(g, EventKind::Completed { feedback }, Some(actor.clone())))
        })
    }

    /// Cancel the pitch.
    pub fn close(
        &self,
        pitch_id: PitchId,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<Pitch, EngineError> {
        self.transition(pitch_id, actor, PitchAction::Close, move |this, g, actor| {
            let _ = g.snapshots.supersede_pending();
            Ok(this.append(g, EventKind::Closed { reason }, Some(actor.clone())))
        })
    }

    /// Append a free-text comment to the pitch's timeline.
    pub fn add_note(
        &self,
        pitch_id: PitchId,
        actor: &Actor,
        text: &str,
    ) -> Result<EventRecord, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::Validation("note text is empty".into()));
        }
        let agg = self.store.aggregate(pitch_id)?;
        let mut g = lock(&agg);
        let project = self.store.project(g.pitch.project_id)?;
        check_identity(actor, &g.pitch, &project)?;
        let record = self.append(
            &mut g,
            EventKind::Note {
                author: actor.role(),
                text: text.to_string(),
            },
            Some(actor.clone()),
        );
        drop(g);
        Ok(record)
    }

    // ── milestones & payments ────────────────────────────────────────

    /// Add a milestone at the end of the payment sequence. Owner-only.
    ///
    /// For managed-client work, milestones are fixed once the first
    /// submission exists; only gate-generated revision milestones may
    /// appear after that.
    pub fn add_milestone(
        &self,
        pitch_id: PitchId,
        actor: &Actor,
        name: &str,
        amount: Amount,
    ) -> Result<Milestone, EngineError> {
        let agg = self.store.aggregate(pitch_id)?;
        let mut g = lock(&agg);
        let project = self.store.project(g.pitch.project_id)?;
        require_owner(actor, &project)?;
        if g.pitch.is_terminal() {
            return Err(StateError::Terminal {
                status: g.pitch.status,
            }
            .into());
        }
        if project.mode == WorkflowMode::ManagedClient && !g.snapshots.is_empty() {
            return Err(EngineError::Validation(
                "milestones are fixed once work has been submitted".into(),
            ));
        }
        let milestone = g.ledger.add(pitch_id, name, amount).clone();
        self.append(
            &mut g,
            EventKind::MilestoneAdded {
                milestone_id: milestone.id,
                amount,
            },
            Some(actor.clone()),
        );
        info!(pitch = %pitch_id, milestone = %milestone.id, %amount, "milestone added");
        Ok(milestone)
    }

    /// Start a charge for the next payable milestone.
    ///
    /// Client-side actors only (the external client for managed work,
    /// otherwise the project owner). Enforces the sequential gate and
    /// the at-most-one-in-flight invariant; re-begin while a charge is
    /// in flight returns the existing handle instead of double-charging.
    /// A synchronous gateway failure rolls the milestone back to
    /// payable and surfaces as a gateway error.
    pub fn begin_milestone_payment(
        &self,
        pitch_id: PitchId,
        milestone_id: MilestoneId,
        actor: &Actor,
        payment_method: &str,
    ) -> Result<ChargeOutcome, EngineError> {
        let agg = self.store.aggregate(pitch_id)?;
        let mut g = lock(&agg);
        let project = self.store.project(g.pitch.project_id)?;
        require_payer(actor, &project)?;

        match g.ledger.begin_payment(milestone_id)? {
            PaymentAttempt::AlreadyProcessing(handle) => {
                Ok(ChargeOutcome::AlreadyInFlight(handle))
            }
            PaymentAttempt::Started => {
                let amount = g.ledger.get(milestone_id)?.amount;
                match self.gateway.charge(amount, payment_method) {
                    Ok(handle) => {
                        g.ledger.record_handle(milestone_id, handle.clone())?;
                        self.append(
                            &mut g,
                            EventKind::MilestonePaymentStarted {
                                milestone_id,
                                amount,
                            },
                            Some(actor.clone()),
                        );
                        info!(pitch = %pitch_id, milestone = %milestone_id, %amount, "charge started");
                        Ok(ChargeOutcome::Charged(handle))
                    }
                    Err(e) => {
                        g.ledger.fail_payment(milestone_id)?;
                        let record = self.append(
                            &mut g,
                            EventKind::MilestonePaymentFailed {
                                milestone_id,
                                reason: e.to_string(),
                            },
                            Some(actor.clone()),
                        );
                        let producer = g.pitch.owner;
                        drop(g);
                        warn!(pitch = %pitch_id, milestone = %milestone_id, error = %e, "charge failed at gateway");
                        self.deliver(Recipient::User(producer), &record);
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Webhook entry point: a milestone charge settled. Idempotent.
    pub fn confirm_milestone_payment(
        &self,
        pitch_id: PitchId,
        milestone_id: MilestoneId,
        external_reference: &str,
    ) -> Result<Milestone, EngineError> {
        let agg = self.store.aggregate(pitch_id)?;
        let mut g = lock(&agg);
        let applied = g.ledger.confirm_payment(milestone_id, external_reference)?;
        let milestone = g.ledger.get(milestone_id)?.clone();
        if applied {
            let record = self.append(
                &mut g,
                EventKind::MilestonePaymentConfirmed {
                    milestone_id,
                    reference: external_reference.to_string(),
                },
                None,
            );
            let producer = g.pitch.owner;
            drop(g);
            info!(pitch = %pitch_id, milestone = %milestone_id, "milestone payment confirmed");
            self.deliver(Recipient::User(producer), &record);
        }
        Ok(milestone)
    }

    /// Webhook entry point: a milestone charge failed. The milestone
    /// returns to payable; a straggler failure after settlement is
    /// ignored.
    pub fn fail_milestone_payment(
        &self,
        pitch_id: PitchId,
        milestone_id: MilestoneId,
        reason: &str,
    ) -> Result<Milestone, EngineError> {
        let agg = self.store.aggregate(pitch_id)?;
        let mut g = lock(&agg);
        let applied = g.ledger.fail_payment(milestone_id)?;
        let milestone = g.ledger.get(milestone_id)?.clone();
        if applied {
            self.append(
                &mut g,
                EventKind::MilestonePaymentFailed {
                    milestone_id,
                    reason: reason.to_string(),
                },
                None,
            );
            warn!(pitch = %pitch_id, milestone = %milestone_id, reason, "milestone payment failed");
        }
        Ok(milestone)
    }

    /// Approve a zero-amount milestone directly, bypassing the payment
    /// gate. Owner-only; idempotent.
    pub fn approve_milestone(
        &self,
        pitch_id: PitchId,
        milestone_id: MilestoneId,
        actor: &Actor,
    ) -> Result<Milestone, EngineError> {
        let agg = self.store.aggregate(pitch_id)?;
        let mut g = lock(&agg);
        let project = self.store.project(g.pitch.project_id)?;
        require_owner(actor, &project)?;
        let applied = g.ledger.approve(milestone_id)?;
        let milestone = g.ledger.get(milestone_id)?.clone();
        if applied {
            self.append(
                &mut g,
                EventKind::MilestoneApproved { milestone_id },
                Some(actor.clone()),
            );
        }
        Ok(milestone)
    }

    /// Webhook entry point: the pitch-level charge settled
    /// (non-milestone pitches). Idempotent.
    pub fn confirm_pitch_payment(
        &self,
        pitch_id: PitchId,
        external_reference: &str,
    ) -> Result<Pitch, EngineError> {
        let agg = self.store.aggregate(pitch_id)?;
        let mut g = lock(&agg);
        if g.pitch.payment_status == PitchPaymentStatus::Paid {
            return Ok(g.pitch.clone());
        }
        g.pitch.payment_status = PitchPaymentStatus::Paid;
        g.pitch.payment_reference = Some(external_reference.to_string());
        let record = self.append(
            &mut g,
            EventKind::PitchPaymentConfirmed {
                reference: external_reference.to_string(),
            },
            None,
        );
        let (pitch, producer) = (g.pitch.clone(), g.pitch.owner);
        drop(g);
        info!(pitch = %pitch_id, "pitch payment confirmed");
        self.deliver(Recipient::User(producer), &record);
        Ok(pitch)
    }

    /// Webhook entry point: the pitch-level charge failed. A retry is
    /// allowed; a straggler failure after settlement is ignored.
    pub fn fail_pitch_payment(
        &self,
        pitch_id: PitchId,
        reason: &str,
    ) -> Result<Pitch, EngineError> {
        let agg = self.store.aggregate(pitch_id)?;
        let mut g = lock(&agg);
        if g.pitch.payment_status == PitchPaymentStatus::Paid {
            return Ok(g.pitch.clone());
        }
        g.pitch.payment_status = PitchPaymentStatus::Failed;
        self.append(
            &mut g,
            EventKind::PitchPaymentFailed {
                reason: reason.to_string(),
            },
            None,
        );
        warn!(pitch = %pitch_id, reason, "pitch payment failed");
        Ok(g.pitch.clone())
    }

    // ── contests ─────────────────────────────────────────────────────

    /// Close contest submissions ahead of the natural deadline.
    /// Owner-only; idempotent.
    pub fn close_submissions_early(
        &self,
        project_id: ProjectId,
        actor: &Actor,
    ) -> Result<Project, EngineError> {
        let project = self.store.project(project_id)?;
        require_owner(actor, &project)?;
        if project.submission_deadline.is_none() {
            return Err(EngineError::Validation(format!(
                "project {project_id} is not a contest"
            )));
        }
        if project.submissions_closed_early {
            return Ok(project);
        }
        let updated = self
            .store
            .update_project(project_id, |p| p.submissions_closed_early = true)?;
        for id in self.store.pitch_ids_of(project_id) {
            let agg = self.store.aggregate(id)?;
            let mut g = lock(&agg);
            self.append(&mut g, EventKind::ContestSubmissionsClosed, Some(actor.clone()));
        }
        info!(project = %project_id, "contest submissions closed early");
        Ok(updated)
    }

    /// Judge a contest: one-shot, irreversible bulk resolution of every
    /// entry into winner, ranked runner-ups, and not-selected.
    pub fn select_contest_winners(
        &self,
        project_id: ProjectId,
        actor: &Actor,
        winner: PitchId,
        runner_ups: &[PitchId],
        notes: Option<String>,
    ) -> Result<ContestResolution, EngineError> {
        let project = self.store.project(project_id)?;
        require_owner(actor, &project)?;
        contest::can_judge(
            &project,
            Timestamp::now(),
            self.store.resolution(project_id).is_some(),
        )?;

        let entries = self.store.pitch_ids_of(project_id);
        if entries.is_empty() {
            return Err(EngineError::Validation(format!(
                "contest {project_id} has no entries"
            )));
        }
        let placements = contest::place_entries(&entries, winner, runner_ups)?;

        let aggs = entries
            .iter()
            .map(|&id| self.store.aggregate(id))
            .collect::<Result<Vec<_>, _>>()?;
        let mut producers = Vec::with_capacity(aggs.len());
        {
            // Entries lock in ascending id order (the store's order).
            let mut guards: Vec<_> = aggs.iter().map(lock).collect();
            if guards
                .iter()
                .any(|g| g.pitch.status != PitchStatus::ContestEntry)
            {
                return Err(EngineError::ContestAlreadyResolved(project_id));
            }
            for (g, (_, placement)) in guards.iter_mut().zip(&placements) {
                g.pitch.status = match placement {
                    mixlane_events::ContestPlacement::Winner => PitchStatus::ContestWinner,
                    mixlane_events::ContestPlacement::RunnerUp { .. } => {
                        PitchStatus::ContestRunnerUp
                    }
                    mixlane_events::ContestPlacement::NotSelected => {
                        PitchStatus::ContestNotSelected
                    }
                };
                let record = self.append(
                    g,
                    EventKind::ContestResolved {
                        placement: *placement,
                    },
                    Some(actor.clone()),
                );
                producers.push((g.pitch.owner, record));
            }
        }

        let resolution = ContestResolution {
            project_id,
            judge: actor.clone(),
            winner,
            runner_ups: runner_ups.to_vec(),
            notes,
            finalized_at: Timestamp::now(),
        };
        self.store.insert_resolution(resolution.clone());
        info!(project = %project_id, %winner, runner_ups = runner_ups.len(), "contest resolved");
        for (producer, record) in &producers {
            self.deliver(Recipient::User(*producer), record);
        }
        Ok(resolution)
    }

    // ── read side ────────────────────────────────────────────────────

    /// The diff between two snapshots of a pitch, lower version first.
    pub fn diff_snapshots(
        &self,
        pitch_id: PitchId,
        a: SnapshotId,
        b: SnapshotId,
    ) -> Result<SnapshotDiff, EngineError> {
        let agg = self.store.aggregate(pitch_id)?;
        let g = lock(&agg);
        let sa = g.snapshots.get(a)?;
        let sb = g.snapshots.get(b)?;
        Ok(if sa.version <= sb.version {
            diff(sa, sb)
        } else {
            diff(sb, sa)
        })
    }

    /// The pitch's full timeline, oldest first.
    pub fn timeline(&self, pitch_id: PitchId) -> Result<Vec<EventRecord>, EngineError> {
        let agg = self.store.aggregate(pitch_id)?;
        let g = lock(&agg);
        Ok(g.log.timeline().to_vec())
    }

    /// A clone of the pitch record.
    pub fn pitch(&self, pitch_id: PitchId) -> Result<Pitch, EngineError> {
        Ok(lock(&self.store.aggregate(pitch_id)?).pitch.clone())
    }

    /// A clone of the project record.
    pub fn project(&self, project_id: ProjectId) -> Result<Project, EngineError> {
        self.store.project(project_id)
    }

    /// The pitch's milestones in payment order.
    pub fn milestones(&self, pitch_id: PitchId) -> Result<Vec<Milestone>, EngineError> {
        Ok(lock(&self.store.aggregate(pitch_id)?).ledger.all().to_vec())
    }

    /// The pitch's snapshots, oldest first.
    pub fn snapshots(&self, pitch_id: PitchId) -> Result<Vec<Snapshot>, EngineError> {
        Ok(lock(&self.store.aggregate(pitch_id)?)
            .snapshots
            .all()
            .to_vec())
    }

    // ── internals ────────────────────────────────────────────────────

    /// Run a transition: authorize, resolve the target status, flip
    /// the status, apply the caller's side effects, notify the
    /// counterparty. The flip happens first so appended events carry
    /// the post-transition status; if `effects` rejects the operation
    /// the status is restored and nothing escapes the lock.
    fn transition<F>(
        &self,
        pitch_id: PitchId,
        actor: &Actor,
        action: PitchAction,
        effects: F,
    ) -> Result<Pitch, EngineError>
    where
        F: FnOnce(&Engine, &mut PitchAggregate, &Actor) -> Result<EventRecord, EngineError>,
    {
        let agg = self.store.aggregate(pitch_id)?;
        let mut g = lock(&agg);
        let project = self.store.project(g.pitch.project_id)?;
        authorize(action, actor.role(), project.mode)?;
        check_identity(actor, &g.pitch, &project)?;
        let from = g.pitch.status;
        let target = transition_target(project.mode, from, action)?;

        g.pitch.status = target;
        let record = match effects(self, &mut g, actor) {
            Ok(record) => record,
            Err(e) => {
                g.pitch.status = from;
                return Err(e);
            }
        };
        let pitch = g.pitch.clone();
        drop(g);

        info!(pitch = %pitch_id, %action, %from, to = %target, "pitch transition");
        self.deliver(counterparty(actor, &pitch, &project), &record);
        Ok(pitch)
    }

    /// Append an event carrying the pitch's current status.
    fn append(
        &self,
        g: &mut PitchAggregate,
        kind: EventKind,
        actor: Option<Actor>,
    ) -> EventRecord {
        let (pitch_id, status) = (g.pitch.id, g.pitch.status);
        g.log.append(pitch_id, kind, status, actor).clone()
    }

    /// Fire-and-forget notification delivery.
    fn deliver(&self, recipient: Recipient, record: &EventRecord) {
        if let Err(e) = self.notifier.notify(&recipient, record) {
            warn!(pitch = %record.pitch_id, event = record.kind.name(), error = %e,
                "notification delivery failed");
        }
    }
}

/// Identity check: the actor's recorded identity must match the pitch
/// or project. Role legality is `authorize`'s job; this is the
/// record-level half.
fn check_identity(actor: &Actor, pitch: &Pitch, project: &Project) -> Result<(), EngineError> {
    match actor {
        Actor::Producer { user } if *user == pitch.owner => Ok(()),
        Actor::Producer { .. } => Err(EngineError::IdentityMismatch {
            role: ActorRole::Producer,
        }),
        Actor::ProjectOwner { user } if *user == project.owner => Ok(()),
        Actor::ProjectOwner { .. } => Err(EngineError::IdentityMismatch {
            role: ActorRole::ProjectOwner,
        }),
        Actor::Client { client } if project.client.as_ref() == Some(client) => Ok(()),
        Actor::Client { .. } => Err(EngineError::IdentityMismatch {
            role: ActorRole::Client,
        }),
    }
}

fn require_producer(actor: &Actor, pitch: &Pitch) -> Result<(), EngineError> {
    match actor {
        Actor::Producer { user } if *user == pitch.owner => Ok(()),
        _ => Err(EngineError::IdentityMismatch {
            role: ActorRole::Producer,
        }),
    }
}

fn require_owner(actor: &Actor, project: &Project) -> Result<(), EngineError> {
    match actor {
        Actor::ProjectOwner { user } if *user == project.owner => Ok(()),
        _ => Err(EngineError::IdentityMismatch {
            role: ActorRole::ProjectOwner,
        }),
    }
}

/// Milestone payments come from the client side: the external client
/// for managed work, the project owner otherwise.
fn require_payer(actor: &Actor, project: &Project) -> Result<(), EngineError> {
    match actor {
        Actor::ProjectOwner { user } if *user == project.owner => Ok(()),
        Actor::Client { client }
            if project.mode == WorkflowMode::ManagedClient
                && project.client.as_ref() == Some(client) =>
        {
            Ok(())
        }
        Actor::Producer { .. } => Err(EngineError::Validation(
            "producers cannot pay their own milestones".into(),
        )),
        _ => Err(EngineError::IdentityMismatch {
            role: ActorRole::ProjectOwner,
        }),
    }
}

/// Who to notify about an action: the other side of the table.
fn counterparty(actor: &Actor, pitch: &Pitch, project: &Project) -> Recipient {
    match actor.role() {
        ActorRole::Producer => Recipient::User(project.owner),
        ActorRole::ProjectOwner | ActorRole::Client => Recipient::User(pitch.owner),
    }
}
