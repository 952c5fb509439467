//! # The Payment Gate
//!
//! `MilestoneLedger` is the per-pitch container of milestones and the
//! single mutation path for their payment state. Callers must hold the
//! pitch's mutual-exclusion boundary while calling into it: two
//! concurrent `begin_payment` calls must not both observe NONE, and the
//! lock is what turns the check-then-set here into a compare-and-set.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mixlane_core::{Amount, MilestoneId, PitchId, Timestamp};

use crate::milestone::{Milestone, MilestonePaymentStatus, MilestoneStatus};

/// An opaque in-flight payment reference issued by the gateway when a
/// charge starts. Held on the milestone so an idempotent re-begin can
/// return the existing charge instead of starting a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentHandle(pub String);

/// Outcome of `begin_payment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentAttempt {
    /// The milestone moved to PROCESSING; the caller must now start the
    /// gateway charge and record its handle.
    Started,
    /// The milestone was already PROCESSING; the existing charge's handle
    /// is returned and no new charge may be started.
    AlreadyProcessing(Option<PaymentHandle>),
}

/// Errors from the milestone ledger and payment gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No milestone with the given id in this ledger.
    #[error("milestone {0} not found")]
    NotFound(MilestoneId),

    /// Payment attempted out of sequence.
    #[error("milestone {attempted} is not next payable; pay {next_payable:?} first")]
    PaymentSequence {
        /// The milestone the caller tried to pay.
        attempted: MilestoneId,
        /// The milestone that must settle first, if any remains.
        next_payable: Option<MilestoneId>,
    },

    /// Another milestone of this pitch is already PROCESSING.
    #[error("a payment is already in progress for milestone {processing}")]
    PaymentInProgress {
        /// The milestone currently in flight.
        processing: MilestoneId,
    },

    /// The milestone is already paid.
    #[error("milestone {0} is already paid")]
    AlreadyPaid(MilestoneId),

    /// Zero-amount milestones never enter the gate; use `approve`.
    #[error("milestone {0} has zero amount; approve it instead of paying")]
    ZeroAmount(MilestoneId),

    /// `approve` is only for zero-amount milestones.
    #[error("milestone {0} has a payable amount; it settles through payment")]
    NotZeroAmount(MilestoneId),
}

/// The ordered milestone ledger of one pitch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilestoneLedger {
    milestones: Vec<Milestone>,
}

impl MilestoneLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a milestone at the end of the payment sequence.
    pub fn add(&mut self, pitch_id: PitchId, name: impl Into<String>, amount: Amount) -> &Milestone {
        let sort_order = self
            .milestones
            .iter()
            .map(|m| m.sort_order)
            .max()
            .unwrap_or(0)
            + 1;
        let idx = self.milestones.len();
        self.milestones.push(Milestone {
            id: MilestoneId::new(),
            pitch_id,
            name: name.into(),
            amount,
            sort_order,
            status: MilestoneStatus::Pending,
            payment_status: MilestonePaymentStatus::None,
            payment_completed_at: None,
            payment_reference: None,
            created_at: Timestamp::now(),
        });
        &self.milestones[idx]
    }

    /// Append a gate-generated milestone for a paid revision round.
    pub fn add_revision_milestone(
        &mut self,
        pitch_id: PitchId,
        round: u32,
        fee: Amount,
    ) -> &Milestone {
        self.add(pitch_id, format!("Additional revision round {round}"), fee)
    }

    /// Look up a milestone by id.
    pub fn get(&self, id: MilestoneId) -> Result<&Milestone, LedgerError> {
        self.milestones
            .iter()
            .find(|m| m.id == id)
            .ok_or(LedgerError::NotFound(id))
    }

    /// The next payable milestone: lowest `sort_order` among those not
    /// settled and not currently PROCESSING.
    pub fn next_payable(&self) -> Option<&Milestone> {
        self.milestones
            .iter()
            .filter(|m| {
                !m.is_settled() && m.payment_status != MilestonePaymentStatus::Processing
            })
            .min_by_key(|m| m.sort_order)
    }

    /// The milestone currently PROCESSING, if any.
    pub fn processing(&self) -> Option<&Milestone> {
        self.milestones
            .iter()
            .find(|m| m.payment_status == MilestonePaymentStatus::Processing)
    }

    /// Begin payment of a milestone.
    ///
    /// Preconditions: the milestone is `next_payable`, its payment status
    /// is NONE, and its amount is positive. Calling again while the same
    /// milestone is PROCESSING is a no-op returning the existing handle —
    /// a duplicate charge is never started.
    pub fn begin_payment(&mut self, id: MilestoneId) -> Result<PaymentAttempt, LedgerError> {
        let milestone = self.get(id)?;

        if milestone.amount.is_zero() {
            return Err(LedgerError::ZeroAmount(id));
        }
        match milestone.payment_status {
            MilestonePaymentStatus::Paid => return Err(LedgerError::AlreadyPaid(id)),
            MilestonePaymentStatus::Processing => {
                let handle = milestone
                    .payment_reference
                    .clone()
                    .map(PaymentHandle);
                return Ok(PaymentAttempt::AlreadyProcessing(handle));
            }
            MilestonePaymentStatus::None => {}
        }
        if let Some(processing) = self.processing() {
            return Err(LedgerError::PaymentInProgress {
                processing: processing.id,
            });
        }
        match self.next_payable() {
            Some(next) if next.id == id => {}
            next => {
                return Err(LedgerError::PaymentSequence {
                    attempted: id,
                    next_payable: next.map(|m| m.id),
                })
            }
        }

        let milestone = self.get_mut(id)?;
        milestone.payment_status = MilestonePaymentStatus::Processing;
        Ok(PaymentAttempt::Started)
    }

    /// Record the gateway's handle for an in-flight charge.
    pub fn record_handle(
        &mut self,
        id: MilestoneId,
        handle: PaymentHandle,
    ) -> Result<(), LedgerError> {
        let milestone = self.get_mut(id)?;
        milestone.payment_reference = Some(handle.0);
        Ok(())
    }

    /// Confirm payment of a milestone (webhook entry point).
    ///
    /// Idempotent: if already PAID, returns `Ok(false)` without
    /// re-applying, so the caller does not double-append completion
    /// events. Otherwise the milestone becomes PAID and APPROVED with a
    /// completion timestamp, and `Ok(true)` is returned.
    pub fn confirm_payment(
        &mut self,
        id: MilestoneId,
        external_reference: impl Into<String>,
    ) -> Result<bool, LedgerError> {
        let milestone = self.get_mut(id)?;
        if milestone.payment_status == MilestonePaymentStatus::Paid {
            return Ok(false);
        }
        milestone.payment_status = MilestonePaymentStatus::Paid;
        milestone.status = MilestoneStatus::Approved;
        milestone.payment_completed_at = Some(Timestamp::now());
        milestone.payment_reference = Some(external_reference.into());
        Ok(true)
    }

    /// Record a failed charge (webhook entry point).
    ///
    /// Returns the milestone to NONE — payable again, not a dead-end.
    /// A late failure for an already-paid milestone is ignored
    /// (`Ok(false)`); settled money does not unsettle on a straggler
    /// webhook.
    pub fn fail_payment(&mut self, id: MilestoneId) -> Result<bool, LedgerError> {
        let milestone = self.get_mut(id)?;
        match milestone.payment_status {
            MilestonePaymentStatus::Paid | MilestonePaymentStatus::None => Ok(false),
            MilestonePaymentStatus::Processing => {
                milestone.payment_status = MilestonePaymentStatus::None;
                milestone.payment_reference = None;
                Ok(true)
            }
        }
    }

    /// Approve a zero-amount milestone directly, bypassing the gate.
    ///
    /// Idempotent: re-approving returns `Ok(false)`.
    pub fn approve(&mut self, id: MilestoneId) -> Result<bool, LedgerError> {
        let milestone = self.get_mut(id)?;
        if !milestone.amount.is_zero() {
            return Err(LedgerError::NotZeroAmount(id));
        }
        if milestone.status == MilestoneStatus::Approved {
            return Ok(false);
        }
        milestone.status = MilestoneStatus::Approved;
        Ok(true)
    }

    /// Whether every milestone is settled (paid, or zero-amount and
    /// approved). Vacuously true for an empty ledger.
    pub fn all_settled(&self) -> bool {
        self.milestones.iter().all(Milestone::is_settled)
    }

    /// The first unsettled milestone in payment order, for completion
    /// error reporting.
    pub fn first_unsettled(&self) -> Option<&Milestone> {
        self.milestones
            .iter()
            .filter(|m| !m.is_settled())
            .min_by_key(|m| m.sort_order)
    }

    /// All milestones in payment order.
    pub fn all(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Whether the ledger has any milestones.
    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    fn get_mut(&mut self, id: MilestoneId) -> Result<&mut Milestone, LedgerError> {
        self.milestones
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(LedgerError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(amounts: &[u64]) -> (MilestoneLedger, Vec<MilestoneId>) {
        let pitch = PitchId::new();
        let mut ledger = MilestoneLedger::new();
        let ids = amounts
            .iter()
            .enumerate()
            .map(|(i, &cents)| {
                ledger
                    .add(pitch, format!("Milestone {}", i + 1), Amount::from_cents(cents))
                    .id
            })
            .collect();
        (ledger, ids)
    }

    // ── sequencing ───────────────────────────────────────────────────

    #[test]
    fn test_sort_order_is_unique_and_ascending() {
        let (ledger, _) = ledger_with(&[100, 200, 300]);
        let orders: Vec<u32> = ledger.all().iter().map(|m| m.sort_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_next_payable_is_lowest_unsettled() {
        let (mut ledger, ids) = ledger_with(&[5000, 10000]);
        assert_eq!(ledger.next_payable().unwrap().id, ids[0]);
        ledger.begin_payment(ids[0]).unwrap();
        ledger.confirm_payment(ids[0], "ch_1").unwrap();
        assert_eq!(ledger.next_payable().unwrap().id, ids[1]);
    }

    #[test]
    fn test_out_of_sequence_payment_rejected_and_no_mutation() {
        let (mut ledger, ids) = ledger_with(&[5000, 10000]);
        let err = ledger.begin_payment(ids[1]).unwrap_err();
        assert_eq!(
            err,
            LedgerError::PaymentSequence {
                attempted: ids[1],
                next_payable: Some(ids[0]),
            }
        );
        // Nothing moved.
        assert!(ledger
            .all()
            .iter()
            .all(|m| m.payment_status == MilestonePaymentStatus::None));
    }

    #[test]
    fn test_second_milestone_payable_after_first_paid() {
        let (mut ledger, ids) = ledger_with(&[5000, 10000]);
        ledger.begin_payment(ids[0]).unwrap();
        ledger.confirm_payment(ids[0], "ch_1").unwrap();
        assert_eq!(ledger.begin_payment(ids[1]).unwrap(), PaymentAttempt::Started);
        ledger.confirm_payment(ids[1], "ch_2").unwrap();
        assert!(ledger.all_settled());
    }

    #[test]
    fn test_zero_amount_milestone_does_not_block_sequence() {
        let (mut ledger, ids) = ledger_with(&[0, 10000]);
        ledger.approve(ids[0]).unwrap();
        // The zero-amount milestone is settled; the paid one is next.
        assert_eq!(ledger.next_payable().unwrap().id, ids[1]);
        assert_eq!(ledger.begin_payment(ids[1]).unwrap(), PaymentAttempt::Started);
    }

    // ── at-most-one-processing ───────────────────────────────────────

    #[test]
    fn test_at_most_one_processing() {
        let (mut ledger, ids) = ledger_with(&[5000, 10000]);
        ledger.begin_payment(ids[0]).unwrap();
        let err = ledger.begin_payment(ids[1]).unwrap_err();
        assert_eq!(err, LedgerError::PaymentInProgress { processing: ids[0] });
        let processing: Vec<_> = ledger
            .all()
            .iter()
            .filter(|m| m.payment_status == MilestonePaymentStatus::Processing)
            .collect();
        assert_eq!(processing.len(), 1);
    }

    #[test]
    fn test_begin_is_idempotent_while_processing() {
        let (mut ledger, ids) = ledger_with(&[5000]);
        assert_eq!(ledger.begin_payment(ids[0]).unwrap(), PaymentAttempt::Started);
        ledger
            .record_handle(ids[0], PaymentHandle("ch_inflight".into()))
            .unwrap();
        let again = ledger.begin_payment(ids[0]).unwrap();
        assert_eq!(
            again,
            PaymentAttempt::AlreadyProcessing(Some(PaymentHandle("ch_inflight".into())))
        );
    }

    // ── confirm / fail idempotency ───────────────────────────────────

    #[test]
    fn test_confirm_is_idempotent() {
        let (mut ledger, ids) = ledger_with(&[5000]);
        ledger.begin_payment(ids[0]).unwrap();
        assert!(ledger.confirm_payment(ids[0], "ch_1").unwrap());
        let first_completed_at = ledger.get(ids[0]).unwrap().payment_completed_at;
        assert!(!ledger.confirm_payment(ids[0], "ch_1_dup").unwrap());
        let m = ledger.get(ids[0]).unwrap();
        assert_eq!(m.payment_completed_at, first_completed_at);
        assert_eq!(m.payment_reference.as_deref(), Some("ch_1"));
    }

    #[test]
    fn test_confirm_sets_paid_and_approved() {
        let (mut ledger, ids) = ledger_with(&[5000]);
        ledger.begin_payment(ids[0]).unwrap();
        ledger.confirm_payment(ids[0], "ch_1").unwrap();
        let m = ledger.get(ids[0]).unwrap();
        assert_eq!(m.payment_status, MilestonePaymentStatus::Paid);
        assert_eq!(m.status, MilestoneStatus::Approved);
        assert!(m.payment_completed_at.is_some());
    }

    #[test]
    fn test_fail_returns_to_payable() {
        let (mut ledger, ids) = ledger_with(&[5000]);
        ledger.begin_payment(ids[0]).unwrap();
        assert!(ledger.fail_payment(ids[0]).unwrap());
        let m = ledger.get(ids[0]).unwrap();
        assert_eq!(m.payment_status, MilestonePaymentStatus::None);
        // Retry succeeds.
        assert_eq!(ledger.begin_payment(ids[0]).unwrap(), PaymentAttempt::Started);
    }

    #[test]
    fn test_late_fail_after_paid_is_ignored() {
        let (mut ledger, ids) = ledger_with(&[5000]);
        ledger.begin_payment(ids[0]).unwrap();
        ledger.confirm_payment(ids[0], "ch_1").unwrap();
        assert!(!ledger.fail_payment(ids[0]).unwrap());
        assert_eq!(
            ledger.get(ids[0]).unwrap().payment_status,
            MilestonePaymentStatus::Paid
        );
    }

    #[test]
    fn test_begin_after_paid_rejected() {
        let (mut ledger, ids) = ledger_with(&[5000]);
        ledger.begin_payment(ids[0]).unwrap();
        ledger.confirm_payment(ids[0], "ch_1").unwrap();
        assert_eq!(
            ledger.begin_payment(ids[0]).unwrap_err(),
            LedgerError::AlreadyPaid(ids[0])
        );
    }

    // ── zero-amount bypass ───────────────────────────────────────────

    #[test]
    fn test_zero_amount_cannot_enter_gate() {
        let (mut ledger, ids) = ledger_with(&[0]);
        assert_eq!(
            ledger.begin_payment(ids[0]).unwrap_err(),
            LedgerError::ZeroAmount(ids[0])
        );
    }

    #[test]
    fn test_approve_zero_amount() {
        let (mut ledger, ids) = ledger_with(&[0]);
        assert!(ledger.approve(ids[0]).unwrap());
        let m = ledger.get(ids[0]).unwrap();
        assert_eq!(m.status, MilestoneStatus::Approved);
        assert_eq!(m.payment_status, MilestonePaymentStatus::None);
        assert!(m.is_settled());
        // Idempotent.
        assert!(!ledger.approve(ids[0]).unwrap());
    }

    #[test]
    fn test_approve_payable_milestone_rejected() {
        let (mut ledger, ids) = ledger_with(&[5000]);
        assert_eq!(
            ledger.approve(ids[0]).unwrap_err(),
            LedgerError::NotZeroAmount(ids[0])
        );
    }

    // ── settlement ───────────────────────────────────────────────────

    #[test]
    fn test_all_settled_mixed_ledger() {
        let (mut ledger, ids) = ledger_with(&[5000, 0, 10000]);
        assert!(!ledger.all_settled());
        ledger.begin_payment(ids[0]).unwrap();
        ledger.confirm_payment(ids[0], "ch_1").unwrap();
        ledger.approve(ids[1]).unwrap();
        assert!(!ledger.all_settled());
        assert_eq!(ledger.first_unsettled().unwrap().id, ids[2]);
        ledger.begin_payment(ids[2]).unwrap();
        ledger.confirm_payment(ids[2], "ch_2").unwrap();
        assert!(ledger.all_settled());
        assert!(ledger.first_unsettled().is_none());
    }

    #[test]
    fn test_empty_ledger_is_settled() {
        let ledger = MilestoneLedger::new();
        assert!(ledger.all_settled());
    }

    #[test]
    fn test_revision_milestone_appends_to_sequence() {
        let (mut ledger, _) = ledger_with(&[5000]);
        let pitch = ledger.all()[0].pitch_id;
        let m = ledger.add_revision_milestone(pitch, 3, Amount::from_cents(2500));
        assert_eq!(m.name, "Additional revision round 3");
        assert_eq!(m.sort_order, 2);
    }

    #[test]
    fn test_serde_roundtrip() {
        let (ledger, _) = ledger_with(&[5000, 0]);
        let json = serde_json::to_string(&ledger).unwrap();
        let parsed: MilestoneLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.all().len(), 2);
    }
}
