//! # The Milestone Record
//!
//! A milestone is one independently payable checkpoint within a pitch.
//! Records are only ever mutated through [`MilestoneLedger`] — the gate
//! owns the sequencing and at-most-one-PROCESSING invariants, and no
//! other code path touches payment state.
//!
//! [`MilestoneLedger`]: crate::gate::MilestoneLedger

use serde::{Deserialize, Serialize};

use mixlane_core::{Amount, MilestoneId, PitchId, Timestamp};

/// Approval status of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestoneStatus {
    /// Not yet approved.
    Pending,
    /// Approved — by settling payment, or directly for zero-amount work.
    Approved,
}

/// Payment state of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MilestonePaymentStatus {
    /// Payable (or failed and payable again).
    None,
    /// A charge is in flight at the gateway.
    Processing,
    /// Settled.
    Paid,
}

/// One payable checkpoint within a pitch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    /// Unique milestone identifier.
    pub id: MilestoneId,
    /// The pitch this milestone belongs to.
    pub pitch_id: PitchId,
    /// Display name ("Deposit", "Final delivery", …).
    pub name: String,
    /// Amount payable. Zero-amount milestones never enter the gate.
    pub amount: Amount,
    /// Payment sequence position; unique per pitch, ascending.
    pub sort_order: u32,
    /// Approval status.
    pub status: MilestoneStatus,
    /// Payment state, mutated only by the gate.
    pub payment_status: MilestonePaymentStatus,
    /// When payment settled.
    pub payment_completed_at: Option<Timestamp>,
    /// The gateway's reference for the settled charge.
    pub payment_reference: Option<String>,
    /// When the milestone was created.
    pub created_at: Timestamp,
}

impl Milestone {
    /// Whether this milestone's payment obligation is settled:
    /// paid, or approved with nothing to charge.
    pub fn is_settled(&self) -> bool {
        self.payment_status == MilestonePaymentStatus::Paid
            || (self.amount.is_zero() && self.status == MilestoneStatus::Approved)
    }
}
