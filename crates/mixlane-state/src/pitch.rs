//! # The Pitch Record
//!
//! A pitch is one unit of submitted work moving through the state
//! machine. The record itself is deliberately dumb: the transition table
//! decides what may happen, the engine applies it, and the ledger crate
//! owns milestone payment state. What lives here is only the pitch-level
//! payment state used by non-milestone pitches.

use serde::{Deserialize, Serialize};

use mixlane_core::{Amount, PitchId, ProjectId, Timestamp, UserId, WorkflowMode};

use crate::status::PitchStatus;

/// Payment state of a pitch that settles as a single charge (no
/// milestones).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PitchPaymentStatus {
    /// No payment has been initiated.
    None,
    /// Payment is expected but not yet started.
    Pending,
    /// A charge is in flight at the gateway.
    Processing,
    /// Payment settled.
    Paid,
    /// The last charge attempt failed; a retry is allowed.
    Failed,
}

/// A unit of submitted work tracked through the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pitch {
    /// Unique pitch identifier.
    pub id: PitchId,
    /// The project this pitch belongs to.
    pub project_id: ProjectId,
    /// The producer who owns this pitch.
    pub owner: UserId,
    /// Current lifecycle status.
    pub status: PitchStatus,
    /// Total amount payable for this pitch.
    pub payment_amount: Amount,
    /// Pitch-level payment state (single-charge pitches only; milestone
    /// pitches settle through the ledger instead).
    pub payment_status: PitchPaymentStatus,
    /// External payment reference once a charge settles.
    pub payment_reference: Option<String>,
    /// How many client revision rounds have been requested so far.
    pub revision_rounds_used: u32,
    /// When the pitch was created.
    pub created_at: Timestamp,
}

impl Pitch {
    /// Create a new pitch in the initial status for the project's mode.
    pub fn new(project_id: ProjectId, owner: UserId, mode: WorkflowMode, amount: Amount) -> Self {
        Self {
            id: PitchId::new(),
            project_id,
            owner,
            status: PitchStatus::initial_for(mode),
            payment_amount: amount,
            payment_status: PitchPaymentStatus::None,
            payment_reference: None,
            revision_rounds_used: 0,
            created_at: Timestamp::now(),
        }
    }

    /// Whether the pitch has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether this pitch's own payment obligation is settled
    /// (paid, or nothing to charge). Milestone pitches are settled
    /// through the ledger and never consult this.
    pub fn payment_settled(&self) -> bool {
        self.payment_amount.is_zero() || self.payment_status == PitchPaymentStatus::Paid
    }
}
