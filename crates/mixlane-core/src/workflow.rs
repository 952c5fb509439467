//! # Workflow Modes
//!
//! The four workflow modes a project can run in. The set is closed and
//! hand-enumerated — this engine is not a generic workflow DSL. A
//! project's mode is fixed at creation and governs which state
//! transitions are legal and how many pitches the project may carry.

use serde::{Deserialize, Serialize};

/// The workflow mode of a project. Immutable after project creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowMode {
    /// Open marketplace: any producer may pitch; many pitches per project.
    Open,
    /// Invite-only: one named producer, who must accept before work starts.
    Invite,
    /// Competition: many entries, resolved in one judging pass.
    Contest,
    /// Managed client: one producer works for an external client reviewer.
    ManagedClient,
}

impl WorkflowMode {
    /// Whether the project may carry more than one pitch.
    pub fn allows_multiple_pitches(&self) -> bool {
        matches!(self, Self::Open | Self::Contest)
    }

    /// Whether reviews come from the external client portal rather than
    /// the project owner.
    pub fn client_reviewed(&self) -> bool {
        matches!(self, Self::ManagedClient)
    }
}

impl std::fmt::Display for WorkflowMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "OPEN",
            Self::Invite => "INVITE",
            Self::Contest => "CONTEST",
            Self::ManagedClient => "MANAGED_CLIENT",
        };
        f.write_str(s)
    }
}
