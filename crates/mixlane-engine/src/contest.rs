//! # The Contest Resolver
//!
//! Judging is a one-shot bulk transition: every entry of the contest is
//! placed in the same operation, and once a resolution is recorded no
//! second judging pass is possible. The placement computation is a pure
//! function here; the engine applies it to the records under lock.

use serde::{Deserialize, Serialize};

use mixlane_core::{Actor, PitchId, ProjectId, Timestamp};
use mixlane_events::ContestPlacement;
use mixlane_state::Project;

use crate::error::EngineError;

/// The recorded outcome of judging one contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestResolution {
    /// The judged contest.
    pub project_id: ProjectId,
    /// Who judged (always the project owner).
    pub judge: Actor,
    /// The winning entry.
    pub winner: PitchId,
    /// Runner-ups in rank order (rank 1 first).
    pub runner_ups: Vec<PitchId>,
    /// Optional judging notes.
    pub notes: Option<String>,
    /// When judging finalized.
    pub finalized_at: Timestamp,
}

/// Check whether judging may run right now.
///
/// Requires a contest project whose submissions are closed (deadline
/// passed, or closed early by the owner) and no recorded resolution.
pub fn can_judge(project: &Project, now: Timestamp, resolved: bool) -> Result<(), EngineError> {
    if project.submission_deadline.is_none() {
        return Err(EngineError::Validation(format!(
            "project {} is not a contest",
            project.id
        )));
    }
    if resolved {
        return Err(EngineError::ContestAlreadyResolved(project.id));
    }
    if !project.submissions_closed(now) {
        return Err(EngineError::JudgingNotOpen(project.id));
    }
    Ok(())
}

/// Compute the placement of every entry.
///
/// `entries` is the full entry list; the winner and each runner-up must
/// be entries, and no pitch may be selected twice. Every entry appears
/// exactly once in the result: the winner, runner-ups ranked from 1 in
/// the order given, and all remaining entries not selected.
pub fn place_entries(
    entries: &[PitchId],
    winner: PitchId,
    runner_ups: &[PitchId],
) -> Result<Vec<(PitchId, ContestPlacement)>, EngineError> {
    if !entries.contains(&winner) {
        return Err(EngineError::NotAContestEntry(winner));
    }
    for id in runner_ups {
        if !entries.contains(id) {
            return Err(EngineError::NotAContestEntry(*id));
        }
        if *id == winner {
            return Err(EngineError::Validation(format!(
                "pitch {id} cannot be both winner and runner-up"
            )));
        }
    }
    for (i, id) in runner_ups.iter().enumerate() {
        if runner_ups[..i].contains(id) {
            return Err(EngineError::Validation(format!(
                "pitch {id} appears twice in the runner-up list"
            )));
        }
    }

    let placements = entries
        .iter()
        .map(|&id| {
            let placement = if id == winner {
                ContestPlacement::Winner
            } else if let Some(pos) = runner_ups.iter().position(|&r| r == id) {
                ContestPlacement::RunnerUp {
                    rank: pos as u32 + 1,
                }
            } else {
                ContestPlacement::NotSelected
            };
            (id, placement)
        })
        .collect();
    Ok(placements)
}
