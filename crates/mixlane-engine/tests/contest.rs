//! # Contest Scenarios
//!
//! Entry intake, the frozen entry status, owner-gated early closure,
//! one-shot judging, and the irreversibility guard.

mod common;

use common::*;
use mixlane_core::{Amount, PitchId, Timestamp, UserId};
use mixlane_engine::EngineError;
use mixlane_state::{PitchStatus, StateError};

/// A contest whose submission deadline is still a day away, with three
/// entries. Returns (project id, owner actor, entry ids).
fn contest_with_entries(h: &Harness) -> (mixlane_core::ProjectId, mixlane_core::Actor, Vec<PitchId>) {
    let owner_id = UserId::new();
    let now = Timestamp::now().epoch_secs();
    let submission = Timestamp::from_epoch_secs(now + 86_400).unwrap();
    let judging = Timestamp::from_epoch_secs(now + 7 * 86_400).unwrap();
    let project = h
        .engine
        .create_contest_project(owner_id, Amount::from_dollars(1000), submission, judging)
        .unwrap();
    let entries = (0..3)
        .map(|_| {
            h.engine
                .create_pitch(project.id, UserId::new(), Amount::ZERO)
                .unwrap()
                .id
        })
        .collect();
    (project.id, owner(owner_id), entries)
}

#[test]
fn test_entries_start_frozen() {
    let h = harness();
    let (_, _, entries) = contest_with_entries(&h);
    for id in &entries {
        assert_eq!(h.engine.pitch(*id).unwrap().status, PitchStatus::ContestEntry);
    }

    // Review actions do not exist for contest entries.
    let pitch = h.engine.pitch(entries[0]).unwrap();
    let err = h
        .engine
        .submit_for_review(entries[0], &producer(pitch.owner), None)
        .unwrap_err();
    assert!(matches!(err, EngineError::State(StateError::WrongMode { .. })));
}

#[test]
fn test_judging_waits_for_submission_close() {
    let h = harness();
    let (project, ow, entries) = contest_with_entries(&h);

    let err = h
        .engine
        .select_contest_winners(project, &ow, entries[0], &[entries[1]], None)
        .unwrap_err();
    assert!(matches!(err, EngineError::JudgingNotOpen(_)));

    h.engine.close_submissions_early(project, &ow).unwrap();
    let resolution = h
        .engine
        .select_contest_winners(
            project,
            &ow,
            entries[0],
            &[entries[1]],
            Some("strong hook on the winner".into()),
        )
        .unwrap();

    assert_eq!(h.engine.pitch(entries[0]).unwrap().status, PitchStatus::ContestWinner);
    assert_eq!(
        h.engine.pitch(entries[1]).unwrap().status,
        PitchStatus::ContestRunnerUp
    );
    assert_eq!(
        h.engine.pitch(entries[2]).unwrap().status,
        PitchStatus::ContestNotSelected
    );
    assert_eq!(resolution.winner, entries[0]);
    assert_eq!(resolution.runner_ups, vec![entries[1]]);
    assert_eq!(resolution.notes.as_deref(), Some("strong hook on the winner"));

    // Each entry's timeline carries its resolution.
    for id in &entries {
        assert!(h
            .engine
            .timeline(*id)
            .unwrap()
            .iter()
            .any(|r| r.kind.name() == "contest_resolved"));
    }
}

#[test]
fn test_judging_is_one_shot() {
    let h = harness();
    let (project, ow, entries) = contest_with_entries(&h);
    h.engine.close_submissions_early(project, &ow).unwrap();
    h.engine
        .select_contest_winners(project, &ow, entries[0], &[entries[1]], None)
        .unwrap();

    let err = h
        .engine
        .select_contest_winners(project, &ow, entries[1], &[], None)
        .unwrap_err();
    assert!(matches!(err, EngineError::ContestAlreadyResolved(_)));
}

#[test]
fn test_no_entries_after_closure() {
    let h = harness();
    let (project, ow, _) = contest_with_entries(&h);
    h.engine.close_submissions_early(project, &ow).unwrap();
    // Idempotent re-close.
    h.engine.close_submissions_early(project, &ow).unwrap();

    let err = h
        .engine
        .create_pitch(project, UserId::new(), Amount::ZERO)
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn test_winner_must_be_an_entry_of_this_contest() {
    let h = harness();
    let (project, ow, _) = contest_with_entries(&h);
    h.engine.close_submissions_early(project, &ow).unwrap();

    let err = h
        .engine
        .select_contest_winners(project, &ow, PitchId::new(), &[], None)
        .unwrap_err();
    assert!(matches!(err, EngineError::NotAContestEntry(_)));
}

#[test]
fn test_only_the_owner_judges() {
    let h = harness();
    let (project, ow, entries) = contest_with_entries(&h);
    h.engine.close_submissions_early(project, &ow).unwrap();

    let stranger = owner(UserId::new());
    let err = h
        .engine
        .select_contest_winners(project, &stranger, entries[0], &[], None)
        .unwrap_err();
    assert!(matches!(err, EngineError::IdentityMismatch { .. }));

    let err = h
        .engine
        .close_submissions_early(project, &stranger)
        .unwrap_err();
    assert!(matches!(err, EngineError::IdentityMismatch { .. }));
}

#[test]
fn test_owner_may_cancel_an_entry() {
    let h = harness();
    let (_, ow, entries) = contest_with_entries(&h);
    let closed = h
        .engine
        .close(entries[2], &ow, Some("duplicate entry".into()))
        .unwrap();
    assert_eq!(closed.status, PitchStatus::Closed);
}
