//! # The Append-Only Log
//!
//! `EventLog` exposes append and read operations only. There is no way
//! to update or delete a record through this API, and the engine never
//! holds a `&mut EventRecord`.

use serde::{Deserialize, Serialize};

use mixlane_core::{Actor, EventId, PitchId, Timestamp};
use mixlane_state::PitchStatus;

use crate::kind::EventKind;

/// One appended audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique event identifier.
    pub id: EventId,
    /// The pitch this event belongs to.
    pub pitch_id: PitchId,
    /// What happened.
    pub kind: EventKind,
    /// The pitch's status at the time of the event.
    pub status: PitchStatus,
    /// Who acted. `None` for gateway webhooks and other system actions.
    pub actor: Option<Actor>,
    /// When the event was appended.
    pub created_at: Timestamp,
}

/// The append-only event log of one pitch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record. Returns a reference to the appended record.
    pub fn append(
        &mut self,
        pitch_id: PitchId,
        kind: EventKind,
        status: PitchStatus,
        actor: Option<Actor>,
    ) -> &EventRecord {
        let idx = self.records.len();
        self.records.push(EventRecord {
            id: EventId::new(),
            pitch_id,
            kind,
            status,
            actor,
            created_at: Timestamp::now(),
        });
        &self.records[idx]
    }

    /// All records, oldest first. This is the timeline both producer and
    /// client see.
    pub fn timeline(&self) -> &[EventRecord] {
        &self.records
    }

    /// The most recent record, if any.
    pub fn latest(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// When the most recent submission was received, if any.
    ///
    /// The resubmission-eligibility rule compares file upload times
    /// against this instant.
    pub fn last_submission_at(&self) -> Option<Timestamp> {
        self.records
            .iter()
            .rev()
            .find(|r| matches!(r.kind, EventKind::SubmissionReceived { .. }))
            .map(|r| r.created_at)
    }

    /// Number of records matching a predicate (test and display helper).
    pub fn count_matching(&self, predicate: impl Fn(&EventKind) -> bool) -> usize {
        self.records.iter().filter(|r| predicate(&r.kind)).count()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixlane_core::SnapshotId;

    fn log_with_submission() -> (EventLog, PitchId) {
        let pitch = PitchId::new();
        let mut log = EventLog::new();
        log.append(pitch, EventKind::PitchCreated, PitchStatus::Pending, None);
        log.append(
            pitch,
            EventKind::SubmissionReceived {
                snapshot_id: SnapshotId::new(),
                version: 1,
            },
            PitchStatus::ReadyForReview,
            None,
        );
        (log, pitch)
    }

    #[test]
    fn test_append_preserves_order() {
        let (log, _) = log_with_submission();
        assert_eq!(log.len(), 2);
        assert_eq!(log.timeline()[0].kind.name(), "pitch_created");
        assert_eq!(log.timeline()[1].kind.name(), "submission_received");
    }

    #[test]
    fn test_records_carry_status_snapshot() {
        let (log, _) = log_with_submission();
        assert_eq!(log.timeline()[0].status, PitchStatus::Pending);
        assert_eq!(log.timeline()[1].status, PitchStatus::ReadyForReview);
    }

    #[test]
    fn test_last_submission_at_finds_most_recent() {
        let (mut log, pitch) = log_with_submission();
        assert!(log.last_submission_at().is_some());
        let first = log.last_submission_at().unwrap();
        log.append(
            pitch,
            EventKind::SubmissionReceived {
                snapshot_id: SnapshotId::new(),
                version: 2,
            },
            PitchStatus::ReadyForReview,
            None,
        );
        assert!(log.last_submission_at().unwrap() >= first);
    }

    #[test]
    fn test_last_submission_at_none_without_submission() {
        let log = EventLog::new();
        assert!(log.last_submission_at().is_none());
    }

    #[test]
    fn test_count_matching() {
        let (log, _) = log_with_submission();
        let submissions =
            log.count_matching(|k| matches!(k, EventKind::SubmissionReceived { .. }));
        assert_eq!(submissions, 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let (log, _) = log_with_submission();
        let json = serde_json::to_string(&log).unwrap();
        let parsed: EventLog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
    }
}
