//! # The In-Memory Store & Mutual-Exclusion Boundary
//!
//! Each pitch lives behind its own `Mutex` as one aggregate: the pitch
//! record, its working file set, its snapshots, its milestone ledger,
//! and its event log. An operation locks the aggregate, validates,
//! mutates everything as one unit, and unlocks — which is what makes a
//! transition atomic and keeps two concurrent submits from both
//! observing the same maximum snapshot version.
//!
//! Bulk contest resolution locks every entry of a project; entries are
//! always locked in ascending `PitchId` order so two concurrent bulk
//! operations cannot deadlock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use mixlane_events::EventLog;
use mixlane_ledger::MilestoneLedger;
use mixlane_snapshot::{FileRef, SnapshotSet};
use mixlane_state::{Pitch, Project};

use mixlane_core::{PitchId, ProjectId};

use crate::contest::ContestResolution;
use crate::error::EngineError;

/// Everything mutable that belongs to one pitch, guarded together.
#[derive(Debug)]
pub struct PitchAggregate {
    /// The pitch record.
    pub pitch: Pitch,
    /// The working file set: files attached but owned by no snapshot
    /// yet. Submit-for-review freezes a copy of this set.
    pub files: Vec<FileRef>,
    /// All snapshots of this pitch.
    pub snapshots: SnapshotSet,
    /// The milestone ledger of this pitch.
    pub ledger: MilestoneLedger,
    /// The append-only event log of this pitch.
    pub log: EventLog,
}

impl PitchAggregate {
    /// Wrap a fresh pitch with empty collections.
    pub fn new(pitch: Pitch) -> Self {
        Self {
            pitch,
            files: Vec::new(),
            snapshots: SnapshotSet::new(),
            ledger: MilestoneLedger::new(),
            log: EventLog::new(),
        }
    }

    /// Total bytes in the working file set.
    pub fn stored_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }
}

/// Shared handle to one pitch's aggregate.
pub type SharedAggregate = Arc<Mutex<PitchAggregate>>;

/// The engine's in-memory record store.
///
/// The outer maps are read-mostly (`RwLock`); per-pitch mutation happens
/// under the aggregate's own `Mutex`, never under a map lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    projects: RwLock<HashMap<ProjectId, Project>>,
    pitches: RwLock<HashMap<PitchId, SharedAggregate>>,
    by_project: RwLock<HashMap<ProjectId, Vec<PitchId>>>,
    resolutions: RwLock<HashMap<ProjectId, ContestResolution>>,
}

/// Lock an aggregate, recovering from a poisoned mutex.
///
/// A panic inside a critical section leaves only request-local state
/// suspect; the aggregate itself is validated on every operation, so
/// continuing with the inner value is safe.
pub fn lock(agg: &SharedAggregate) -> MutexGuard<'_, PitchAggregate> {
    agg.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new project.
    pub fn insert_project(&self, project: Project) {
        let mut projects = self.projects.write().unwrap_or_else(PoisonError::into_inner);
        let mut by_project = self
            .by_project
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        by_project.entry(project.id).or_default();
        projects.insert(project.id, project);
    }

    /// A clone of the project record.
    pub fn project(&self, id: ProjectId) -> Result<Project, EngineError> {
        self.projects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(EngineError::ProjectNotFound(id))
    }

    /// Mutate a project record in place.
    pub fn update_project(
        &self,
        id: ProjectId,
        f: impl FnOnce(&mut Project),
    ) -> Result<Project, EngineError> {
        let mut projects = self.projects.write().unwrap_or_else(PoisonError::into_inner);
        let project = projects.get_mut(&id).ok_or(EngineError::ProjectNotFound(id))?;
        f(project);
        Ok(project.clone())
    }

    /// Register a new pitch under its project, enforcing the one-pitch
    /// cardinality for modes that require it.
    ///
    /// The project index's write lock spans check and insert, so two
    /// concurrent creations against a single-pitch project cannot both
    /// pass the check.
    pub fn register_pitch(&self, pitch: Pitch) -> Result<SharedAggregate, EngineError> {
        let project = self.project(pitch.project_id)?;
        let mut by_project = self
            .by_project
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let ids = by_project.entry(project.id).or_default();
        if !project.mode.allows_multiple_pitches() && !ids.is_empty() {
            return Err(EngineError::Validation(format!(
                "project {} already has its pitch; {} projects allow exactly one",
                project.id, project.mode
            )));
        }
        let id = pitch.id;
        ids.push(id);
        let agg: SharedAggregate = Arc::new(Mutex::new(PitchAggregate::new(pitch)));
        self.pitches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&agg));
        Ok(agg)
    }

    /// The shared aggregate of a pitch.
    pub fn aggregate(&self, id: PitchId) -> Result<SharedAggregate, EngineError> {
        self.pitches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(EngineError::PitchNotFound(id))
    }

    /// All pitch ids of a project, in ascending id order (the bulk lock
    /// order).
    pub fn pitch_ids_of(&self, project: ProjectId) -> Vec<PitchId> {
        let mut ids = self
            .by_project
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&project)
            .cloned()
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// The recorded contest resolution of a project, if judging has
    /// finalized.
    pub fn resolution(&self, project: ProjectId) -> Option<ContestResolution> {
        self.resolutions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&project)
            .cloned()
    }

    /// Record a finalized contest resolution.
    pub fn insert_resolution(&self, resolution: ContestResolution) {
        self.resolutions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(resolution.project_id, resolution);
    }
}
