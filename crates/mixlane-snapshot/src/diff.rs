//! # Snapshot Diff
//!
//! A pure function over the file sets of two snapshots, partitioning
//! file identities into four disjoint groups:
//!
//! - **Added** — present in the newer snapshot, absent in the older.
//! - **Removed** — present in the older, absent in the newer.
//! - **Modified** — present in both, but name or size differs.
//! - **Unchanged** — present in both, identical name and size.
//!
//! File *identity* is the `FileId`; two files with equal content but
//! different ids are different files as far as the diff is concerned.
//! The caller passes the lower-versioned snapshot first; swapping the
//! operands swaps Added and Removed exactly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mixlane_core::FileId;

use crate::snapshot::{FileRef, Snapshot};

/// The result of diffing an older snapshot against a newer one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    /// Files present only in the newer snapshot.
    pub added: Vec<FileRef>,
    /// Files present only in the older snapshot.
    pub removed: Vec<FileRef>,
    /// Files present in both whose name or size differs; the newer
    /// snapshot's version of the file is reported.
    pub modified: Vec<FileRef>,
    /// Files present in both, unchanged.
    pub unchanged: Vec<FileRef>,
}

impl SnapshotDiff {
    /// Whether the two snapshots carry identical file sets.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Diff the file sets of `older` against `newer`.
///
/// Pure and order-independent: the result depends only on the two file
/// sets, sorted by file id for determinism.
pub fn diff(older: &Snapshot, newer: &Snapshot) -> SnapshotDiff {
    let old_files: BTreeMap<FileId, &FileRef> = older.files.iter().map(|f| (f.id, f)).collect();
    let new_files: BTreeMap<FileId, &FileRef> = newer.files.iter().map(|f| (f.id, f)).collect();

    let mut result = SnapshotDiff::default();

    for (id, new_file) in &new_files {
        match old_files.get(id) {
            None => result.added.push((*new_file).clone()),
            Some(old_file) => {
                if old_file.name != new_file.name || old_file.size_bytes != new_file.size_bytes {
                    result.modified.push((*new_file).clone());
                } else {
                    result.unchanged.push((*new_file).clone());
                }
            }
        }
    }
    for (id, old_file) in &old_files {
        if !new_files.contains_key(id) {
            result.removed.push((*old_file).clone());
        }
    }

    result
}
