//! Snapshot comparison.
//!
//! Compares a baseline against a fresh scan and sorts every differing path
//! into exactly one of three buckets:
//! - modified: present in both, record differs in size, mtime, or hash
//!
//! Modification times are compared at the coarser precision of the two
//! snapshots, so a baseline read from float seconds does not flag every
//! file as modified.
//! - deleted: only in the baseline
//! - added: only in the fresh scan

use std::collections::BTreeSet;

use crate::snapshot::{FileRecord, MtimePrecision, Snapshot};

/// Paths that changed between two snapshots.
///
/// The three sets are pairwise disjoint. Sets are ordered so listings are
/// stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Paths in both snapshots whose records differ
    pub modified: BTreeSet<String>,
    /// Paths only in the old snapshot
    pub deleted: BTreeSet<String>,
    /// Paths only in the new snapshot
    pub added: BTreeSet<String>,
}

impl DiffResult {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.deleted.is_empty() && self.added.is_empty()
    }

    /// Total number of changed paths.
    pub fn total(&self) -> usize {
        self.modified.len() + self.deleted.len() + self.added.len()
    }
}

/// Compares two snapshots.
///
/// Pure and total. A path counts as modified when any field of its record
/// differs, including a changed mtime with identical content; the hash only
/// adds detection of edits that preserve both size and mtime.
pub fn diff(old: &Snapshot, new: &Snapshot) -> DiffResult {
    let precision = old.mtime_precision().max(new.mtime_precision());
    let mut result = DiffResult::default();

    for (path, old_record) in old.files() {
        match new.get(path) {
            None => {
                result.deleted.insert(path.clone());
            }
            Some(new_record) if !same_state(old_record, new_record, precision) => {
                result.modified.insert(path.clone());
            }
            Some(_) => {}
        }
    }

    for path in new.files().keys() {
        if !old.contains(path) {
            result.added.insert(path.clone());
        }
    }

    result
}

fn same_state(old: &FileRecord, new: &FileRecord, precision: MtimePrecision) -> bool {
    old.size == new.size
        && old.hash == new.hash
        && precision.same_instant(old.modified_at, new.modified_at)
}
