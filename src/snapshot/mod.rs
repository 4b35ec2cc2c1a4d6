use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hashing::FingerprintSpec;


/// Current version of the snapshot file format.
///
/// This version is incremented when incompatible changes are made to the
/// on-disk layout. The store refuses to load snapshots with a version higher
/// than this constant. Version 0 is the unversioned legacy mapping, which is
/// migrated on load.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Observed state of a single file at scan time.
///
/// Two records are equal only if all three fields match; a change in any of
/// them marks the file as modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Size of the file in bytes.
    pub size: u64,

    /// Modification time in nanoseconds since UNIX_EPOCH.
    pub modified_at: u128,

    /// Lowercase hex digest of the file's leading bytes.
    ///
    /// See [`FingerprintSpec`] for how many bytes and which algorithm.
    pub hash: String,
}

/// Largest gap between two modification times that still counts as the same
/// instant when one side was stored as float seconds. An `f64` holding a
/// present-day UNIX time resolves about a quarter of a microsecond.
pub const FLOAT_SECONDS_TOLERANCE_NANOS: u128 = 1_000;

/// How exactly a snapshot's modification times were recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum MtimePrecision {
    /// Whole nanoseconds, as read from the filesystem.
    #[default]
    Exact,
    /// Converted from fractional seconds in an unversioned snapshot file.
    FloatSeconds,
}

impl MtimePrecision {
    /// Returns `true` if two modification times are indistinguishable at
    /// this precision.
    pub fn same_instant(self, a: u128, b: u128) -> bool {
        match self {
            MtimePrecision::Exact => a == b,
            MtimePrecision::FloatSeconds => a.abs_diff(b) <= FLOAT_SECONDS_TOLERANCE_NANOS,
        }
    }
}

/// Recorded state of every file under a scan root at one instant.
///
/// Keys are paths relative to the scan root with `/` separators, so a
/// snapshot taken under one mount point compares cleanly against a scan of
/// the same tree mounted elsewhere. A snapshot is never updated in place; a
/// new scan produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Version of the file format this snapshot was read from or will be
    /// written as.
    pub(crate) version: u32,

    /// Settings the hashes in `files` were computed with.
    pub(crate) fingerprint: FingerprintSpec,

    /// Relative path to record. Ordered so the persisted file is stable
    /// across runs.
    pub(crate) files: BTreeMap<String, FileRecord>,

    /// Precision of the `modified_at` values. Only known at load time; a
    /// saved snapshot is always exact.
    #[serde(skip)]
    pub(crate) mtime_precision: MtimePrecision,
}

impl Snapshot {
    /// Creates an empty snapshot, the "no baseline yet" value.
    pub fn new(fingerprint: FingerprintSpec) -> Self {
        Self::from_records(fingerprint, BTreeMap::new())
    }

    /// Creates a snapshot from already collected records.
    pub fn from_records(fingerprint: FingerprintSpec, files: BTreeMap<String, FileRecord>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            fingerprint,
            files,
            mtime_precision: MtimePrecision::Exact,
        }
    }

    /// Marks the modification times as having been recorded at a coarser
    /// precision.
    pub fn with_mtime_precision(mut self, precision: MtimePrecision) -> Self {
        self.mtime_precision = precision;
        self
    }

    /// Format version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Fingerprint settings the hashes were produced with.
    pub fn fingerprint(&self) -> &FingerprintSpec {
        &self.fingerprint
    }

    /// Precision the modification times were recorded at.
    pub fn mtime_precision(&self) -> MtimePrecision {
        self.mtime_precision
    }

    /// All records keyed by relative path.
    pub fn files(&self) -> &BTreeMap<String, FileRecord> {
        &self.files
    }

    /// Looks up the record for a relative path.
    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.files.get(path)
    }

    /// Returns `true` if the path is recorded.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Number of recorded files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no files are recorded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all recorded file sizes.
    pub fn total_size(&self) -> u64 {
        self.files
            .values()
            .fold(0u64, |acc, record| acc.saturating_add(record.size))
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(FingerprintSpec::default())
    }
}
