use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use memmap2::Mmap;
use serde::Deserialize;

use crate::error::{Result, TidemarkError};
use crate::hashing::FingerprintSpec;
use crate::snapshot::{FileRecord, MtimePrecision, SNAPSHOT_VERSION, Snapshot};
use crate::timestamp::seconds_f64_to_nanos;


/// Record layout of unversioned (v0) snapshot files: a bare mapping of path
/// to `{size, mtime, hash}` with the mtime in fractional seconds.
#[derive(Deserialize, Debug, Clone)]
struct LegacyRecord {
    size: u64,
    mtime: f64,
    hash: String,
}

#[derive(Deserialize, Debug)]
#[serde(transparent)]
struct LegacySnapshot(BTreeMap<String, LegacyRecord>);

impl From<LegacySnapshot> for Snapshot {
    fn from(legacy: LegacySnapshot) -> Self {
        let files = legacy
            .0
            .into_iter()
            .map(|(path, record)| {
                (
                    path.replace('\\', "/"),
                    FileRecord {
                        size: record.size,
                        modified_at: seconds_f64_to_nanos(record.mtime),
                        hash: record.hash.to_lowercase(),
                    },
                )
            })
            .collect();

        Snapshot {
            version: 0,
            // Legacy files were always SHA-256 over the first MiB
            fingerprint: FingerprintSpec::default(),
            files,
            mtime_precision: MtimePrecision::FloatSeconds,
        }
    }
}

/// Just enough structure to read the version before committing to a layout.
#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

/// Durable home of the baseline snapshot.
///
/// The store owns a single JSON file. Saves go through a temporary sibling
/// and an atomic rename, and are serialized within the process, so a load
/// never observes a partially written baseline.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SnapshotStore {
    /// Creates a store backed by the file at `path`. Nothing is touched on
    /// disk until [`load`](Self::load) or [`save`](Self::save) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the baseline file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the temporary file used while saving.
    pub fn temp_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".tmp")
    }

    /// Location an unreadable baseline is moved to by
    /// [`quarantine`](Self::quarantine). When it is taken, later quarantines
    /// use `.corrupt.1`, `.corrupt.2`, and so on.
    pub fn quarantine_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".corrupt")
    }

    /// Returns `true` if `path` is the baseline file or one of the siblings
    /// this store writes: the save temporary or any quarantined copy.
    pub fn owns(&self, path: &Path) -> bool {
        if path == self.path || path == self.temp_path() {
            return true;
        }
        if path.parent() != self.path.parent() {
            return false;
        }

        let quarantine_path = self.quarantine_path();
        let (Some(name), Some(base)) = (
            path.file_name().and_then(OsStr::to_str),
            quarantine_path.file_name().and_then(OsStr::to_str),
        ) else {
            return false;
        };

        name == base
            || name
                .strip_prefix(base)
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Loads the stored baseline.
    ///
    /// A missing or empty file yields an empty snapshot: that is the first-run
    /// signal, not an error. Unversioned legacy files are migrated in memory;
    /// they are rewritten in the current format on the next save.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The content cannot be parsed as a snapshot
    ///   ([`TidemarkError::CorruptSnapshot`])
    /// - The snapshot was written by a newer version
    ///   ([`TidemarkError::UnsupportedSnapshotVersion`])
    pub fn load(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }

        let file = File::open(&self.path).map_err(|source| TidemarkError::IoError {
            path: self.path.clone(),
            source,
        })?;

        let file_metadata = file.metadata().map_err(|source| TidemarkError::IoError {
            path: self.path.clone(),
            source,
        })?;

        if file_metadata.len() == 0 {
            return Ok(Snapshot::default());
        }

        // SAFETY: saves replace the file by rename, never truncate it in place
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| TidemarkError::IoError {
            path: self.path.clone(),
            source,
        })?;

        let snapshot = deserialize_snapshot(&mmap[..], &self.path)?;

        if snapshot.version > SNAPSHOT_VERSION {
            return Err(TidemarkError::UnsupportedSnapshotVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        Ok(migrate_snapshot(snapshot))
    }

    /// Saves a snapshot as the new baseline, atomically.
    ///
    /// The snapshot is written to a temporary sibling, flushed to disk, and
    /// renamed over the baseline. If the process dies midway the previous
    /// baseline is still what [`load`](Self::load) returns. Concurrent calls
    /// on the same store are serialized.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - The snapshot cannot be serialized
    /// - The file cannot be written to disk
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|source| TidemarkError::CreateSnapshotDirError(parent.to_path_buf(), source))?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot).map_err(TidemarkError::SerializationError)?;

        let temp_path = self.temp_path();
        if let Err(err) = write_synced(&temp_path, &bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }

        fs::rename(&temp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&temp_path);
            TidemarkError::IoError {
                path: self.path.clone(),
                source,
            }
        })?;

        Ok(())
    }

    /// Removes the baseline.
    ///
    /// This function is idempotent - it succeeds even if there is no
    /// baseline.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|source| TidemarkError::IoError {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Moves an unreadable baseline aside so a fresh one can be written
    /// without destroying it. Returns where it was moved to.
    ///
    /// Earlier quarantined copies are never overwritten; the first free
    /// name among `.corrupt`, `.corrupt.1`, `.corrupt.2`, ... is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename fails.
    pub fn quarantine(&self) -> Result<PathBuf> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let destination = self.free_quarantine_path();
        fs::rename(&self.path, &destination).map_err(|source| TidemarkError::IoError {
            path: self.path.clone(),
            source,
        })?;
        Ok(destination)
    }

    fn free_quarantine_path(&self) -> PathBuf {
        let first = self.quarantine_path();
        if !first.exists() {
            return first;
        }
        (1u32..)
            .map(|n| sibling_with_suffix(&self.path, &format!(".corrupt.{n}")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let io_error = |source| TidemarkError::IoError {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(io_error)?;
    file.write_all(bytes).map_err(io_error)?;
    file.sync_all().map_err(io_error)?;
    Ok(())
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("snapshot"));
    name.push(suffix);
    path.with_file_name(name)
}

/// Parses the current layout, falling back to the legacy mapping.
fn deserialize_snapshot(bytes: &[u8], path: &Path) -> Result<Snapshot> {
    // A newer file may not parse as the current layout at all; check its
    // version first so it is reported as unsupported rather than corrupt.
    if let Ok(header) = serde_json::from_slice::<VersionHeader>(bytes)
        && header.version > SNAPSHOT_VERSION
    {
        return Err(TidemarkError::UnsupportedSnapshotVersion {
            found: header.version,
            supported: SNAPSHOT_VERSION,
        });
    }

    match serde_json::from_slice::<Snapshot>(bytes) {
        Ok(snapshot) => Ok(snapshot),
        Err(primary_err) => {
            if let Ok(legacy) = serde_json::from_slice::<LegacySnapshot>(bytes) {
                return Ok(Snapshot::from(legacy));
            }
            Err(TidemarkError::CorruptSnapshot {
                path: path.to_path_buf(),
                message: primary_err.to_string(),
            })
        }
    }
}

/// Migrates a snapshot from older versions to the current version.
///
/// Currently handles:
/// - v0 -> v1: the legacy mapping already got the default fingerprint spec
///   and nanosecond timestamps during parsing, only the version changes
///
/// Migration happens in memory only; the file is upgraded on the next save.
fn migrate_snapshot(mut snapshot: Snapshot) -> Snapshot {
    if snapshot.version == 0 {
        snapshot.version = 1;
    }

    snapshot
}
