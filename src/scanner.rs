//! Directory tree scanning.
//!
//! The scanner walks the configured root, stats and fingerprints every
//! regular file, and assembles a fresh [`Snapshot`]. Enumeration is a single
//! sequential walk; the per-file stat and hash work fans out over a bounded
//! rayon pool and is merged back at one aggregation point.
//!
//! Per-file failures never abort a scan. A file that vanishes, cannot be
//! stat'ed, or cannot be read is left out of the snapshot and reported in
//! [`ScanReport::skipped`]. Only an unusable root directory is fatal.

use std::collections::BTreeMap;
use std::error::Error as _;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::{Result, TidemarkError};
use crate::hashing::fingerprint;
use crate::metadata::try_read_metadata;
use crate::snapshot::{FileRecord, Snapshot};
use crate::store::SnapshotStore;


/// Cooperative cancellation flag for a running scan.
///
/// Clones share the same flag. Cancelling only stops the in-memory scan; the
/// scanner never writes to the snapshot store.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every scan holding a clone of this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Why a file was left out of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The file or directory could not be stat'ed or listed (vanished,
    /// permission denied, ...)
    Unavailable,
    /// The file could be stat'ed but its content could not be read
    ReadError,
    /// The path is not valid UTF-8 and cannot be used as a snapshot key
    NonUtf8Path,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Unavailable => f.write_str("unavailable"),
            SkipReason::ReadError => f.write_str("read error"),
            SkipReason::NonUtf8Path => f.write_str("non-UTF-8 path"),
        }
    }
}

/// A file (or directory) the scan could not record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Absolute path of the entry
    pub path: PathBuf,
    /// Category of the failure
    pub reason: SkipReason,
    /// The underlying error message
    pub detail: String,
}

/// Result of a scan: the snapshot plus everything that was left out of it.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// The freshly captured snapshot
    pub snapshot: Snapshot,
    /// Entries excluded because of errors, sorted by path
    pub skipped: Vec<SkippedFile>,
    /// Number of symbolic links seen (never followed or recorded)
    pub symlinks: usize,
}

/// Candidate files, walk errors, and the symlink count.
type Enumerated = (Vec<(String, PathBuf)>, Vec<SkippedFile>, usize);

enum FileOutcome {
    Recorded(String, FileRecord),
    Skipped(SkippedFile),
    Cancelled,
}

/// Scans a directory tree into a [`Snapshot`].
#[derive(Debug)]
pub struct Scanner<'a> {
    config: &'a ScanConfig,
    cancellation: CancellationToken,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner for the root and settings in `config`.
    pub fn new(config: &'a ScanConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
        }
    }

    /// Attaches a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Walks the root and captures every regular file beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The root is missing, not a directory, or cannot be listed
    ///   ([`TidemarkError::RootDirectoryUnavailable`])
    /// - The worker pool cannot be created
    /// - The scan was cancelled ([`TidemarkError::Cancelled`])
    pub fn scan(&self) -> Result<ScanReport> {
        let root = self.config.root_dir();
        check_root(root)?;

        let (candidates, mut skipped, symlinks) = self.enumerate(root)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.concurrency())
            .build()?;

        let outcomes: Vec<FileOutcome> = pool.install(|| {
            candidates
                .into_par_iter()
                .map(|(key, path)| self.capture(key, path))
                .collect()
        });

        let mut files = BTreeMap::new();
        let mut cancelled = false;
        for outcome in outcomes {
            match outcome {
                FileOutcome::Recorded(key, record) => {
                    files.insert(key, record);
                }
                FileOutcome::Skipped(skip) => skipped.push(skip),
                FileOutcome::Cancelled => cancelled = true,
            }
        }

        if cancelled || self.cancellation.is_cancelled() {
            return Err(TidemarkError::Cancelled);
        }

        skipped.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(ScanReport {
            snapshot: Snapshot::from_records(*self.config.fingerprint(), files),
            skipped,
            symlinks,
        })
    }

    /// Lists regular files under `root` as (relative key, absolute path).
    fn enumerate(&self, root: &Path) -> Result<Enumerated> {
        // The baseline and its siblings may live under the root; never
        // report the tool's own state as a change.
        let store = SnapshotStore::new(self.config.snapshot_path());
        let mut candidates = Vec::new();
        let mut skipped = Vec::new();
        let mut symlinks = 0;

        for entry in WalkDir::new(root).follow_links(false) {
            if self.cancellation.is_cancelled() {
                return Err(TidemarkError::Cancelled);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(TidemarkError::RootDirectoryUnavailable {
                        path: root.to_path_buf(),
                        source: err
                            .into_io_error()
                            .unwrap_or_else(|| io::Error::other("directory walk failed")),
                    });
                }
                Err(err) => {
                    // A directory that vanished or cannot be listed counts as empty
                    skipped.push(SkippedFile {
                        path: err.path().map(Path::to_path_buf).unwrap_or_default(),
                        reason: SkipReason::Unavailable,
                        detail: err
                            .io_error()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| err.to_string()),
                    });
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                symlinks += 1;
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let Some(key) = relative_key(root, entry.path()) else {
                skipped.push(SkippedFile {
                    path: entry.path().to_path_buf(),
                    reason: SkipReason::NonUtf8Path,
                    detail: "path is not valid UTF-8".to_string(),
                });
                continue;
            };

            if store.owns(entry.path()) || self.config.is_excluded(&key) {
                continue;
            }

            candidates.push((key, entry.into_path()));
        }

        Ok((candidates, skipped, symlinks))
    }

    /// Stats and fingerprints one file.
    fn capture(&self, key: String, path: PathBuf) -> FileOutcome {
        if self.cancellation.is_cancelled() {
            return FileOutcome::Cancelled;
        }

        let metadata = match try_read_metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                return FileOutcome::Skipped(SkippedFile {
                    detail: error_detail(&err),
                    path,
                    reason: SkipReason::Unavailable,
                });
            }
        };

        match fingerprint(&path, self.config.fingerprint()) {
            Ok(hash) => FileOutcome::Recorded(
                key,
                FileRecord {
                    size: metadata.size,
                    modified_at: metadata.modified_at,
                    hash,
                },
            ),
            Err(err) => FileOutcome::Skipped(SkippedFile {
                detail: error_detail(&err),
                path,
                reason: SkipReason::ReadError,
            }),
        }
    }
}

/// Scans the root in `config` without cancellation support.
///
/// Shorthand for `Scanner::new(config).scan()`.
pub fn scan(config: &ScanConfig) -> Result<ScanReport> {
    Scanner::new(config).scan()
}

/// Builds the snapshot key of `path`: its components below `root` joined
/// with `/`.
///
/// Returns `None` if `path` is not strictly below `root` or a component is
/// not valid UTF-8.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn check_root(root: &Path) -> Result<()> {
    let unavailable = |source| TidemarkError::RootDirectoryUnavailable {
        path: root.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(root).map_err(unavailable)?;
    if !metadata.is_dir() {
        return Err(unavailable(io::Error::new(
            io::ErrorKind::NotADirectory,
            "not a directory",
        )));
    }

    fs::read_dir(root).map_err(unavailable)?;
    Ok(())
}

fn error_detail(err: &TidemarkError) -> String {
    err.source()
        .map(ToString::to_string)
        .unwrap_or_else(|| err.to_string())
}
