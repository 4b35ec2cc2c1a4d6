//! Error types for tidemark.
//!
//! This module defines all error types used throughout tidemark, using
//! a combination of `thiserror` for ergonomic error definitions and `miette`
//! for rich diagnostic output.
//!
//! # Error Handling Strategy
//!
//! - All errors derive from [`TidemarkError`]
//! - Per-file errors ([`TidemarkError::PathUnavailable`],
//!   [`TidemarkError::ReadError`]) never escape the scanner; they are turned
//!   into skipped-file entries
//! - Root directory and snapshot store errors surface to the caller
//! - Errors are automatically converted to `miette::Result` for CLI output
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use tidemark::error::{Result, TidemarkError};
//!
//! fn check_root(path: &Path) -> Result<()> {
//!     std::fs::metadata(path).map_err(|source| TidemarkError::RootDirectoryUnavailable {
//!         path: path.to_path_buf(),
//!         source,
//!     })?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error types that can occur in tidemark operations
#[derive(Error, Debug, Diagnostic)]
pub enum TidemarkError {
    /// A single file could not be stat'ed.
    ///
    /// Raised by the metadata reader when a file vanished between enumeration
    /// and stat, or when permission is denied. The scanner swallows it and
    /// records the file as skipped.
    #[error("Path unavailable: '{path}'")]
    #[diagnostic(code(tidemark::scan::path_unavailable))]
    PathUnavailable {
        /// The path that could not be stat'ed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could be listed but its content could not be read for hashing.
    ///
    /// Non-fatal during a scan: the file is excluded from the snapshot and
    /// reported as skipped.
    #[error("Failed to read '{path}' for fingerprinting")]
    #[diagnostic(code(tidemark::hash::read_error))]
    ReadError {
        /// The file that could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The scan root is missing, not a directory, or cannot be listed.
    ///
    /// This is the only scan error that aborts a run.
    #[error("Root directory '{path}' is unavailable")]
    #[diagnostic(
        code(tidemark::scan::root_unavailable),
        help("Check that --root points to an existing, readable directory.")
    )]
    RootDirectoryUnavailable {
        /// The configured scan root
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The stored baseline exists but cannot be parsed.
    ///
    /// Callers should treat this as "no usable baseline" and say so loudly
    /// rather than dropping the file.
    #[error("Snapshot file '{path}' is corrupt: {message}")]
    #[diagnostic(
        code(tidemark::store::corrupt_snapshot),
        help("Run 'tidemark reset' to discard it, or 'tidemark baseline' to record a new one.")
    )]
    CorruptSnapshot {
        /// The snapshot file that failed to parse
        path: PathBuf,
        /// Description of the parse failure
        message: String,
    },

    /// The stored baseline was written by a newer tidemark.
    #[error("Snapshot version {found} is newer than supported version {supported}")]
    #[diagnostic(
        code(tidemark::store::unsupported_version),
        help("Upgrade tidemark to read this snapshot.")
    )]
    UnsupportedSnapshotVersion {
        /// Version found in the file
        found: u32,
        /// Highest version this build understands
        supported: u32,
    },

    /// The baseline was fingerprinted with different settings than the
    /// current run, so hashes are not comparable.
    #[error("Baseline was fingerprinted with {baseline}, current settings are {current}")]
    #[diagnostic(
        code(tidemark::check::fingerprint_mismatch),
        help(
            "Re-run with the baseline's --algorithm and --max-hash-bytes, or record a new \
             baseline with 'tidemark baseline'."
        )
    )]
    FingerprintMismatch {
        /// Fingerprint settings recorded in the baseline
        baseline: String,
        /// Fingerprint settings of the current run
        current: String,
    },

    /// File system I/O error during tidemark operations.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(tidemark::io_error))]
    IoError {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the parent directory of the snapshot file.
    #[error("Failed to create snapshot directory '{0}'")]
    #[diagnostic(
        code(tidemark::store::create_dir_error),
        help("Ensure you have write permissions for the parent directory.")
    )]
    CreateSnapshotDirError(
        /// The directory path that couldn't be created
        PathBuf,
        /// The underlying I/O error
        #[source]
        std::io::Error,
    ),

    /// Writing the report or reading the confirmation answer failed.
    #[error("Failed to access the console")]
    #[diagnostic(code(tidemark::console_error))]
    ConsoleError(#[source] std::io::Error),

    /// Failed to serialize a snapshot to JSON.
    #[error("Failed to serialize snapshot")]
    #[diagnostic(code(tidemark::store::serialization_error))]
    SerializationError(#[source] serde_json::Error),

    /// Invalid size specification for --max-hash-bytes.
    #[error("Invalid size: '{0}' - {1}")]
    #[diagnostic(
        code(tidemark::config::invalid_size),
        help("Specify a size as a number with optional suffix (e.g., '1M', '512K', or raw bytes)")
    )]
    InvalidSize(
        /// The invalid size value provided
        String,
        /// Description of the parsing error
        String,
    ),

    /// An --exclude pattern is not a valid regular expression.
    #[error("Invalid exclude pattern '{pattern}'")]
    #[diagnostic(code(tidemark::config::invalid_pattern))]
    InvalidPattern {
        /// The pattern as given
        pattern: String,
        /// The regex compilation error
        #[source]
        source: regex::Error,
    },

    /// The worker pool for per-file hashing could not be started.
    #[error("Failed to build scan worker pool")]
    #[diagnostic(code(tidemark::scan::thread_pool))]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),

    /// The scan was cancelled before it finished.
    ///
    /// Only in-memory scan state is discarded; the stored baseline is never
    /// touched by a scan.
    #[error("Scan cancelled")]
    #[diagnostic(code(tidemark::scan::cancelled))]
    Cancelled,

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(tidemark::config::error),
        help("Check the required configuration parameters.")
    )]
    ConfigError(
        /// Description of the configuration error
        String,
    ),
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, TidemarkError>;
