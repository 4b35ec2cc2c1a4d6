//! Scan and store configuration.
//!
//! Everything the scanner and the store need is passed in explicitly through
//! [`ScanConfig`]; nothing is read from globals. The CLI layer builds one
//! from flags and environment variables, library users build one with
//! [`ScanConfig::builder`].

use std::num::NonZeroUsize;
use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::error::{Result, TidemarkError};
use crate::hashing::{DEFAULT_MAX_HASH_BYTES, FingerprintSpec, HashAlgorithm};

/// Baseline file name used when no snapshot path is configured. Relative to
/// the working directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = "snapshot.json";

/// Configuration for a scan and its baseline store.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory to scan (absolute)
    root_dir: PathBuf,
    /// Baseline file location (absolute)
    snapshot_path: PathBuf,
    /// Algorithm and prefix length for content fingerprints
    fingerprint: FingerprintSpec,
    /// Upper bound on worker threads hashing files
    concurrency: usize,
    /// Relative paths matching any of these are left out of the snapshot
    exclude: Vec<Regex>,
}

impl ScanConfig {
    /// Creates a new builder for [`ScanConfig`]
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Get the scan root
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the baseline file location
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Get the hash algorithm
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.fingerprint.algorithm
    }

    /// Get the number of leading bytes hashed per file
    pub fn max_hash_bytes(&self) -> u64 {
        self.fingerprint.max_bytes
    }

    /// Get the full fingerprint settings
    pub fn fingerprint(&self) -> &FingerprintSpec {
        &self.fingerprint
    }

    /// Get the worker thread limit
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Get the exclusion patterns
    pub fn exclude(&self) -> &[Regex] {
        &self.exclude
    }

    /// Returns `true` if a root-relative path matches an exclusion pattern.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(relative_path))
    }
}

/// Builder for [`ScanConfig`]
#[derive(Debug, Default)]
pub struct ScanConfigBuilder {
    root_dir: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
    hash_algorithm: HashAlgorithm,
    max_hash_bytes: Option<u64>,
    concurrency: Option<usize>,
    exclude: Vec<String>,
}

impl ScanConfigBuilder {
    /// Set the directory to scan (defaults to the working directory)
    pub fn root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(dir.into());
        self
    }

    /// Set the baseline file location (defaults to `./snapshot.json`)
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Set the hash algorithm
    pub fn hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    /// Set how many leading bytes of each file are hashed (defaults to 1 MiB)
    pub fn max_hash_bytes(mut self, bytes: u64) -> Self {
        self.max_hash_bytes = Some(bytes);
        self
    }

    /// Set the worker thread limit (defaults to available parallelism)
    pub fn concurrency(mut self, threads: usize) -> Self {
        self.concurrency = Some(threads);
        self
    }

    /// Add exclusion regexes, matched against `/`-separated relative paths
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Build the configuration, normalizing paths and compiling patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if the concurrency or the hash byte limit is zero,
    /// or a pattern is not a valid regular expression.
    pub fn build(self) -> Result<ScanConfig> {
        let concurrency = match self.concurrency {
            Some(0) => {
                return Err(TidemarkError::ConfigError(
                    "Concurrency must be at least 1".to_string(),
                ));
            }
            Some(n) => n,
            None => default_concurrency(),
        };

        // Zero bytes would fingerprint every file to the same digest
        let max_bytes = match self.max_hash_bytes {
            Some(0) => {
                return Err(TidemarkError::ConfigError(
                    "Max hash bytes must be at least 1".to_string(),
                ));
            }
            Some(n) => n,
            None => DEFAULT_MAX_HASH_BYTES,
        };

        let exclude = self
            .exclude
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern).map_err(|source| TidemarkError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ScanConfig {
            root_dir: normalize_path(self.root_dir.unwrap_or_else(|| PathBuf::from("."))),
            snapshot_path: normalize_path(
                self.snapshot_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_FILE)),
            ),
            fingerprint: FingerprintSpec {
                algorithm: self.hash_algorithm,
                max_bytes,
            },
            concurrency,
            exclude,
        })
    }
}

/// Number of worker threads used when none is configured.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Normalize a path to be absolute and clean, without requiring it to exist.
///
/// This function:
/// - Converts relative paths to absolute using the current directory
/// - Removes `.` and `..` components where possible
/// - Does NOT resolve symlinks (preserves user intent)
/// - Does NOT require the path to exist
pub fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    let absolute = if path.is_relative() {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    } else {
        path.to_path_buf()
    };

    let mut components = Vec::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            Component::CurDir => continue,
            _ => components.push(component),
        }
    }

    let mut result = PathBuf::new();
    for component in components {
        result.push(component);
    }

    result
}
