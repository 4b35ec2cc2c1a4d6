//! Command-line interface definitions for tidemark.
//!
//! This module defines the CLI structure using clap, including all subcommands
//! and their arguments. The main entry point is the [`Cli`] struct.
//!
//! # Example
//!
//! ```no_run
//! use tidemark::cli::{Cli, Commands};
//!
//! // Parse command-line arguments
//! let cli = Cli::parse_args();
//!
//! // Running without a subcommand means `check`
//! match cli.command() {
//!     Commands::Check { yes, .. } => println!("Checking (auto-accept: {yes})"),
//!     _ => {}
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_SNAPSHOT_FILE, ScanConfig};
use crate::error::{Result, TidemarkError};
use crate::hashing::HashAlgorithm;
use crate::size::parse_size;


/// Command used when none is given on the command line.
static DEFAULT_COMMAND: Commands = Commands::Check {
    yes: false,
    no_update: false,
};

/// Main command-line interface for tidemark.
///
/// This struct represents the top-level CLI configuration, containing both
/// global options that apply to all commands and the specific subcommand
/// to execute.
#[derive(Parser, Debug)]
#[command(
    name = "tidemark",
    bin_name = "tidemark",
    author,
    version,
    about = "Snapshot a directory tree and report modified, deleted, and added files",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    global_opts: GlobalOpts,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Global options that apply to all tidemark commands.
#[derive(Parser, Debug)]
pub struct GlobalOpts {
    /// Directory to scan (defaults to the current directory)
    #[arg(long, global = true, default_value = ".", env = "TIDEMARK_ROOT")]
    root: PathBuf,

    /// Path to the baseline snapshot file
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_SNAPSHOT_FILE,
        env = "TIDEMARK_SNAPSHOT"
    )]
    snapshot: PathBuf,

    /// Content hash algorithm
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = HashAlgorithm::Sha256,
        env = "TIDEMARK_ALGORITHM"
    )]
    algorithm: HashAlgorithm,

    /// Number of leading bytes hashed per file (e.g., "1M", "64K", or bytes)
    #[arg(
        long,
        global = true,
        default_value = "1M",
        env = "TIDEMARK_MAX_HASH_BYTES"
    )]
    max_hash_bytes: String,

    /// Maximum number of files hashed in parallel (defaults to the CPU count)
    #[arg(short, long, global = true, env = "TIDEMARK_JOBS")]
    jobs: Option<usize>,

    /// Leave out relative paths matching this regex (repeatable)
    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        env = "TIDEMARK_EXCLUDE"
    )]
    exclude: Vec<String>,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, env = "TIDEMARK_VERBOSE")]
    verbose: u8,

    /// Silence all output except for errors and results
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        env = "TIDEMARK_QUIET"
    )]
    quiet: bool,
}

impl GlobalOpts {
    /// Get the scan root as given
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the snapshot path as given
    pub fn snapshot(&self) -> &Path {
        &self.snapshot
    }

    /// Get the hash algorithm
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Get the raw --max-hash-bytes value
    pub fn max_hash_bytes(&self) -> &str {
        &self.max_hash_bytes
    }

    /// Get the worker limit, if set
    pub fn jobs(&self) -> Option<usize> {
        self.jobs
    }

    /// Get the exclusion patterns
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Get the verbose level
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// Resolve these options into a [`ScanConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the hash size, job count, or an exclusion pattern
    /// is invalid.
    pub fn scan_config(&self) -> Result<ScanConfig> {
        let mut builder = ScanConfig::builder()
            .root_dir(&self.root)
            .snapshot_path(&self.snapshot)
            .hash_algorithm(self.algorithm)
            .max_hash_bytes(parse_size(&self.max_hash_bytes)?)
            .exclude(self.exclude.iter().cloned());

        if let Some(jobs) = self.jobs {
            builder = builder.concurrency(jobs);
        }

        builder.build()
    }
}

impl Cli {
    /// Get the global options
    pub fn global_opts(&self) -> &GlobalOpts {
        &self.global_opts
    }

    /// Get the command, `check` when none was given
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&DEFAULT_COMMAND)
    }

    /// Create a builder for programmatic construction
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }

    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    root: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    algorithm: HashAlgorithm,
    max_hash_bytes: Option<String>,
    jobs: Option<usize>,
    exclude: Vec<String>,
    verbose: u8,
    quiet: bool,
    command: Option<Commands>,
}

impl CliBuilder {
    /// Set the directory to scan
    pub fn root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root = Some(dir.into());
        self
    }

    /// Set the baseline snapshot path
    pub fn snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(path.into());
        self
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the number of hashed bytes per file (size string)
    pub fn max_hash_bytes(mut self, size: impl Into<String>) -> Self {
        self.max_hash_bytes = Some(size.into());
        self
    }

    /// Set the worker limit
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Add an exclusion pattern
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Set the verbose level
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable quiet mode
    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Set the command
    pub fn command(mut self, command: Commands) -> Self {
        self.command = Some(command);
        self
    }

    /// Build the Cli instance
    pub fn build(self) -> Result<Cli> {
        if self.quiet && self.verbose > 0 {
            return Err(TidemarkError::ConfigError(
                "quiet and verbose are mutually exclusive".to_string(),
            ));
        }

        Ok(Cli {
            global_opts: GlobalOpts {
                root: self.root.unwrap_or_else(|| PathBuf::from(".")),
                snapshot: self
                    .snapshot
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_FILE)),
                algorithm: self.algorithm,
                max_hash_bytes: self.max_hash_bytes.unwrap_or_else(|| "1M".to_string()),
                jobs: self.jobs,
                exclude: self.exclude,
                verbose: self.verbose,
                quiet: self.quiet,
            },
            command: self.command,
        })
    }
}

/// Available tidemark subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Compare the tree against the baseline (default command)
    ///
    /// On the first run, when no baseline exists, the current state is saved
    /// as the baseline. Afterwards, lists modified, deleted, and added files
    /// and asks whether to replace the baseline with the current state.
    Check {
        /// Replace the baseline without asking
        #[arg(short, long, conflicts_with = "no_update", env = "TIDEMARK_YES")]
        yes: bool,

        /// Never replace the baseline
        #[arg(long, env = "TIDEMARK_NO_UPDATE")]
        no_update: bool,
    },

    /// Record the current state as the baseline without comparing
    Baseline,

    /// Compare against the baseline without prompting or writing anything
    Status {
        /// Exit with status 1 when differences are found
        #[arg(long)]
        exit_code: bool,
    },

    /// Remove the baseline so the next check starts fresh
    Reset,
}
