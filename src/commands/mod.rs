//! Implementation of tidemark subcommands.
//!
//! `mod.rs` is a thin dispatcher plus the [`CommandContext`] shared by every
//! command; command logic lives in dedicated modules (`check`, `baseline`,
//! `status`, `reset`).
//!
//! # Example
//!
//! ```no_run
//! use tidemark::cli::Cli;
//! use tidemark::commands;
//!
//! let cli = Cli::parse_args();
//! let outcome = commands::execute(&cli)?;
//! if outcome.has_changes() {
//!     eprintln!("The tree changed since the baseline");
//! }
//! # Ok::<(), tidemark::error::TidemarkError>(())
//! ```

use std::io::{self, Write};

use crate::cli::{Cli, Commands};
use crate::config::ScanConfig;
use crate::diff::DiffResult;
use crate::error::{Result, TidemarkError};
use crate::logging::Logger;
use crate::scanner::scan;
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;

pub(crate) mod baseline;
pub(crate) mod check;
pub(crate) mod confirm;
pub(crate) mod report;
pub(crate) mod reset;
pub(crate) mod status;

pub use baseline::baseline;
pub use check::{CheckOptions, CheckOutcome, check};
pub use confirm::{Confirm, FixedAnswer, StdinConfirm};
pub use reset::reset;
pub use status::status;


/// Everything a command needs: the scan settings, the baseline store, and
/// the logger.
#[derive(Debug)]
pub struct CommandContext {
    config: ScanConfig,
    store: SnapshotStore,
    log: Logger,
}

impl CommandContext {
    /// Creates a context for `config`, logging at the given verbosity.
    pub fn new(config: ScanConfig, verbose: u8, quiet: bool) -> Self {
        let store = SnapshotStore::new(config.snapshot_path());
        Self {
            config,
            store,
            log: Logger::new(if quiet { 0 } else { verbose }, quiet),
        }
    }

    /// Creates a context from parsed command-line options.
    ///
    /// # Errors
    ///
    /// Returns an error if the options do not form a valid [`ScanConfig`].
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let opts = cli.global_opts();
        Ok(Self::new(opts.scan_config()?, opts.verbose(), opts.quiet()))
    }

    /// Get the scan settings
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Get the baseline store
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub(crate) fn log(&self) -> &Logger {
        &self.log
    }

    /// Scans the configured root and logs what was left out.
    pub(crate) fn scan_current(&self) -> Result<Snapshot> {
        self.log.info(format!(
            "Scanning {}...",
            self.config.root_dir().display()
        ));
        let report = scan(&self.config)?;
        report::log_scan_summary(&self.log, &report);
        Ok(report.snapshot)
    }

    /// Loads the baseline, treating an unparsable one as absent.
    ///
    /// With `quarantine` set, the unparsable file is renamed aside so the next
    /// save cannot destroy it. Without it the file is left untouched.
    pub(crate) fn load_baseline(&self, quarantine: bool) -> Result<Snapshot> {
        match self.store.load() {
            Ok(snapshot) => Ok(snapshot),
            Err(err @ TidemarkError::CorruptSnapshot { .. }) => {
                self.log.warn(&err);
                if quarantine {
                    let moved_to = self.store.quarantine()?;
                    self.log.warn(format!(
                        "Moved the unreadable baseline to {}; treating this run as the first",
                        moved_to.display()
                    ));
                } else {
                    self.log.warn(format!(
                        "Leaving the unreadable baseline at {}; treating this run as the first",
                        self.store.path().display()
                    ));
                }
                Ok(Snapshot::new(*self.config.fingerprint()))
            }
            Err(err) => Err(err),
        }
    }

    /// Fails if a non-empty baseline was fingerprinted with other settings
    /// than the current run.
    pub(crate) fn ensure_comparable(&self, baseline: &Snapshot) -> Result<()> {
        if !baseline.is_empty() && baseline.fingerprint() != self.config.fingerprint() {
            return Err(TidemarkError::FingerprintMismatch {
                baseline: baseline.fingerprint().to_string(),
                current: self.config.fingerprint().to_string(),
            });
        }
        Ok(())
    }
}

/// What a command did, for the caller to turn into an exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// `check` ran
    Check(CheckOutcome),
    /// `baseline` recorded this many files
    Baseline {
        /// Number of files in the new baseline
        files: usize,
    },
    /// `status` compared without writing
    Status {
        /// Differences against the baseline
        diff: DiffResult,
        /// Whether differences should produce a failing exit status
        exit_code: bool,
    },
    /// `reset` ran
    Reset {
        /// Whether a baseline file was actually removed
        removed: bool,
    },
}

impl CommandOutcome {
    /// Returns `true` if a comparison found differences.
    pub fn has_changes(&self) -> bool {
        match self {
            CommandOutcome::Check(CheckOutcome::Compared { diff, .. })
            | CommandOutcome::Status { diff, .. } => !diff.is_empty(),
            _ => false,
        }
    }

    /// Returns `true` if the process should exit with a failing status even
    /// though the command succeeded (`status --exit-code` with differences).
    pub fn exit_with_failure(&self) -> bool {
        matches!(self, CommandOutcome::Status { exit_code: true, .. }) && self.has_changes()
    }
}

/// Execute commands based on the parsed CLI arguments, prompting on stdin
/// and printing reports to stdout.
pub fn execute(cli: &Cli) -> Result<CommandOutcome> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute_with(cli, &mut StdinConfirm, &mut out)
}

/// Execute commands with an explicit confirmation source and report sink.
pub fn execute_with(
    cli: &Cli,
    confirm: &mut dyn Confirm,
    out: &mut dyn Write,
) -> Result<CommandOutcome> {
    let ctx = CommandContext::from_cli(cli)?;

    match cli.command() {
        Commands::Check { yes, no_update } => {
            let options = CheckOptions {
                assume_yes: *yes,
                no_update: *no_update,
            };
            check(&ctx, &options, confirm, out).map(CommandOutcome::Check)
        }
        Commands::Baseline => baseline(&ctx).map(|files| CommandOutcome::Baseline { files }),
        Commands::Status { exit_code } => status(&ctx, out).map(|diff| CommandOutcome::Status {
            diff,
            exit_code: *exit_code,
        }),
        Commands::Reset => reset(&ctx).map(|removed| CommandOutcome::Reset { removed }),
    }
}
