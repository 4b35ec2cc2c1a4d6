//! # tidemark
//!
//! Point-in-time integrity checking for a directory tree: a pendrive, a
//! mounted volume, or any folder.
//!
//! ## Overview
//!
//! tidemark walks a tree, records each regular file's size, modification
//! time, and a fingerprint of its leading bytes, and persists that state as a
//! baseline. A later run compares the tree against the baseline and reports
//! which files were modified, deleted, or added, then asks whether the
//! current state should become the new baseline.
//!
//! ## Key Features
//!
//! - **Bounded hashing**: only the first `max_hash_bytes` (1 MiB by default)
//!   of each file are hashed, with SHA-256 or BLAKE3
//! - **Mount-independent keys**: paths are stored relative to the root with
//!   `/` separators
//! - **Atomic baselines**: saves go through a synced temporary file and a
//!   rename
//! - **Parallel scanning**: per-file work runs on a bounded rayon pool
//! - **Corruption safety**: an unreadable baseline is moved aside, never
//!   overwritten
//!
//! ## Architecture
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`commands`]: `check`, `baseline`, `status`, and `reset`
//! - [`config`]: Scan settings shared by the scanner and the store
//! - [`scanner`]: Tree walk producing a [`snapshot::Snapshot`]
//! - [`store`]: JSON persistence of the baseline
//! - [`diff`]: Comparison of two snapshots
//! - [`hashing`], [`metadata`]: Per-file fingerprint and stat
//! - [`error`]: Error types and handling with thiserror + miette
//!
//! ## Library Usage
//!
//! The four core operations compose directly:
//!
//! ```no_run
//! use tidemark::config::ScanConfig;
//! use tidemark::diff::diff;
//! use tidemark::scanner::scan;
//! use tidemark::store::SnapshotStore;
//!
//! let config = ScanConfig::builder()
//!     .root_dir("/media/usb")
//!     .snapshot_path("usb.json")
//!     .build()?;
//! let store = SnapshotStore::new(config.snapshot_path());
//!
//! let baseline = store.load()?;
//! let current = scan(&config)?.snapshot;
//! let changes = diff(&baseline, &current);
//! println!("{} files changed", changes.total());
//! store.save(&current)?;
//! # Ok::<(), tidemark::error::TidemarkError>(())
//! ```
//!
//! ## Error Handling
//!
//! The crate uses a combination of:
//! - `thiserror` for strongly-typed errors
//! - `miette` for rich diagnostic output in CLI
//!
//! All public functions return `Result` types with descriptive error variants.

pub mod cli;
pub mod commands;
pub mod config;
pub mod diff;
pub mod error;
pub mod hashing;
pub mod metadata;
pub mod scanner;
pub mod snapshot;
pub mod store;

// Internal modules
mod logging;
mod size;
mod timestamp;
