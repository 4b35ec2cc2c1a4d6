use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::TempDir;
use assert_fs::prelude::*;
use tidemark::cli::{Cli, Commands};
use tidemark::commands::{CommandOutcome, FixedAnswer, execute_with};
use tidemark::error::Result;

/// A scratch drive: a `drive/` root to scan and a baseline file beside it.
pub struct Drive {
    pub temp_dir: TempDir,
}

impl Drive {
    /// Create a drive holding the given `(relative path, content)` files.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let temp_dir = TempDir::new().unwrap();
        temp_dir.child("drive").create_dir_all().unwrap();
        let drive = Self { temp_dir };
        for (path, content) in files {
            drive.write(path, content);
        }
        drive
    }

    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("drive")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.temp_dir.path().join("snapshot.json")
    }

    pub fn file(&self, path: &str) -> PathBuf {
        self.root().join(path)
    }

    pub fn write(&self, path: &str, content: &str) {
        let file = self.temp_dir.child("drive").child(path);
        if let Some(parent) = file.path().parent() {
            fs::create_dir_all(parent).unwrap();
        }
        file.write_str(content).unwrap();
    }

    /// Run a command with a fixed confirmation answer, returning the outcome
    /// and everything written to stdout.
    pub fn run(&self, command: Commands, answer: bool) -> Result<(CommandOutcome, String)> {
        let cli = Cli::builder()
            .root(self.root())
            .snapshot(self.snapshot_path())
            .quiet(true)
            .command(command)
            .build()?;

        let mut out: Vec<u8> = Vec::new();
        let outcome = execute_with(&cli, &mut FixedAnswer(answer), &mut out)?;
        Ok((outcome, String::from_utf8_lossy(&out).into_owned()))
    }
}

/// The `check` command without flags.
pub fn check() -> Commands {
    Commands::Check {
        yes: false,
        no_update: false,
    }
}

/// Path to the compiled binary under test.
pub fn binary() -> &'static Path {
    Path::new(env!("CARGO_BIN_EXE_tidemark"))
}
