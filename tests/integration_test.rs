use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use assert_fs::prelude::*;
use filetime::{FileTime, set_file_mtime};
use predicates::prelude::*;
use tidemark::cli::Commands;
use tidemark::commands::{CheckOutcome, CommandOutcome};
use tidemark::diff::DiffResult;
use tidemark::error::TidemarkError;
use tidemark::store::SnapshotStore;

mod common;

use common::{Drive, binary, check};

#[test]
fn test_first_run_saves_baseline_and_reports_nothing() {
    let drive = Drive::with_files(&[("a", "alpha"), ("b", "bravo")]);

    let (outcome, output) = drive.run(check(), true).unwrap();

    assert_eq!(
        outcome,
        CommandOutcome::Check(CheckOutcome::BaselineEstablished {
            files: 2,
            saved: true
        })
    );
    assert!(output.is_empty());
    drive
        .temp_dir
        .child("snapshot.json")
        .assert(predicate::path::is_file());
    drive
        .temp_dir
        .child("snapshot.json")
        .assert(predicate::str::contains("\"version\": 1"));
}

#[test]
fn test_modified_deleted_added_flow() {
    let drive = Drive::with_files(&[("a", "alpha"), ("b", "bravo")]);
    drive.run(check(), true).unwrap();

    drive.write("a", "alpha, edited");
    fs::remove_file(drive.file("b")).unwrap();
    drive.write("c", "charlie");

    let (outcome, output) = drive.run(check(), true).unwrap();

    assert!(outcome.has_changes());
    assert_eq!(
        output,
        "==== Comparison Results ====\n\
         Modified files: 1\n - a\n\
         Deleted files: 1\n - b\n\
         New files: 1\n - c\n"
    );

    let stored = SnapshotStore::new(drive.snapshot_path()).load().unwrap();
    let keys: Vec<&str> = stored.files().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "c"]);
}

#[test]
fn test_touch_only_counts_as_modified() {
    let drive = Drive::with_files(&[("a", "alpha")]);
    drive.run(check(), true).unwrap();

    set_file_mtime(drive.file("a"), FileTime::from_unix_time(1_234_567_890, 0)).unwrap();

    let (outcome, output) = drive.run(check(), false).unwrap();
    let CommandOutcome::Check(CheckOutcome::Compared { diff, updated }) = outcome else {
        panic!("Expected a comparison, got: {outcome:?}");
    };
    assert!(diff.modified.contains("a"));
    assert!(!updated);
    assert!(output.contains("Modified files: 1"));
}

#[test]
fn test_declined_update_reports_again() {
    let drive = Drive::with_files(&[("a", "alpha")]);
    drive.run(check(), true).unwrap();
    drive.write("nested/dir/new.txt", "new");

    let (first, _) = drive.run(check(), false).unwrap();
    let (second, _) = drive.run(check(), false).unwrap();

    assert_eq!(first, second);
    assert!(first.has_changes());
}

#[test]
fn test_nested_keys_use_forward_slashes() {
    let drive = Drive::with_files(&[("docs/reports/q1.txt", "q1")]);
    drive.run(Commands::Baseline, true).unwrap();

    let stored = SnapshotStore::new(drive.snapshot_path()).load().unwrap();
    assert!(stored.contains("docs/reports/q1.txt"));
}

#[test]
fn test_missing_root_is_an_error() {
    let drive = Drive::with_files(&[]);
    fs::remove_dir(drive.root()).unwrap();

    let result = drive.run(check(), true);

    assert!(matches!(
        result,
        Err(TidemarkError::RootDirectoryUnavailable { .. })
    ));
    drive
        .temp_dir
        .child("snapshot.json")
        .assert(predicate::path::missing());
}

#[test]
fn test_corrupt_baseline_is_kept_aside() {
    let drive = Drive::with_files(&[("a", "alpha")]);
    drive.temp_dir.child("snapshot.json").write_str("garbage").unwrap();

    let (outcome, _) = drive.run(check(), true).unwrap();

    assert!(matches!(
        outcome,
        CommandOutcome::Check(CheckOutcome::BaselineEstablished { .. })
    ));
    drive
        .temp_dir
        .child("snapshot.json.corrupt")
        .assert("garbage");
}

#[test]
fn test_no_update_check_leaves_corrupt_baseline_alone() {
    let drive = Drive::with_files(&[("a", "alpha")]);
    drive.temp_dir.child("snapshot.json").write_str("garbage").unwrap();

    let command = Commands::Check {
        yes: false,
        no_update: true,
    };
    let (outcome, _) = drive.run(command, true).unwrap();

    assert_eq!(
        outcome,
        CommandOutcome::Check(CheckOutcome::BaselineEstablished {
            files: 1,
            saved: false
        })
    );
    drive.temp_dir.child("snapshot.json").assert("garbage");
    drive
        .temp_dir
        .child("snapshot.json.corrupt")
        .assert(predicate::path::missing());
}

#[test]
fn test_legacy_snapshot_is_compared_and_upgraded() {
    let drive = Drive::with_files(&[("a", "alpha")]);
    let legacy = r#"{
        "a": {"size": 5, "mtime": 1.5, "hash": "0000"},
        "gone.txt": {"size": 1, "mtime": 2.0, "hash": "1111"}
    }"#;
    drive.temp_dir.child("snapshot.json").write_str(legacy).unwrap();

    let (outcome, _) = drive.run(check(), true).unwrap();

    let CommandOutcome::Check(CheckOutcome::Compared { diff, updated }) = outcome else {
        panic!("Expected a comparison, got: {outcome:?}");
    };
    assert!(diff.modified.contains("a"));
    assert!(diff.deleted.contains("gone.txt"));
    assert!(updated);
    drive
        .temp_dir
        .child("snapshot.json")
        .assert(predicate::str::contains("\"modifiedAt\""));
}

#[test]
fn test_legacy_float_mtime_matches_unchanged_file() {
    let drive = Drive::with_files(&[("hello.txt", "hello world")]);
    let mtime = FileTime::from_unix_time(1_700_000_000, 123_456_789);
    set_file_mtime(drive.file("hello.txt"), mtime).unwrap();

    // The legacy writer stored float seconds, which cannot hold every digit
    let legacy = r#"{
        "hello.txt": {
            "size": 11,
            "mtime": 1700000000.1234567,
            "hash": "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9"
        }
    }"#;
    drive.temp_dir.child("snapshot.json").write_str(legacy).unwrap();

    let (outcome, stdout) = drive.run(Commands::Status { exit_code: true }, true).unwrap();
    assert!(!outcome.has_changes(), "unexpected changes:\n{stdout}");
    assert!(!outcome.exit_with_failure());

    let (outcome, _) = drive.run(check(), true).unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::Check(CheckOutcome::Compared {
            diff: DiffResult::default(),
            updated: false,
        })
    );
    drive.temp_dir.child("snapshot.json").assert(legacy);

    // A real touch is still reported
    set_file_mtime(
        drive.file("hello.txt"),
        FileTime::from_unix_time(1_700_000_060, 0),
    )
    .unwrap();
    let (outcome, _) = drive.run(Commands::Status { exit_code: true }, true).unwrap();
    assert!(outcome.exit_with_failure());
}

#[test]
fn test_reset_then_check_starts_fresh() {
    let drive = Drive::with_files(&[("a", "alpha")]);
    drive.run(check(), true).unwrap();

    let (outcome, _) = drive.run(Commands::Reset, true).unwrap();
    assert_eq!(outcome, CommandOutcome::Reset { removed: true });

    drive.write("b", "bravo");
    let (outcome, _) = drive.run(check(), true).unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::Check(CheckOutcome::BaselineEstablished {
            files: 2,
            saved: true
        })
    );
}

#[test]
fn test_binary_status_exit_code() {
    let drive = Drive::with_files(&[("a", "alpha")]);
    drive.run(Commands::Baseline, true).unwrap();

    let clean = Command::new(binary())
        .arg("--root")
        .arg(drive.root())
        .arg("--snapshot")
        .arg(drive.snapshot_path())
        .args(["--quiet", "status", "--exit-code"])
        .output()
        .unwrap();
    assert!(clean.status.success());

    drive.write("b", "bravo");
    let dirty = Command::new(binary())
        .arg("--root")
        .arg(drive.root())
        .arg("--snapshot")
        .arg(drive.snapshot_path())
        .args(["--quiet", "status", "--exit-code"])
        .output()
        .unwrap();
    assert_eq!(dirty.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&dirty.stdout).contains("New files: 1\n - b\n"));
}

#[test]
fn test_binary_check_reads_answer_from_stdin() {
    let drive = Drive::with_files(&[("a", "alpha")]);
    drive.run(Commands::Baseline, true).unwrap();
    drive.write("b", "bravo");

    let mut child = Command::new(binary())
        .arg("--root")
        .arg(drive.root())
        .arg("--snapshot")
        .arg(drive.snapshot_path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"y\n").unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Update snapshot with current state?"));

    let stored = SnapshotStore::new(drive.snapshot_path()).load().unwrap();
    assert!(stored.contains("b"));
}

#[test]
fn test_binary_reports_missing_root() {
    let drive = Drive::with_files(&[]);

    let output = Command::new(binary())
        .arg("--root")
        .arg(drive.temp_dir.path().join("not-mounted"))
        .arg("--snapshot")
        .arg(drive.snapshot_path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unavailable"));
}
