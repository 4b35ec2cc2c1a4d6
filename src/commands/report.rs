//! Console output shared by the commands.

use std::io::{self, Write};

use crate::diff::DiffResult;
use crate::logging::Logger;
use crate::scanner::ScanReport;
use crate::size::format_size;

/// Writes the three labelled change lists.
pub(crate) fn write_diff(out: &mut dyn Write, diff: &DiffResult) -> io::Result<()> {
    writeln!(out, "==== Comparison Results ====")?;
    for (label, paths) in [
        ("Modified files", &diff.modified),
        ("Deleted files", &diff.deleted),
        ("New files", &diff.added),
    ] {
        writeln!(out, "{label}: {}", paths.len())?;
        for path in paths {
            writeln!(out, " - {path}")?;
        }
    }
    out.flush()
}

/// Logs what a scan captured and what it had to leave out.
pub(crate) fn log_scan_summary(log: &Logger, report: &ScanReport) {
    log.verbose(
        1,
        format!(
            "Captured {} files ({})",
            report.snapshot.len(),
            format_size(report.snapshot.total_size())
        ),
    );

    if report.symlinks > 0 {
        log.verbose(
            1,
            format!(
                "Skipped {} symbolic link{} (links are not followed)",
                report.symlinks,
                if report.symlinks == 1 { "" } else { "s" }
            ),
        );
    }

    if !report.skipped.is_empty() {
        log.verbose(
            1,
            format!(
                "Left out {} unreadable entr{} (use -vv to list them)",
                report.skipped.len(),
                if report.skipped.len() == 1 { "y" } else { "ies" }
            ),
        );
        for skipped in &report.skipped {
            log.verbose(
                2,
                format!(
                    "  {} ({}): {}",
                    skipped.path.display(),
                    skipped.reason,
                    skipped.detail
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_diff_format() {
        let mut diff = DiffResult::default();
        diff.modified.insert("a.txt".to_string());
        diff.added.insert("c.txt".to_string());
        diff.added.insert("b/d.txt".to_string());

        let mut out = Vec::new();
        write_diff(&mut out, &diff).unwrap();

        let expected = "\
==== Comparison Results ====
Modified files: 1
 - a.txt
Deleted files: 0
New files: 2
 - b/d.txt
 - c.txt
";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}
