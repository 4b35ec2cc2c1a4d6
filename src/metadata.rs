use std::path::Path;

use crate::error::{Result, TidemarkError};
use crate::timestamp::system_time_to_nanos;

/// Size and modification time of one file as seen by `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    /// Size of the file in bytes
    pub size: u64,
    /// Modification time in nanoseconds since UNIX_EPOCH
    pub modified_at: u128,
}

/// Reads size and modification time for a single path.
///
/// Returns `None` whenever the path cannot be stat'ed: it vanished, access was
/// denied, or the platform does not report modification times. Callers skip
/// the file instead of aborting.
pub fn read_metadata(path: &Path) -> Option<FileMetadata> {
    try_read_metadata(path).ok()
}

/// Like [`read_metadata`] but keeps the cause, for diagnostics.
///
/// Symbolic links are not followed; the link itself is stat'ed.
///
/// # Errors
///
/// Returns [`TidemarkError::PathUnavailable`] if the stat call or the mtime
/// lookup fails.
pub fn try_read_metadata(path: &Path) -> Result<FileMetadata> {
    let unavailable = |source| TidemarkError::PathUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let metadata = std::fs::symlink_metadata(path).map_err(unavailable)?;
    let modified = metadata.modified().map_err(unavailable)?;

    Ok(FileMetadata {
        size: metadata.len(),
        modified_at: system_time_to_nanos(modified),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use filetime::{FileTime, set_file_mtime};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_read_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("sized.txt");
        fs::write(&test_file, "hello world").unwrap();
        set_file_mtime(&test_file, FileTime::from_unix_time(1_700_000_000, 500)).unwrap();

        let metadata = read_metadata(&test_file).unwrap();
        assert_eq!(metadata.size, 11);
        assert_eq!(metadata.modified_at, 1_700_000_000_000_000_500);
    }

    #[test]
    fn test_read_metadata_missing_file_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_metadata(&temp_dir.path().join("gone.txt")).is_none());
    }

    #[test]
    fn test_try_read_metadata_keeps_cause() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone.txt");

        match try_read_metadata(&missing) {
            Err(TidemarkError::PathUnavailable { path, source }) => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("Expected PathUnavailable, got: {other:?}"),
        }
    }

    #[test]
    fn test_read_metadata_tracks_mtime_changes() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("touched.txt");
        fs::write(&test_file, "content").unwrap();

        set_file_mtime(&test_file, FileTime::from_unix_time(100, 0)).unwrap();
        let before = read_metadata(&test_file).unwrap();
        set_file_mtime(&test_file, FileTime::from_unix_time(200, 0)).unwrap();
        let after = read_metadata(&test_file).unwrap();

        assert_eq!(before.size, after.size);
        assert!(after.modified_at > before.modified_at);
    }
}
