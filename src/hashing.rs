use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, TidemarkError};

/// Number of leading bytes hashed per file unless configured otherwise (1
/// MiB).
pub const DEFAULT_MAX_HASH_BYTES: u64 = 1024 * 1024;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Content hash algorithm used for fingerprints.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256, the default and the algorithm of legacy snapshots.
    #[default]
    Sha256,
    /// BLAKE3, faster on large prefixes.
    Blake3,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha256 => f.write_str("sha256"),
            HashAlgorithm::Blake3 => f.write_str("blake3"),
        }
    }
}

/// How the hashes of a snapshot were produced.
///
/// Hashes are only comparable between snapshots that share the same spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintSpec {
    /// Hash algorithm
    pub algorithm: HashAlgorithm,
    /// Maximum number of leading bytes fed to the hash
    pub max_bytes: u64,
}

impl Default for FingerprintSpec {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            max_bytes: DEFAULT_MAX_HASH_BYTES,
        }
    }
}

impl fmt::Display for FingerprintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} over the first {} bytes", self.algorithm, self.max_bytes)
    }
}

enum PrefixHasher {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl PrefixHasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => PrefixHasher::Sha256(Sha256::new()),
            HashAlgorithm::Blake3 => PrefixHasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            PrefixHasher::Sha256(hasher) => hasher.update(bytes),
            PrefixHasher::Blake3(hasher) => {
                hasher.update(bytes);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            PrefixHasher::Sha256(hasher) => hex::encode(hasher.finalize()),
            PrefixHasher::Blake3(hasher) => hasher.finalize().to_hex().to_string(),
        }
    }
}

/// Computes the bounded-prefix fingerprint of a file.
///
/// Only the first `spec.max_bytes` bytes are hashed. Two files that agree on
/// that prefix and differ afterwards get the same fingerprint. This is a
/// trade-off for scan speed on large volumes; raise `max_bytes` (or set it to
/// `u64::MAX`) to hash whole files.
///
/// # Returns
///
/// The lowercase hex digest of the prefix.
///
/// # Errors
///
/// Returns [`TidemarkError::ReadError`] if the file cannot be opened or read.
pub fn fingerprint(path: &Path, spec: &FingerprintSpec) -> Result<String> {
    let read_error = |source| TidemarkError::ReadError {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let mut reader = file.take(spec.max_bytes);
    let mut hasher = PrefixHasher::new(spec.algorithm);
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(read_error(source)),
        }
    }

    Ok(hasher.finalize_hex())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn sha256_spec(max_bytes: u64) -> FingerprintSpec {
        FingerprintSpec {
            algorithm: HashAlgorithm::Sha256,
            max_bytes,
        }
    }

    #[test]
    fn test_fingerprint_sha256() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.txt");
        fs::write(&test_file, "hello world").unwrap();

        let hash = fingerprint(&test_file, &FingerprintSpec::default()).unwrap();
        // SHA-256 of "hello world"
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_fingerprint_blake3() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.txt");
        fs::write(&test_file, "hello world").unwrap();

        let spec = FingerprintSpec {
            algorithm: HashAlgorithm::Blake3,
            max_bytes: DEFAULT_MAX_HASH_BYTES,
        };
        let hash = fingerprint(&test_file, &spec).unwrap();
        // BLAKE3 hash of "hello world"
        assert_eq!(
            hash,
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn test_fingerprint_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("empty.txt");
        fs::write(&test_file, "").unwrap();

        let hash = fingerprint(&test_file, &FingerprintSpec::default()).unwrap();
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fingerprint_hashes_only_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.txt");
        fs::write(&test_file, "hello world").unwrap();

        let hash = fingerprint(&test_file, &sha256_spec(5)).unwrap();
        // SHA-256 of "hello"
        assert_eq!(
            hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_files_sharing_first_mebibyte_fingerprint_equal() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.bin");
        let second = temp_dir.path().join("second.bin");

        let mut prefix = vec![0x5a_u8; DEFAULT_MAX_HASH_BYTES as usize];
        let mut first_content = prefix.clone();
        first_content.extend_from_slice(b"tail one");
        prefix.extend_from_slice(b"a different and longer tail");
        fs::write(&first, &first_content).unwrap();
        fs::write(&second, &prefix).unwrap();

        let spec = FingerprintSpec::default();
        assert_eq!(
            fingerprint(&first, &spec).unwrap(),
            fingerprint(&second, &spec).unwrap()
        );

        // Hashing past the shared prefix tells them apart
        let full = sha256_spec(u64::MAX);
        assert_ne!(
            fingerprint(&first, &full).unwrap(),
            fingerprint(&second, &full).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_nonexistent_file() {
        let result = fingerprint(
            Path::new("/nonexistent/file"),
            &FingerprintSpec::default(),
        );
        assert!(matches!(result, Err(TidemarkError::ReadError { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_fingerprint_directory_is_read_error() {
        let temp_dir = TempDir::new().unwrap();

        let result = fingerprint(temp_dir.path(), &FingerprintSpec::default());
        assert!(matches!(result, Err(TidemarkError::ReadError { .. })));
    }

    #[test]
    fn test_fingerprint_spec_display() {
        assert_eq!(
            FingerprintSpec::default().to_string(),
            "sha256 over the first 1048576 bytes"
        );
    }
}
