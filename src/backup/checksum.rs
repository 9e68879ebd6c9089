//! Checksums and the persistent checksum cache
//!
//! Hashing whole photo libraries is the slowest part of verification, so
//! digests are cached keyed by absolute path. A cached digest is trusted
//! only while the file's size, mtime and the configured algorithm all
//! still match; anything else forces a rehash.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::digest::Output;
use sha2::{Digest, Sha256, Sha512};
use tracing::{debug, warn};

use super::record::FileRecord;
use crate::error::SnapvaultError;

/// Read size for streaming digests
const DIGEST_BLOCK_SIZE: usize = 64 * 1024;

/// Digest algorithm for full-content comparisons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
    Blake3,
}

impl HashAlgorithm {
    /// Lowercase name, matching the config and cache encoding
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Stream `path` through the algorithm and return the hex digest
    pub fn digest_file(&self, path: &Path) -> Result<String, SnapvaultError> {
        let file = File::open(path)
            .map_err(|e| SnapvaultError::checksum(path, format!("open failed: {}", e)))?;
        let mut reader = BufReader::new(file);

        let result = match self {
            HashAlgorithm::Sha256 => digest_reader::<Sha256>(&mut reader),
            HashAlgorithm::Sha512 => digest_reader::<Sha512>(&mut reader),
            HashAlgorithm::Blake3 => blake3_reader(&mut reader),
        };
        result.map_err(|e| SnapvaultError::checksum(path, format!("read failed: {}", e)))
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn digest_reader<D>(reader: &mut impl Read) -> std::io::Result<String>
where
    D: Digest,
    Output<D>: core::fmt::LowerHex,
{
    let mut hasher = D::new();
    let mut buffer = vec![0u8; DIGEST_BLOCK_SIZE];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn blake3_reader(reader: &mut impl Read) -> std::io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; DIGEST_BLOCK_SIZE];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// One cached digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumEntry {
    /// Hex digest of the file content
    pub checksum: String,
    /// Size/mtime signature the digest was computed under
    pub signature: String,
    /// Algorithm that produced the digest
    pub algorithm: HashAlgorithm,
    /// When the digest was computed
    pub calculated_at: DateTime<Utc>,
}

/// Persistent digest cache keyed by absolute path
///
/// Loading is best-effort: a missing or unreadable cache file just means
/// starting cold, never a failed backup. Saving rewrites the whole file
/// atomically through a temp file.
#[derive(Debug)]
pub struct ChecksumCache {
    path: PathBuf,
    algorithm: HashAlgorithm,
    entries: Mutex<HashMap<PathBuf, ChecksumEntry>>,
}

impl ChecksumCache {
    /// Load the cache from `path`, starting empty if it is absent or broken
    pub fn load(path: PathBuf, algorithm: HashAlgorithm) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Checksum cache is corrupt, starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Checksum cache is unreadable, starting empty"
                );
                HashMap::new()
            }
        };

        Self {
            path,
            algorithm,
            entries: Mutex::new(entries),
        }
    }

    /// Digest for `record`, from cache when still valid
    ///
    /// A cached entry is reused only when its signature matches the
    /// record and it was computed with the configured algorithm.
    pub fn checksum_for(&self, record: &FileRecord) -> Result<String, SnapvaultError> {
        let signature = record.signature();

        {
            let entries = self.lock();
            if let Some(entry) = entries.get(&record.absolute_path) {
                if entry.signature == signature && entry.algorithm == self.algorithm {
                    return Ok(entry.checksum.clone());
                }
            }
        }

        debug!(path = %record.absolute_path.display(), "Computing checksum");
        let checksum = self.algorithm.digest_file(&record.absolute_path)?;

        let mut entries = self.lock();
        entries.insert(
            record.absolute_path.clone(),
            ChecksumEntry {
                checksum: checksum.clone(),
                signature,
                algorithm: self.algorithm,
                calculated_at: Utc::now(),
            },
        );
        Ok(checksum)
    }

    /// Number of cached digests
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no digests
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Persist the cache atomically
    pub fn save(&self) -> Result<(), SnapvaultError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SnapvaultError::Io(format!(
                    "Failed to create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = {
            let entries = self.lock();
            serde_json::to_string_pretty(&*entries)?
        };

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json).map_err(|e| {
            SnapvaultError::Io(format!(
                "Failed to write checksum cache {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            SnapvaultError::Io(format!(
                "Failed to replace checksum cache {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, ChecksumEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record_at(root: &Path, name: &str, contents: &[u8]) -> FileRecord {
        let absolute = root.join(name);
        fs::write(&absolute, contents).unwrap();
        let metadata = fs::metadata(&absolute).unwrap();
        FileRecord::new(root, absolute, &metadata).unwrap()
    }

    #[test]
    fn test_sha256_known_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, b"hello").unwrap();

        let digest = HashAlgorithm::Sha256.digest_file(&path).unwrap();
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_digest_lengths_per_algorithm() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");
        fs::write(&path, b"snapvault").unwrap();

        assert_eq!(HashAlgorithm::Sha256.digest_file(&path).unwrap().len(), 64);
        assert_eq!(HashAlgorithm::Sha512.digest_file(&path).unwrap().len(), 128);
        assert_eq!(HashAlgorithm::Blake3.digest_file(&path).unwrap().len(), 64);
    }

    #[test]
    fn test_digest_missing_file_fails() {
        let dir = tempdir().unwrap();
        let result = HashAlgorithm::Sha256.digest_file(&dir.path().join("gone.jpg"));
        assert!(matches!(result, Err(SnapvaultError::Checksum { .. })));
    }

    #[test]
    fn test_cache_hit_skips_rehash() {
        let dir = tempdir().unwrap();
        let cache = ChecksumCache::load(dir.path().join("cache.json"), HashAlgorithm::Sha256);

        let record = record_at(dir.path(), "a.jpg", b"aaaa");
        let first = cache.checksum_for(&record).unwrap();

        // Same size, different content; restoring the mtime makes the
        // signature identical, so the stale digest comes back. That is
        // the documented trade of signature-based caching.
        fs::write(&record.absolute_path, b"bbbb").unwrap();
        let file = fs::OpenOptions::new()
            .write(true)
            .open(&record.absolute_path)
            .unwrap();
        file.set_modified(record.modified).unwrap();

        let second = cache.checksum_for(&record).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_changed_signature_forces_rehash() {
        let dir = tempdir().unwrap();
        let cache = ChecksumCache::load(dir.path().join("cache.json"), HashAlgorithm::Sha256);

        let record = record_at(dir.path(), "a.jpg", b"first");
        let first = cache.checksum_for(&record).unwrap();

        let record = record_at(dir.path(), "a.jpg", b"second version");
        let second = cache.checksum_for(&record).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_algorithm_change_invalidates_entries() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");
        let record = record_at(dir.path(), "a.jpg", b"stable bytes");

        let cache = ChecksumCache::load(cache_path.clone(), HashAlgorithm::Sha256);
        let sha = cache.checksum_for(&record).unwrap();
        cache.save().unwrap();

        let cache = ChecksumCache::load(cache_path, HashAlgorithm::Blake3);
        let blake = cache.checksum_for(&record).unwrap();
        assert_ne!(sha, blake);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");

        let cache = ChecksumCache::load(cache_path.clone(), HashAlgorithm::Sha256);
        let record = record_at(dir.path(), "a.jpg", b"payload");
        cache.checksum_for(&record).unwrap();
        cache.save().unwrap();

        let reloaded = ChecksumCache::load(cache_path, HashAlgorithm::Sha256);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_corrupt_cache_file_starts_empty() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("cache.json");
        fs::write(&cache_path, b"{ not json").unwrap();

        let cache = ChecksumCache::load(cache_path, HashAlgorithm::Sha256);
        assert!(cache.is_empty());
    }
}
