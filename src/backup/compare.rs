//! File comparison rules
//!
//! Two levels of comparison: quick checks use size and mtime only, full
//! checks read content through the checksum cache. Mtimes are compared
//! with a tolerance because FAT and some network filesystems round them.

use std::time::{Duration, SystemTime};

use super::checksum::ChecksumCache;
use super::record::FileRecord;
use crate::error::SnapvaultError;

/// Slack allowed between equal mtimes
pub const MTIME_TOLERANCE: Duration = Duration::from_secs(2);

/// Whether two mtimes are equal within [`MTIME_TOLERANCE`]
pub fn mtimes_close(a: SystemTime, b: SystemTime) -> bool {
    let diff = match a.duration_since(b) {
        Ok(diff) => diff,
        Err(e) => e.duration(),
    };
    diff <= MTIME_TOLERANCE
}

/// Size and mtime agree; content is not read
pub fn quick_match(source: &FileRecord, backup: &FileRecord) -> bool {
    source.size == backup.size && mtimes_close(source.modified, backup.modified)
}

/// Size and content digest agree
///
/// A size mismatch short-circuits before any hashing.
pub fn full_match(
    source: &FileRecord,
    backup: &FileRecord,
    cache: &ChecksumCache,
) -> Result<bool, SnapvaultError> {
    if source.size != backup.size {
        return Ok(false);
    }
    let source_checksum = cache.checksum_for(source)?;
    let backup_checksum = cache.checksum_for(backup)?;
    Ok(source_checksum == backup_checksum)
}

/// Whether the backup copy must be rewritten, decided without hashing
///
/// A backup is stale when its size differs or its mtime drifts from the
/// source by more than the tolerance, in either direction. The source is
/// the authority even when its copy is older; a mirror carries the
/// source's bytes, not the newest bytes.
pub fn needs_update(source: &FileRecord, backup: &FileRecord) -> bool {
    source.size != backup.size || !mtimes_close(source.modified, backup.modified)
}
