//! Backup engine for snapvault
//!
//! Provides incremental mirroring of a photo library to one or more
//! destinations, with checksum verification, restore, and retention
//! cleanup on top of the same tree scan.
//!
//! # Architecture
//!
//! Everything hangs off [`BackupManager`], which owns the settings, the
//! exclusion-aware [`TreeScanner`], and the persistent [`ChecksumCache`].
//! Each operation builds on the same pieces:
//!
//! - `incremental_sync`: mirrors the library into every destination,
//!   copying only new or changed files and retiring orphans
//! - `verify_backups`: compares library and backup, by size and mtime
//!   (quick) or by content hash (full)
//! - `restore_from_backup`: copies files back out of a backup, with
//!   pattern filtering and overwrite control
//! - `cleanup_old_backups`: deletes backup files older than the
//!   retention window and purges expired trash batches
//! - `backup_status` / `list_backup_contents` / `restore_candidates`:
//!   read-only health and inventory views
//!
//! # Incremental model
//!
//! A file is copied when it is absent from the destination or when its
//! size differs or its mtime drifts by more than the two-second
//! tolerance. Unchanged files are skipped entirely, so the cost of a
//! sync scales with the amount of change, not the size of the library.
//!
//! # Trash
//!
//! Destructive steps move files into a `.snapvault_trash/<date>/` batch
//! inside the destination instead of deleting them outright, unless
//! trash is disabled in the settings. Cleanup purges whole batches once
//! their date falls out of the retention window.
//!
//! # Example
//!
//! ```rust,ignore
//! use snapvault::backup::{BackupManager, VerifyMode};
//! use snapvault::config::{Settings, SnapvaultPaths};
//!
//! let paths = SnapvaultPaths::new()?;
//! let settings = Settings::load(&paths, None)?;
//! let manager = BackupManager::new(settings, &paths);
//!
//! let sync = manager.incremental_sync(false)?;
//! println!("copied {} files", sync.total_copied());
//!
//! for report in manager.verify_backups(VerifyMode::Full)? {
//!     println!("{}: {:.1}%", report.destination.display(), report.integrity_score());
//! }
//! ```

mod cancel;
mod checksum;
mod cleanup;
mod compare;
mod engine;
mod fs_ops;
mod listing;
mod orchestrator;
mod record;
mod restore;
mod scanner;
mod status;
mod verify;

pub use cancel::CancelToken;
pub use checksum::{ChecksumCache, ChecksumEntry, HashAlgorithm};
pub use cleanup::{CleanupReport, DestinationCleanup};
pub use compare::MTIME_TOLERANCE;
pub use engine::DestinationSyncResult;
pub use fs_ops::TrashPurge;
pub use listing::{BackupListing, ListedFile, RestoreCandidates};
pub use orchestrator::{BackupManager, SyncReport};
pub use record::{FileRecord, TreeIndex};
pub use restore::{RestoreOptions, RestoreReport};
pub use scanner::{TreeScanner, TRASH_DIR_NAME};
pub use status::{DestinationState, DestinationStatus, OverallStatus, StatusReport};
pub use verify::{VerificationReport, VerifyMode};
