//! snapvault - incremental backup for organized photo libraries
//!
//! This library provides the core functionality for the snapvault CLI.
//! It mirrors an organized photo/video library into one or more backup
//! destinations, copying only what changed, and can verify, restore and
//! prune those backups afterwards.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration files and path management
//! - `error`: Custom error types
//! - `backup`: Scanner, sync engine, verification, restore and cleanup
//! - `display`: Report rendering for terminal output
//! - `cli`: Command handlers bridging clap and the backup engine
//! - `logging`: Tracing subscriber setup for the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use snapvault::backup::BackupManager;
//! use snapvault::config::{Settings, SnapvaultPaths};
//!
//! let paths = SnapvaultPaths::new()?;
//! let settings = Settings::load(&paths, None)?;
//!
//! let manager = BackupManager::new(settings, &paths);
//! let report = manager.incremental_sync(false)?;
//! println!("{} files copied", report.total_copied());
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;

pub use error::{SnapvaultError, SnapvaultResult};
