//! Path management for snapvault
//!
//! Provides XDG-compliant path resolution for configuration and the
//! persisted checksum cache.
//!
//! ## Path Resolution Order
//!
//! 1. `SNAPVAULT_CONFIG_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/snapvault` or `~/.config/snapvault`
//! 3. Windows: `%APPDATA%\snapvault`

use std::path::PathBuf;

use crate::error::SnapvaultError;

/// Manages all paths used by snapvault
#[derive(Debug, Clone)]
pub struct SnapvaultPaths {
    /// Base directory for all snapvault state
    base_dir: PathBuf,
}

impl SnapvaultPaths {
    /// Create a new SnapvaultPaths instance
    ///
    /// Path resolution:
    /// 1. `SNAPVAULT_CONFIG_DIR` env var (explicit override)
    /// 2. Unix: `$XDG_CONFIG_HOME/snapvault` or `~/.config/snapvault`
    /// 3. Windows: `%APPDATA%\snapvault`
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SnapvaultError> {
        let base_dir = if let Ok(custom) = std::env::var("SNAPVAULT_CONFIG_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create SnapvaultPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/snapvault/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the user configuration file
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.yaml")
    }

    /// Get the path to the checksum cache file
    ///
    /// The file name is configurable (`backup.checksum_cache`); the file
    /// itself lives in the snapvault base directory so it never has to sit
    /// inside a library or backup tree. The scanner still excludes the name
    /// wherever it appears.
    pub fn checksum_cache_file(&self, file_name: &str) -> PathBuf {
        self.base_dir.join(file_name)
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), SnapvaultError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SnapvaultError::Io(format!("Failed to create base directory: {}", e)))?;

        Ok(())
    }

    /// Check if snapvault has been configured (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.config_file().exists()
    }
}

/// Resolve the default configuration directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, SnapvaultError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| {
            std::env::var("HOME").map(|home| PathBuf::from(home).join(".config"))
        })
        .map_err(|_| SnapvaultError::Config("Could not determine home directory".into()))?;
    Ok(config_base.join("snapvault"))
}

/// Resolve the default configuration directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, SnapvaultError> {
    // Windows: Use APPDATA
    let appdata = std::env::var("APPDATA")
        .map_err(|_| SnapvaultError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("snapvault"))
}
