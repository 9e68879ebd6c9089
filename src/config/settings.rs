//! User settings for snapvault
//!
//! Settings are stored as YAML and merged in layers: built-in defaults,
//! then the user config file, then an explicit `--config` file, then CLI
//! overrides. Later layers win key-by-key, so a partial file only has to
//! name what it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::paths::SnapvaultPaths;
use crate::backup::HashAlgorithm;
use crate::error::SnapvaultError;

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// The organized library tree that backups mirror
    #[serde(default = "default_source_directory")]
    pub source_directory: PathBuf,

    /// Plan and report actions without touching the filesystem
    #[serde(default)]
    pub dry_run: bool,

    /// Verbose log output
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            source_directory: default_source_directory(),
            dry_run: false,
            verbose: false,
        }
    }
}

/// Backup subsystem settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSettings {
    /// Destination trees that mirror the library
    #[serde(default)]
    pub destinations: Vec<PathBuf>,

    /// Substring patterns; any file whose absolute path contains one is
    /// ignored by scans
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Move deleted files to a recoverable trash directory instead of
    /// unlinking them
    #[serde(default = "default_use_trash")]
    pub use_trash: bool,

    /// File name of the persisted checksum cache
    ///
    /// Also a fixed scan exclusion, so the cache is never mistaken for
    /// library content.
    #[serde(default = "default_checksum_cache")]
    pub checksum_cache: String,

    /// Digest algorithm used for full comparisons
    #[serde(default)]
    pub checksum_algorithm: HashAlgorithm,

    /// Run a quick verification pass after each sync
    #[serde(default = "default_enable_verification")]
    pub enable_verification: bool,

    /// Retention window for `cleanup`, in days
    #[serde(default = "default_keep_days")]
    pub keep_days: u32,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            destinations: Vec::new(),
            exclude_patterns: Vec::new(),
            use_trash: default_use_trash(),
            checksum_cache: default_checksum_cache(),
            checksum_algorithm: HashAlgorithm::default(),
            enable_verification: default_enable_verification(),
            keep_days: default_keep_days(),
        }
    }
}

/// User settings for snapvault
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General application settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Backup subsystem settings
    #[serde(default)]
    pub backup: BackupSettings,
}

fn default_source_directory() -> PathBuf {
    PathBuf::from("./organized")
}

fn default_use_trash() -> bool {
    true
}

fn default_checksum_cache() -> String {
    ".snapvault_checksums.json".to_string()
}

fn default_enable_verification() -> bool {
    true
}

fn default_keep_days() -> u32 {
    30
}

/// Values the CLI may override after config files are merged
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Override for `general.source_directory`
    pub source: Option<PathBuf>,
    /// Override for `general.dry_run`
    pub dry_run: Option<bool>,
    /// Override for `general.verbose`
    pub verbose: Option<bool>,
}

impl Settings {
    /// Load settings by merging defaults, the user config file, and an
    /// optional explicit config file
    ///
    /// Missing files are skipped; a file that exists but fails to parse is
    /// an error (silently ignoring a broken config hides real mistakes).
    pub fn load(
        paths: &SnapvaultPaths,
        custom_config: Option<&Path>,
    ) -> Result<Self, SnapvaultError> {
        let mut merged = serde_yaml::to_value(Settings::default())?;

        let user_file = paths.config_file();
        if user_file.exists() {
            let value = read_yaml_value(&user_file)?;
            merged = merge_values(merged, value);
        }

        if let Some(custom) = custom_config {
            if !custom.exists() {
                return Err(SnapvaultError::Config(format!(
                    "Config file not found: {}",
                    custom.display()
                )));
            }
            let value = read_yaml_value(custom)?;
            merged = merge_values(merged, value);
        }

        let settings: Settings = serde_yaml::from_value(merged)?;
        Ok(settings)
    }

    /// Apply CLI overrides on top of the merged configuration
    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(source) = &overrides.source {
            self.general.source_directory = source.clone();
        }
        if let Some(dry_run) = overrides.dry_run {
            self.general.dry_run = dry_run;
        }
        if let Some(verbose) = overrides.verbose {
            self.general.verbose = verbose;
        }
    }

    /// Save settings to the user config file
    pub fn save(&self, paths: &SnapvaultPaths) -> Result<(), SnapvaultError> {
        paths.ensure_directories()?;

        let contents = serde_yaml::to_string(self)?;
        std::fs::write(paths.config_file(), contents)
            .map_err(|e| SnapvaultError::Io(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

/// Read a YAML file into a generic value
fn read_yaml_value(path: &Path) -> Result<serde_yaml::Value, SnapvaultError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| SnapvaultError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    serde_yaml::from_str(&contents)
        .map_err(|e| SnapvaultError::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Recursively merge two YAML values; mapping keys from `over` win
fn merge_values(base: serde_yaml::Value, over: serde_yaml::Value) -> serde_yaml::Value {
    use serde_yaml::Value;

    match (base, over) {
        (Value::Mapping(mut base_map), Value::Mapping(over_map)) => {
            for (key, over_value) in over_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => merge_values(base_value, over_value),
                    None => over_value,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        // Scalars, sequences and mismatched shapes: the override replaces
        // the base value wholesale.
        (_, over) => over,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.general.source_directory, PathBuf::from("./organized"));
        assert!(!settings.general.dry_run);
        assert!(settings.backup.destinations.is_empty());
        assert!(settings.backup.use_trash);
        assert_eq!(settings.backup.checksum_cache, ".snapvault_checksums.json");
        assert_eq!(settings.backup.checksum_algorithm, HashAlgorithm::Sha256);
        assert_eq!(settings.backup.keep_days, 30);
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SnapvaultPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings::load(&paths, None).unwrap();
        assert!(settings.backup.destinations.is_empty());
        assert!(settings.backup.enable_verification);
    }

    #[test]
    fn test_partial_user_config_merges_over_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SnapvaultPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        std::fs::write(
            paths.config_file(),
            "backup:\n  destinations:\n    - /mnt/backup-a\n  use_trash: false\n",
        )
        .unwrap();

        let settings = Settings::load(&paths, None).unwrap();
        assert_eq!(
            settings.backup.destinations,
            vec![PathBuf::from("/mnt/backup-a")]
        );
        assert!(!settings.backup.use_trash);
        // Untouched keys keep their defaults.
        assert_eq!(settings.backup.keep_days, 30);
        assert_eq!(settings.general.source_directory, PathBuf::from("./organized"));
    }

    #[test]
    fn test_custom_config_wins_over_user_config() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SnapvaultPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        std::fs::write(
            paths.config_file(),
            "backup:\n  keep_days: 10\n  use_trash: false\n",
        )
        .unwrap();

        let custom = temp_dir.path().join("job.yaml");
        std::fs::write(&custom, "backup:\n  keep_days: 90\n").unwrap();

        let settings = Settings::load(&paths, Some(&custom)).unwrap();
        assert_eq!(settings.backup.keep_days, 90);
        // Keys absent from the custom file survive from the user layer.
        assert!(!settings.backup.use_trash);
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SnapvaultPaths::with_base_dir(temp_dir.path().to_path_buf());

        let result = Settings::load(&paths, Some(Path::new("/no/such/config.yaml")));
        assert!(matches!(result, Err(SnapvaultError::Config(_))));
    }

    #[test]
    fn test_invalid_user_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SnapvaultPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        std::fs::write(paths.config_file(), "backup: [not, a, mapping\n").unwrap();

        assert!(Settings::load(&paths, None).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(&SettingsOverrides {
            source: Some(PathBuf::from("/photos/library")),
            dry_run: Some(true),
            verbose: None,
        });

        assert_eq!(
            settings.general.source_directory,
            PathBuf::from("/photos/library")
        );
        assert!(settings.general.dry_run);
        assert!(!settings.general.verbose);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SnapvaultPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.backup.destinations.push(PathBuf::from("/mnt/backup-a"));
        settings.backup.checksum_algorithm = HashAlgorithm::Blake3;
        settings.save(&paths).unwrap();

        let loaded = Settings::load(&paths, None).unwrap();
        assert_eq!(loaded.backup.destinations, settings.backup.destinations);
        assert_eq!(loaded.backup.checksum_algorithm, HashAlgorithm::Blake3);
    }
}
