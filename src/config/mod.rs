//! Configuration module for snapvault
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Layered YAML settings (defaults, user file, explicit file, CLI)

pub mod paths;
pub mod settings;

pub use paths::SnapvaultPaths;
pub use settings::{Settings, SettingsOverrides};
