//! Persistent configuration for simtarget.
//!
//! Stores user settings in `~/.simtarget/config.json`: default device and OS
//! version, an optional saved inventory to use instead of querying the host,
//! and extra device aliases.
//!
//! # Example
//!
//! ```no_run
//! use simtarget_core::config::SimtargetConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = SimtargetConfig::load();
//!
//! if let Some(device) = &config.default_device {
//!     println!("Default device: {device}");
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_FILENAME: &str = "config.json";

/// Returns the simtarget data directory (`~/.simtarget/`).
///
/// Falls back to the current directory when no home directory is known.
pub fn simtarget_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".simtarget")
}

/// Persistent simtarget configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SimtargetConfig {
    /// Device alias used when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_device: Option<String>,

    /// OS version used when none is given; absent means latest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_os_version: Option<String>,

    /// Saved `xcrun simctl list devicetypes runtimes -j` output to read
    /// instead of querying the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_path: Option<PathBuf>,

    /// Extra `alias -> canonical device name` mappings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
}

impl SimtargetConfig {
    /// Path of the default config file.
    pub fn default_path() -> PathBuf {
        simtarget_dir().join(CONFIG_FILENAME)
    }

    /// Load config from `~/.simtarget/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Load config from an explicit path, with the same fallback as [`Self::load`].
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `~/.simtarget/config.json`.
    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_empty() {
        let config = SimtargetConfig::default();
        assert!(config.default_device.is_none());
        assert!(config.inventory_path.is_none());
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn deserialize_partial_json() {
        let loaded: SimtargetConfig =
            serde_json::from_str(r#"{"default_device": "iPhone 6", "aliases": {"six": "iPhone 6"}}"#)
                .unwrap();
        assert_eq!(loaded.default_device.as_deref(), Some("iPhone 6"));
        assert!(loaded.default_os_version.is_none());
        assert_eq!(loaded.aliases.get("six").map(String::as_str), Some("iPhone 6"));
    }

    #[test]
    fn save_then_load_from_explicit_path() {
        let path = std::env::temp_dir()
            .join(format!("simtarget-config-{}", std::process::id()))
            .join(CONFIG_FILENAME);
        let config = SimtargetConfig {
            default_device: Some("iPad Air".to_string()),
            default_os_version: Some("12.1".to_string()),
            inventory_path: Some(PathBuf::from("/tmp/inventory.json")),
            aliases: BTreeMap::new(),
        };
        config.save_to(&path).unwrap();
        assert_eq!(SimtargetConfig::load_from(&path), config);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn load_from_missing_file_returns_default() {
        let config = SimtargetConfig::load_from(Path::new("/nonexistent/simtarget/config.json"));
        assert_eq!(config, SimtargetConfig::default());
    }
}
