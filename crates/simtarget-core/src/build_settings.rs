//! Xcode build settings consumed at configuration time.
//!
//! Settings are read once and treated as immutable input. They supply the
//! test host and product bundle locations; they never influence which device
//! or SDK is chosen.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::arch::CpuType;

pub const TEST_HOST: &str = "TEST_HOST";
pub const BUILT_PRODUCTS_DIR: &str = "BUILT_PRODUCTS_DIR";
pub const FULL_PRODUCT_NAME: &str = "FULL_PRODUCT_NAME";
pub const ARCHS: &str = "ARCHS";

/// An immutable map of build-setting keys to values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildSettings(BTreeMap<String, String>);

#[derive(Deserialize)]
struct TargetSettings {
    #[serde(rename = "buildSettings")]
    build_settings: BTreeMap<String, String>,
}

impl BuildSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `xcodebuild -showBuildSettings` text output.
    ///
    /// Only indented `KEY = value` lines are read; section headers such as
    /// `Build settings for action test and target App:` are skipped. When a
    /// key repeats across targets the first occurrence wins.
    pub fn parse_show_build_settings(text: &str) -> Self {
        let mut map = BTreeMap::new();
        for line in text.lines() {
            if !line.starts_with(char::is_whitespace) {
                continue;
            }
            let Some((key, value)) = line.trim().split_once(" = ") else {
                continue;
            };
            map.entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
        Self(map)
    }

    /// Parses `xcodebuild -showBuildSettings -json` output, taking the first
    /// target's settings.
    pub fn from_json(json: &[u8]) -> Result<Self, serde_json::Error> {
        let targets: Vec<TargetSettings> = serde_json::from_slice(json)?;
        Ok(Self(
            targets
                .into_iter()
                .next()
                .map(|t| t.build_settings)
                .unwrap_or_default(),
        ))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn test_host(&self) -> Option<PathBuf> {
        self.get(TEST_HOST).map(PathBuf::from)
    }

    pub fn built_products_dir(&self) -> Option<PathBuf> {
        self.get(BUILT_PRODUCTS_DIR).map(PathBuf::from)
    }

    /// `BUILT_PRODUCTS_DIR/FULL_PRODUCT_NAME`, when both are set.
    pub fn product_bundle_path(&self) -> Option<PathBuf> {
        let dir = self.built_products_dir()?;
        let product = self.get(FULL_PRODUCT_NAME)?;
        Some(dir.join(product))
    }

    /// Architectures listed in `ARCHS`; names outside the simulator table are skipped.
    pub fn architectures(&self) -> Vec<CpuType> {
        self.get(ARCHS)
            .map(|archs| {
                archs
                    .split_whitespace()
                    .filter_map(CpuType::from_arch_name)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BuildSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_BUILD_SETTINGS: &str = "\
Build settings for action test and target AppTests:
    ARCHS = x86_64 armv7
    BUILT_PRODUCTS_DIR = /tmp/Build/Products/Debug-iphonesimulator
    FULL_PRODUCT_NAME = AppTests.xctest
    TEST_HOST = /tmp/Build/Products/Debug-iphonesimulator/App.app/App
    EMPTY_SETTING =

Build settings for action test and target App:
    FULL_PRODUCT_NAME = App.app
";

    #[test]
    fn parses_show_build_settings_text() {
        let settings = BuildSettings::parse_show_build_settings(SHOW_BUILD_SETTINGS);
        assert_eq!(settings.get(FULL_PRODUCT_NAME), Some("AppTests.xctest"));
        assert_eq!(
            settings.product_bundle_path(),
            Some(PathBuf::from(
                "/tmp/Build/Products/Debug-iphonesimulator/AppTests.xctest"
            ))
        );
        assert_eq!(
            settings.test_host(),
            Some(PathBuf::from(
                "/tmp/Build/Products/Debug-iphonesimulator/App.app/App"
            ))
        );
        assert_eq!(settings.architectures(), vec![CpuType::X86_64]);
        assert_eq!(settings.get("EMPTY_SETTING"), None);
    }

    #[test]
    fn parses_json_output() {
        let json = br#"[
            {
                "action": "test",
                "target": "AppTests",
                "buildSettings": {
                    "BUILT_PRODUCTS_DIR": "/build",
                    "FULL_PRODUCT_NAME": "AppTests.xctest"
                }
            }
        ]"#;
        let settings = BuildSettings::from_json(json).unwrap();
        assert_eq!(
            settings.product_bundle_path(),
            Some(PathBuf::from("/build/AppTests.xctest"))
        );
        assert!(settings.test_host().is_none());

        assert!(BuildSettings::from_json(b"[]").unwrap().is_empty());
        assert!(BuildSettings::from_json(b"{}").is_err());
    }

    #[test]
    fn product_bundle_needs_both_keys() {
        let settings: BuildSettings = [(BUILT_PRODUCTS_DIR, "/build")].into_iter().collect();
        assert!(settings.product_bundle_path().is_none());
        assert_eq!(settings.len(), 1);
    }
}
