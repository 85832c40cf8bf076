//! Installed simulator runtimes.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::version::OsVersion;

/// The OS a runtime provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    TvOs,
    WatchOs,
}

impl Platform {
    /// Parses the platform prefix of a runtime name such as "iOS 12.1".
    pub fn from_runtime_name(name: &str) -> Option<Self> {
        match name.split_whitespace().next()? {
            "iOS" => Some(Platform::Ios),
            "tvOS" => Some(Platform::TvOs),
            "watchOS" => Some(Platform::WatchOs),
            _ => None,
        }
    }

    /// Prefix of the simulator SDK name, e.g. `iphonesimulator`.
    pub const fn sdk_prefix(self) -> &'static str {
        match self {
            Platform::Ios => "iphonesimulator",
            Platform::TvOs => "appletvsimulator",
            Platform::WatchOs => "watchsimulator",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Ios => "iOS",
            Platform::TvOs => "tvOS",
            Platform::WatchOs => "watchOS",
        };
        f.write_str(name)
    }
}

/// A simulator runtime known to the host.
///
/// `version` is the full version ("12.1.1"); the SDK short version
/// ("12.1") is derived from it. A descriptor may describe a runtime that
/// exists in the inventory but cannot currently be used, in which case
/// `is_available` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeDescriptor {
    /// e.g. `com.apple.CoreSimulator.SimRuntime.iOS-12-1`
    pub identifier: String,

    /// Display name, e.g. "iOS 12.1".
    pub name: String,

    pub version: OsVersion,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_version: Option<String>,

    pub platform: Platform,

    /// Filesystem root of the runtime's support files.
    pub root: PathBuf,

    pub is_available: bool,
}

impl RuntimeDescriptor {
    pub fn new(
        identifier: impl Into<String>,
        version: OsVersion,
        platform: Platform,
        root: impl Into<PathBuf>,
        is_available: bool,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: format!("{} {}", platform, version),
            version,
            build_version: None,
            platform,
            root: root.into(),
            is_available,
        }
    }

    pub fn with_build_version(mut self, build: impl Into<String>) -> Self {
        self.build_version = Some(build.into());
        self
    }

    /// The SDK short version this runtime provides.
    pub fn short_version(&self) -> OsVersion {
        self.version.to_short()
    }

    /// SDK name as passed to `xcodebuild -sdk`, e.g. `iphonesimulator12.1`.
    pub fn sdk_name(&self) -> String {
        format!("{}{}", self.platform.sdk_prefix(), self.version.short())
    }
}
