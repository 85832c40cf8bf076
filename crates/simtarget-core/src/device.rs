//! Simulated hardware profiles.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arch::CpuType;
use crate::runtime::{Platform, RuntimeDescriptor};
use crate::version::OsVersion;

/// Device types whose simulated hardware only runs 32-bit code.
const LEGACY_32_BIT_DEVICES: &[&str] = &[
    "iPhone 4s",
    "iPhone 5",
    "iPhone 5c",
    "iPad 2",
    "iPad Retina",
];

/// Hardware class of a simulated device.
///
/// The integer code is what a launched test host reads to pick its UI idiom
/// (`UIDeviceFamily` in Info.plist terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceFamily {
    Phone,
    Tablet,
    Tv,
    Watch,
}

impl DeviceFamily {
    pub const fn code(self) -> u8 {
        match self {
            DeviceFamily::Phone => 1,
            DeviceFamily::Tablet => 2,
            DeviceFamily::Tv => 3,
            DeviceFamily::Watch => 4,
        }
    }

    /// Parses simctl's `productFamily` value.
    pub fn from_product_family(family: &str) -> Option<Self> {
        match family {
            "iPhone" => Some(DeviceFamily::Phone),
            "iPad" => Some(DeviceFamily::Tablet),
            "Apple TV" => Some(DeviceFamily::Tv),
            "Apple Watch" => Some(DeviceFamily::Watch),
            _ => None,
        }
    }

    /// The OS platform this hardware class runs.
    pub const fn platform(self) -> Platform {
        match self {
            DeviceFamily::Phone | DeviceFamily::Tablet => Platform::Ios,
            DeviceFamily::Tv => Platform::TvOs,
            DeviceFamily::Watch => Platform::WatchOs,
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceFamily::Phone => "iPhone",
            DeviceFamily::Tablet => "iPad",
            DeviceFamily::Tv => "Apple TV",
            DeviceFamily::Watch => "Apple Watch",
        };
        f.write_str(name)
    }
}

/// An installed simulator device type.
///
/// Profiles are immutable once the catalog has been built from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Canonical device name, e.g. "iPhone 6".
    pub name: String,

    /// Device type identifier, e.g. "com.apple.CoreSimulator.SimDeviceType.iPhone-6".
    pub identifier: String,

    /// Every name this device answers to, canonical name included.
    pub aliases: BTreeSet<String>,

    pub cpu_type: CpuType,

    pub family: DeviceFamily,

    /// Oldest SDK short version the device type accepts.
    pub min_sdk: OsVersion,

    /// Newest SDK short version the device type accepts. Runtimes are
    /// checked by their short version, so 12.4.1 fits a 12.4 maximum.
    pub max_sdk: OsVersion,
}

impl DeviceProfile {
    /// Creates a profile whose alias set holds the canonical name, the
    /// identifier and the identifier's trailing component.
    pub fn new(
        name: impl Into<String>,
        identifier: impl Into<String>,
        family: DeviceFamily,
        cpu_type: CpuType,
        min_sdk: OsVersion,
        max_sdk: OsVersion,
    ) -> Self {
        let name = name.into();
        let identifier = identifier.into();

        let mut aliases = BTreeSet::new();
        aliases.insert(name.clone());
        if !identifier.is_empty() {
            aliases.insert(identifier.clone());
            if let Some((_, short)) = identifier.rsplit_once('.') {
                aliases.insert(short.to_string());
            }
        }

        Self {
            name,
            identifier,
            aliases,
            cpu_type,
            family,
            min_sdk,
            max_sdk,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.insert(alias.into());
        self
    }

    /// The CPU a device type simulates when the inventory does not say.
    pub fn default_cpu_type(name: &str) -> CpuType {
        if LEGACY_32_BIT_DEVICES.contains(&name) {
            CpuType::I386
        } else {
            CpuType::host_simulator_default()
        }
    }

    /// Whether this device type can boot the given runtime.
    pub fn supports(&self, runtime: &RuntimeDescriptor) -> bool {
        let sdk = runtime.short_version();
        self.family.platform() == runtime.platform
            && sdk >= self.min_sdk.to_short()
            && sdk <= self.max_sdk.to_short()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn iphone_6() -> DeviceProfile {
        DeviceProfile::new(
            "iPhone 6",
            "com.apple.CoreSimulator.SimDeviceType.iPhone-6",
            DeviceFamily::Phone,
            CpuType::X86_64,
            OsVersion::new(8, 0, 0),
            OsVersion::new(12, 4, 0),
        )
    }

    fn runtime(platform: Platform, version: &str) -> RuntimeDescriptor {
        RuntimeDescriptor::new(
            format!("com.apple.CoreSimulator.SimRuntime.test-{version}"),
            OsVersion::parse(version).unwrap(),
            platform,
            PathBuf::from("/runtime"),
            true,
        )
    }

    #[test]
    fn aliases_include_name_and_identifier_forms() {
        let device = iphone_6();
        assert!(device.aliases.contains("iPhone 6"));
        assert!(device
            .aliases
            .contains("com.apple.CoreSimulator.SimDeviceType.iPhone-6"));
        assert!(device.aliases.contains("iPhone-6"));
        assert_eq!(device.aliases.len(), 3);
    }

    #[test]
    fn family_codes() {
        assert_eq!(DeviceFamily::Phone.code(), 1);
        assert_eq!(DeviceFamily::Tablet.code(), 2);
        assert_eq!(
            DeviceFamily::from_product_family("iPad"),
            Some(DeviceFamily::Tablet)
        );
        assert_eq!(DeviceFamily::from_product_family("Vision"), None);
    }

    #[test]
    fn legacy_devices_default_to_i386() {
        assert_eq!(DeviceProfile::default_cpu_type("iPhone 5"), CpuType::I386);
        assert!(DeviceProfile::default_cpu_type("iPhone 6").is_64_bit());
    }

    #[test]
    fn supports_checks_platform_and_range() {
        let device = iphone_6();
        assert!(device.supports(&runtime(Platform::Ios, "8.0")));
        assert!(device.supports(&runtime(Platform::Ios, "12.4")));
        assert!(!device.supports(&runtime(Platform::Ios, "7.1")));
        assert!(!device.supports(&runtime(Platform::Ios, "13.0")));
        assert!(!device.supports(&runtime(Platform::TvOs, "12.0")));
    }

    #[test]
    fn supports_compares_short_versions() {
        let device = iphone_6();
        assert!(device.supports(&runtime(Platform::Ios, "12.4.1")));
        assert!(device.supports(&runtime(Platform::Ios, "8.0.2")));
        assert!(!device.supports(&runtime(Platform::Ios, "12.5.1")));
    }
}
