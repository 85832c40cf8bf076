//! Host simulator inventory via Apple's `xcrun simctl` command-line tool.
//!
//! This module reads the installed device types and runtimes and turns them
//! into the [`DeviceProfile`] and [`RuntimeDescriptor`] records the
//! [`DeviceCatalog`](crate::catalog::DeviceCatalog) is built from. Nothing
//! outside this module knows about simctl's JSON shape.
//!
//! # Requirements
//!
//! Xcode must be installed for `xcrun simctl` to be available.
//!
//! # Example
//!
//! ```no_run
//! use simtarget_core::simctl::Simctl;
//!
//! let (devices, runtimes) = Simctl::list_inventory().unwrap();
//! for device in &devices {
//!     println!("{} ({})", device.name, device.identifier);
//! }
//! println!("{} runtimes installed", runtimes.len());
//! ```

use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::device::{DeviceFamily, DeviceProfile};
use crate::runtime::{Platform, RuntimeDescriptor};
use crate::version::OsVersion;

/// Errors that can occur when reading the host inventory.
#[derive(Error, Debug)]
pub enum SimctlError {
    /// A simctl command failed to execute successfully.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to parse JSON output from simctl.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// An I/O error occurred while executing the command.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct Inventory {
    #[serde(default)]
    devicetypes: Vec<RawDeviceType>,
    #[serde(default)]
    runtimes: Vec<RawRuntime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeviceType {
    name: String,
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    product_family: Option<String>,
    #[serde(default)]
    min_runtime_version: Option<u32>,
    #[serde(default)]
    max_runtime_version: Option<u32>,
    #[serde(default)]
    min_runtime_version_string: Option<String>,
    #[serde(default)]
    max_runtime_version_string: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRuntime {
    name: String,
    identifier: String,
    version: String,
    #[serde(default, rename = "buildversion")]
    build_version: Option<String>,
    #[serde(default)]
    runtime_root: Option<PathBuf>,
    #[serde(default)]
    bundle_path: Option<PathBuf>,
    #[serde(default)]
    is_available: Option<bool>,
    /// Xcode 9 and earlier report `"(available)"` here instead of `isAvailable`.
    #[serde(default)]
    availability: Option<String>,
}

impl RawDeviceType {
    fn family(&self) -> Option<DeviceFamily> {
        if let Some(family) = self.product_family.as_deref() {
            return DeviceFamily::from_product_family(family);
        }
        // Older simctl omits productFamily; the name prefix is reliable there.
        ["Apple Watch", "Apple TV", "iPad", "iPhone"]
            .into_iter()
            .find(|prefix| self.name.starts_with(prefix))
            .and_then(DeviceFamily::from_product_family)
    }

    fn bound(string: Option<&str>, packed: Option<u32>, default: OsVersion) -> OsVersion {
        string
            .and_then(|s| OsVersion::parse(s).ok())
            .or_else(|| packed.map(OsVersion::from_packed))
            .unwrap_or(default)
    }

    fn into_profile(self) -> Option<DeviceProfile> {
        let Some(family) = self.family() else {
            warn!(device = %self.name, family = ?self.product_family, "Skipping device type of unknown family");
            return None;
        };
        let min = Self::bound(
            self.min_runtime_version_string.as_deref(),
            self.min_runtime_version,
            OsVersion::default(),
        );
        let max = Self::bound(
            self.max_runtime_version_string.as_deref(),
            self.max_runtime_version,
            OsVersion::from_packed(u32::MAX),
        );
        let cpu_type = DeviceProfile::default_cpu_type(&self.name);
        Some(DeviceProfile::new(
            self.name,
            self.identifier,
            family,
            cpu_type,
            min,
            max,
        ))
    }
}

impl RawRuntime {
    fn into_descriptor(self) -> Option<RuntimeDescriptor> {
        let version = match OsVersion::parse(&self.version) {
            Ok(v) => v,
            Err(_) => {
                warn!(runtime = %self.identifier, version = %self.version, "Skipping runtime with unparsable version");
                return None;
            }
        };
        let Some(platform) = Platform::from_runtime_name(&self.name) else {
            warn!(runtime = %self.identifier, name = %self.name, "Skipping runtime of unknown platform");
            return None;
        };
        let root = self
            .runtime_root
            .or_else(|| {
                self.bundle_path
                    .map(|p| p.join("Contents/Resources/RuntimeRoot"))
            })
            .unwrap_or_default();
        let available = self.is_available.unwrap_or(false)
            || self.availability.as_deref() == Some("(available)");

        let mut descriptor =
            RuntimeDescriptor::new(self.identifier, version, platform, root, available);
        descriptor.name = self.name;
        descriptor.build_version = self.build_version;
        Some(descriptor)
    }
}

/// Wrapper for `xcrun simctl` inventory commands.
///
/// All methods are synchronous and execute shell commands.
pub struct Simctl;

impl Simctl {
    /// Lists installed device types and runtimes.
    ///
    /// Queries `xcrun simctl list devicetypes runtimes -j` and converts the
    /// output with [`Self::parse_inventory`].
    ///
    /// # Errors
    ///
    /// - [`SimctlError::Io`] if the command fails to execute
    /// - [`SimctlError::CommandFailed`] if simctl returns a non-zero exit code
    /// - [`SimctlError::JsonParse`] if the output cannot be parsed as JSON
    pub fn list_inventory() -> Result<(Vec<DeviceProfile>, Vec<RuntimeDescriptor>), SimctlError> {
        let output = Command::new("xcrun")
            .args(["simctl", "list", "devicetypes", "runtimes", "-j"])
            .output()?;

        if !output.status.success() {
            return Err(SimctlError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        Self::parse_inventory(&output.stdout)
    }

    /// Parses simctl inventory JSON into device profiles and runtimes.
    ///
    /// Device types of an unknown product family and runtimes whose version
    /// or platform cannot be parsed are skipped with a warning.
    ///
    /// # Errors
    ///
    /// - [`SimctlError::JsonParse`] if the JSON is invalid or has unexpected structure
    pub fn parse_inventory(
        json: &[u8],
    ) -> Result<(Vec<DeviceProfile>, Vec<RuntimeDescriptor>), SimctlError> {
        let inventory: Inventory = serde_json::from_slice(json)?;

        let devices: Vec<DeviceProfile> = inventory
            .devicetypes
            .into_iter()
            .filter_map(RawDeviceType::into_profile)
            .collect();
        let runtimes: Vec<RuntimeDescriptor> = inventory
            .runtimes
            .into_iter()
            .filter_map(RawRuntime::into_descriptor)
            .collect();

        debug!(
            devices = devices.len(),
            runtimes = runtimes.len(),
            "Parsed simctl inventory"
        );
        Ok((devices, runtimes))
    }
}
