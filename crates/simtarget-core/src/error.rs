//! Error types for device and SDK resolution.
//!
//! Every failure is reported synchronously to the caller and none is retried
//! internally. A failed resolution leaves the [`SimulatorResolver`] reusable:
//! correct the inputs through its setters and resolve again.
//!
//! [`SimulatorResolver`]: crate::resolver::SimulatorResolver

use thiserror::Error;

/// Errors that can occur while resolving a simulator target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The alias or canonical name is not present in the inventory snapshot.
    #[error("Unknown device: {name}")]
    UnknownDevice {
        /// The name exactly as the caller supplied it.
        name: String,
    },

    /// An explicitly requested OS version is not supported by the device.
    #[error("SDK {version} is not supported by device {device}")]
    UnsupportedSdk {
        /// The requested OS version.
        version: String,
        /// Canonical name of the device.
        device: String,
    },

    /// The device has no supported SDK at all in the current inventory.
    #[error("Device {device} has no supported SDKs in the installed inventory")]
    NoSupportedSdk {
        /// Canonical name of the device.
        device: String,
    },

    /// The SDK is supported in principle but its runtime is not installed.
    #[error("Runtime {identifier} for SDK {version} is not installed")]
    RuntimeNotInstalled {
        /// SDK short version.
        version: String,
        /// Runtime identifier, e.g. `com.apple.CoreSimulator.SimRuntime.iOS-12-1`.
        identifier: String,
    },

    /// No runtime maps the short version to a full version.
    #[error("No full SDK version known for short version {version}")]
    UnresolvedVersion {
        /// The short version that could not be mapped.
        version: String,
    },

    /// A derived value was requested before the required inputs were set.
    #[error("Incomplete configuration: {missing} is not set")]
    IncompleteConfiguration {
        /// Name of the missing input.
        missing: &'static str,
    },

    /// A version string is not a dotted numeric version.
    #[error("Invalid version string: {0:?}")]
    InvalidVersion(String),
}

impl ResolveError {
    pub(crate) fn unknown_device(name: impl Into<String>) -> Self {
        Self::UnknownDevice { name: name.into() }
    }
}
