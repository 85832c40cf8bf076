//! The inventory of device types and runtimes a host can simulate.
//!
//! A [`DeviceCatalog`] is an immutable snapshot: it is built once from a list
//! of [`DeviceProfile`]s and [`RuntimeDescriptor`]s and answers every
//! capability query from that snapshot. It never re-reads the host. Callers
//! that need a fresh view build a new catalog, or call
//! [`invalidate_host_catalog`] before the next [`host_catalog`].
//!
//! # Alias matching
//!
//! Alias lookup is an exact, case-sensitive string match. `"iPhone 6"`
//! resolves, `"iphone 6"` does not. Every device answers to its canonical
//! name, its device type identifier and the identifier's trailing component
//! (`"iPhone-6"`), plus any aliases attached through
//! [`DeviceCatalog::with_aliases`] or the built-in legacy Xcode names.
//!
//! # Example
//!
//! ```
//! use simtarget_core::arch::CpuType;
//! use simtarget_core::catalog::DeviceCatalog;
//! use simtarget_core::device::{DeviceFamily, DeviceProfile};
//! use simtarget_core::runtime::{Platform, RuntimeDescriptor};
//! use simtarget_core::version::OsVersion;
//!
//! let catalog = DeviceCatalog::new(
//!     vec![DeviceProfile::new(
//!         "iPhone 6",
//!         "com.apple.CoreSimulator.SimDeviceType.iPhone-6",
//!         DeviceFamily::Phone,
//!         CpuType::X86_64,
//!         OsVersion::new(8, 0, 0),
//!         OsVersion::new(12, 4, 0),
//!     )],
//!     vec![RuntimeDescriptor::new(
//!         "com.apple.CoreSimulator.SimRuntime.iOS-12-1",
//!         OsVersion::new(12, 1, 0),
//!         Platform::Ios,
//!         "/runtimes/iOS-12-1",
//!         true,
//!     )],
//! );
//!
//! assert_eq!(catalog.canonical_name("iPhone-6").unwrap(), "iPhone 6");
//! assert!(catalog.is_sdk_supported("12.1.0", "iPhone 6"));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::arch::CpuType;
use crate::device::DeviceProfile;
use crate::error::ResolveError;
use crate::runtime::RuntimeDescriptor;
use crate::simctl::{Simctl, SimctlError};
use crate::version::OsVersion;

/// Names older Xcode releases used for device types that were later renamed.
const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("iPhone Retina (3.5-inch)", "iPhone 4s"),
    ("iPhone Retina (4-inch)", "iPhone 5"),
    ("iPhone Retina (4-inch 64-bit)", "iPhone 5s"),
    ("iPad Retina (64-bit)", "iPad Air"),
];

static HOST_CATALOG: Mutex<Option<Arc<DeviceCatalog>>> = Mutex::new(None);

/// Returns the process-wide catalog of the host's installed simulators.
///
/// The inventory is read through `xcrun simctl` on the first call and the
/// same snapshot is returned afterwards, even if the host's installed
/// simulators change.
pub fn host_catalog() -> Result<Arc<DeviceCatalog>, SimctlError> {
    let mut slot = HOST_CATALOG.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(catalog) = slot.as_ref() {
        return Ok(Arc::clone(catalog));
    }

    let (devices, runtimes) = Simctl::list_inventory()?;
    let catalog = Arc::new(DeviceCatalog::new(devices, runtimes));
    *slot = Some(Arc::clone(&catalog));
    Ok(catalog)
}

/// Drops the cached host snapshot so the next [`host_catalog`] re-reads it.
pub fn invalidate_host_catalog() {
    let mut slot = HOST_CATALOG.lock().unwrap_or_else(|e| e.into_inner());
    if slot.take().is_some() {
        debug!("Host catalog invalidated");
    }
}

/// Snapshot of installed device types and runtimes.
#[derive(Debug, Clone)]
pub struct DeviceCatalog {
    /// Sorted by canonical name.
    devices: Vec<DeviceProfile>,
    /// Sorted newest version first.
    runtimes: Vec<RuntimeDescriptor>,
    /// Alias -> index into `devices`.
    aliases: HashMap<String, usize>,
}

impl DeviceCatalog {
    pub fn new(devices: Vec<DeviceProfile>, runtimes: Vec<RuntimeDescriptor>) -> Self {
        let mut devices = devices;
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices.dedup_by(|later, earlier| {
            let duplicate = later.name == earlier.name;
            if duplicate {
                warn!(device = %later.name, "Duplicate device type in inventory, keeping first");
            }
            duplicate
        });

        for (legacy, target) in LEGACY_ALIASES {
            if let Some(device) = devices.iter_mut().find(|d| d.name == *target) {
                device.aliases.insert((*legacy).to_string());
            }
        }

        let mut runtimes = runtimes;
        runtimes.sort_by(|a, b| b.version.cmp(&a.version));

        let mut catalog = Self {
            devices,
            runtimes,
            aliases: HashMap::new(),
        };
        catalog.rebuild_alias_index();

        for device in &catalog.devices {
            if !catalog.runtimes.iter().any(|r| device.supports(r)) {
                warn!(device = %device.name, "Device type has no supported runtime");
            }
        }

        debug!(
            devices = catalog.devices.len(),
            runtimes = catalog.runtimes.len(),
            "Device catalog built"
        );
        catalog
    }

    /// Builds a catalog from saved `xcrun simctl list devicetypes runtimes -j` output.
    pub fn from_simctl_json(json: &[u8]) -> Result<Self, SimctlError> {
        let (devices, runtimes) = Simctl::parse_inventory(json)?;
        Ok(Self::new(devices, runtimes))
    }

    /// Attaches extra `alias -> canonical name` mappings.
    ///
    /// Mappings whose target is not in the inventory are ignored.
    pub fn with_aliases<I, A, C>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: AsRef<str>,
    {
        for (alias, canonical) in aliases {
            let alias = alias.into();
            match self.devices.iter_mut().find(|d| d.name == canonical.as_ref()) {
                Some(device) => {
                    device.aliases.insert(alias);
                }
                None => {
                    warn!(%alias, target = canonical.as_ref(), "Alias target not in inventory");
                }
            }
        }
        self.rebuild_alias_index();
        self
    }

    /// Canonical names claim their own slot before any other alias, so a
    /// device's name can never be shadowed.
    fn rebuild_alias_index(&mut self) {
        let mut index = HashMap::new();
        for (i, device) in self.devices.iter().enumerate() {
            index.insert(device.name.clone(), i);
        }
        for (i, device) in self.devices.iter().enumerate() {
            for alias in &device.aliases {
                let owner = *index.entry(alias.clone()).or_insert(i);
                if owner != i {
                    warn!(
                        %alias,
                        kept = %self.devices[owner].name,
                        ignored = %device.name,
                        "Alias claimed by more than one device"
                    );
                }
            }
        }
        self.aliases = index;
    }

    /// All device profiles, ordered by canonical name.
    pub fn available_devices(&self) -> &[DeviceProfile] {
        &self.devices
    }

    /// All runtimes, newest first.
    pub fn runtimes(&self) -> &[RuntimeDescriptor] {
        &self.runtimes
    }

    /// Looks up a profile by canonical name.
    pub fn device(&self, canonical_name: &str) -> Option<&DeviceProfile> {
        self.devices
            .binary_search_by(|d| d.name.as_str().cmp(canonical_name))
            .ok()
            .map(|i| &self.devices[i])
    }

    fn require_device(&self, canonical_name: &str) -> Result<&DeviceProfile, ResolveError> {
        self.device(canonical_name)
            .ok_or_else(|| ResolveError::unknown_device(canonical_name))
    }

    /// Maps an alias to its canonical device name (exact, case-sensitive).
    pub fn canonical_name(&self, alias: &str) -> Result<&str, ResolveError> {
        let name = self
            .aliases
            .get(alias)
            .map(|&i| self.devices[i].name.as_str())
            .ok_or_else(|| ResolveError::unknown_device(alias))?;
        debug!(%alias, canonical = %name, "Resolved device alias");
        Ok(name)
    }

    pub fn is_available(&self, canonical_name: &str) -> bool {
        self.device(canonical_name).is_some()
    }

    /// SDK short versions the device supports, newest first, without duplicates.
    ///
    /// Runtimes that are known but not installed are included; use
    /// [`Self::runtime_for`] to check availability.
    pub fn supported_sdk_versions(
        &self,
        canonical_name: &str,
    ) -> Result<Vec<OsVersion>, ResolveError> {
        let device = self.require_device(canonical_name)?;
        let mut versions: Vec<OsVersion> = self
            .runtimes
            .iter()
            .filter(|r| device.supports(r))
            .map(RuntimeDescriptor::short_version)
            .collect();
        versions.dedup();
        Ok(versions)
    }

    /// Whether `sdk_version` is one of the device's supported short versions.
    ///
    /// Versions are compared numerically, so "12.0" and "12" match 12.0.0.
    /// Unparsable versions and unknown devices are simply unsupported.
    pub fn is_sdk_supported(&self, sdk_version: &str, canonical_name: &str) -> bool {
        let Ok(version) = OsVersion::parse(sdk_version) else {
            return false;
        };
        self.supported_sdk_versions(canonical_name)
            .map(|versions| versions.contains(&version))
            .unwrap_or(false)
    }

    pub fn cpu_type(&self, canonical_name: &str) -> Result<CpuType, ResolveError> {
        Ok(self.require_device(canonical_name)?.cpu_type)
    }

    /// Maps an SDK short version to the full version of the runtime providing it.
    ///
    /// There is no fallback: a short version with no backing runtime fails
    /// with [`ResolveError::UnresolvedVersion`] rather than being treated as
    /// already full. A version with a non-zero patch component is never a
    /// short version and always fails.
    pub fn base_version(&self, short_version: &str) -> Result<OsVersion, ResolveError> {
        let short = OsVersion::parse(short_version)?;
        let unresolved = || ResolveError::UnresolvedVersion {
            version: short_version.to_string(),
        };
        if short.patch != 0 {
            return Err(unresolved());
        }
        Self::preferred(self.runtimes.iter().filter(|r| r.short_version() == short))
            .map(|r| r.version)
            .ok_or_else(unresolved)
    }

    /// Every runtime short version in the inventory, newest first.
    pub fn available_sdk_versions(&self) -> Vec<OsVersion> {
        let mut versions: Vec<OsVersion> = self
            .runtimes
            .iter()
            .map(RuntimeDescriptor::short_version)
            .collect();
        versions.dedup();
        versions
    }

    /// Finds the SDK short version an OS version string refers to.
    ///
    /// An exact numeric match wins; otherwise the newest version that starts
    /// with the given components is chosen ("12" picks the newest 12.x).
    pub fn sdk_version_for_os_version(&self, os_version: &str) -> Option<OsVersion> {
        Self::match_os_version(&self.available_sdk_versions(), os_version)
    }

    pub(crate) fn match_os_version(versions: &[OsVersion], os_version: &str) -> Option<OsVersion> {
        if let Ok(exact) = OsVersion::parse(os_version) {
            if versions.contains(&exact) {
                return Some(exact);
            }
        }
        versions.iter().copied().find(|v| v.has_prefix(os_version))
    }

    /// The runtime backing `short_version` for a device.
    ///
    /// Installed runtimes are preferred over unavailable ones, then the
    /// highest full version.
    pub fn runtime_for(
        &self,
        short_version: OsVersion,
        canonical_name: &str,
    ) -> Option<&RuntimeDescriptor> {
        let device = self.device(canonical_name)?;
        Self::preferred(
            self.runtimes
                .iter()
                .filter(|r| device.supports(r) && r.short_version() == short_version.to_short()),
        )
    }

    /// Picks the first available runtime, else the first one at all. Callers
    /// pass runtimes in newest-first order.
    fn preferred<'a>(
        runtimes: impl Iterator<Item = &'a RuntimeDescriptor> + Clone,
    ) -> Option<&'a RuntimeDescriptor> {
        runtimes
            .clone()
            .find(|r| r.is_available)
            .or_else(|| runtimes.into_iter().next())
    }
}
