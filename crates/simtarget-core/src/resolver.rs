//! Turns a device alias and OS version into a launchable simulator target.
//!
//! A [`SimulatorResolver`] moves through three states:
//!
//! - **Unconfigured**: no device name has been set.
//! - **Configured**: inputs are set but nothing has been derived and cached.
//! - **Resolved**: [`SimulatorResolver::resolve`] succeeded and cached a
//!   [`ResolvedTarget`].
//!
//! Every setter drops the cached target, so derived values are always
//! consistent with the current inputs. A failed resolution returns the error
//! and leaves the resolver in the Configured state, ready to retry once the
//! inputs are corrected.
//!
//! Setters never validate; validation happens when a derived value is read.
//!
//! # Example
//!
//! ```no_run
//! use simtarget_core::catalog::host_catalog;
//! use simtarget_core::resolver::SimulatorResolver;
//!
//! let mut resolver = SimulatorResolver::new(host_catalog().unwrap());
//! resolver.set_device_name("iPhone 6");
//!
//! let target = resolver.resolve().unwrap();
//! println!("{} on {}", target.device_info_name(), target.sdk_name());
//!
//! for (key, value) in &resolver.build_launch_environment().unwrap() {
//!     println!("{key}={value}");
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::arch::CpuType;
use crate::build_settings::BuildSettings;
use crate::catalog::DeviceCatalog;
use crate::device::DeviceProfile;
use crate::error::ResolveError;
use crate::launch::{launch_timeout_for, LaunchEnvironment};
use crate::runtime::RuntimeDescriptor;
use crate::version::OsVersion;

/// Where a resolver is in its configure/resolve cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Unconfigured,
    Configured,
    Resolved,
}

/// A fully specified launch target.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub device: DeviceProfile,
    pub runtime: RuntimeDescriptor,
    pub cpu_type: CpuType,
    /// SDK short version the target runs.
    pub sdk_version: OsVersion,
    pub test_host_path: Option<PathBuf>,
    pub product_bundle_path: Option<PathBuf>,
    pub built_products_dir: Option<PathBuf>,
    pub launch_timeout: Duration,
}

impl ResolvedTarget {
    pub fn architecture(&self) -> &'static str {
        self.cpu_type.arch_name()
    }

    pub fn device_family(&self) -> u8 {
        self.device.family.code()
    }

    /// Full version of the runtime backing the SDK.
    pub fn sdk_full_version(&self) -> OsVersion {
        self.runtime.version
    }

    /// e.g. `iphonesimulator12.1`
    pub fn sdk_name(&self) -> String {
        format!("{}{}", self.runtime.platform.sdk_prefix(), self.sdk_version.short())
    }

    /// e.g. `iPhone 6 (12.1)`
    pub fn device_info_name(&self) -> String {
        format!("{} ({})", self.device.name, self.sdk_version.short())
    }

    pub fn system_root(&self) -> &Path {
        &self.runtime.root
    }

    /// The environment a launcher passes to the simulated test host.
    pub fn launch_environment(&self) -> LaunchEnvironment {
        LaunchEnvironment::for_target(self)
    }
}

/// Resolves one test run's simulator target.
///
/// Owned by a single test-run context; resolve independent targets with
/// independent resolvers. The catalog is shared read-only.
#[derive(Debug, Clone)]
pub struct SimulatorResolver {
    catalog: Arc<DeviceCatalog>,
    build_settings: BuildSettings,
    device_name: Option<String>,
    os_version: Option<String>,
    cpu_override: Option<CpuType>,
    resolved: Option<ResolvedTarget>,
}

impl SimulatorResolver {
    pub fn new(catalog: Arc<DeviceCatalog>) -> Self {
        Self {
            catalog,
            build_settings: BuildSettings::default(),
            device_name: None,
            os_version: None,
            cpu_override: None,
            resolved: None,
        }
    }

    pub fn with_build_settings(catalog: Arc<DeviceCatalog>, settings: BuildSettings) -> Self {
        let mut resolver = Self::new(catalog);
        resolver.build_settings = settings;
        resolver
    }

    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    pub fn state(&self) -> ResolverState {
        match (&self.device_name, &self.resolved) {
            (None, _) => ResolverState::Unconfigured,
            (Some(_), None) => ResolverState::Configured,
            (Some(_), Some(_)) => ResolverState::Resolved,
        }
    }

    /// An independent copy of this resolver's inputs and cached target.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    fn invalidate(&mut self) {
        if self.resolved.take().is_some() {
            debug!("Resolved target invalidated");
        }
    }

    /// Stores a device alias; it is validated on the next derived query.
    pub fn set_device_name(&mut self, name: impl Into<String>) {
        self.device_name = Some(name.into());
        self.invalidate();
    }

    /// Stores an OS version. Empty or `"latest"` means the newest version
    /// the device supports.
    pub fn set_os_version(&mut self, version: impl Into<String>) {
        let version = version.into();
        let trimmed = version.trim();
        self.os_version = if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("latest") {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.invalidate();
    }

    /// Forces a CPU type regardless of what the device simulates. `None`
    /// restores the device-derived value.
    pub fn set_cpu_type(&mut self, cpu_type: Option<CpuType>) {
        self.cpu_override = cpu_type;
        self.invalidate();
    }

    pub fn set_build_settings(&mut self, settings: BuildSettings) {
        self.build_settings = settings;
        self.invalidate();
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    pub fn os_version(&self) -> Option<&str> {
        self.os_version.as_deref()
    }

    pub fn cpu_override(&self) -> Option<CpuType> {
        self.cpu_override
    }

    pub fn build_settings(&self) -> &BuildSettings {
        &self.build_settings
    }

    /// The cached target, if the resolver is in the Resolved state.
    pub fn resolved(&self) -> Option<&ResolvedTarget> {
        self.resolved.as_ref()
    }

    fn device(&self) -> Result<&DeviceProfile, ResolveError> {
        let alias = self
            .device_name
            .as_deref()
            .ok_or(ResolveError::IncompleteConfiguration {
                missing: "device name",
            })?;
        let canonical = self.catalog.canonical_name(alias)?;
        self.catalog
            .device(canonical)
            .ok_or_else(|| ResolveError::unknown_device(canonical))
    }

    /// The simulated CPU type. An explicit override always wins.
    pub fn resolve_architecture(&self) -> Result<CpuType, ResolveError> {
        if let Some(cpu) = self.cpu_override {
            return Ok(cpu);
        }
        if let Some(target) = &self.resolved {
            return Ok(target.cpu_type);
        }
        let device = self.device()?;
        self.catalog.cpu_type(&device.name)
    }

    /// Architecture name for the simulated CPU, e.g. `x86_64`.
    pub fn simulated_architecture(&self) -> Result<&'static str, ResolveError> {
        Ok(self.resolve_architecture()?.arch_name())
    }

    pub fn resolve_device_family(&self) -> Result<u8, ResolveError> {
        if let Some(target) = &self.resolved {
            return Ok(target.device_family());
        }
        Ok(self.device()?.family.code())
    }

    /// The SDK short version to run.
    ///
    /// With no OS version set, the newest supported version is chosen. An
    /// explicit version is accepted when it is a supported short version, a
    /// component prefix of one ("12" picks the newest 12.x), or the exact
    /// full version of a runtime the device supports.
    pub fn resolve_sdk_version(&self) -> Result<OsVersion, ResolveError> {
        if let Some(target) = &self.resolved {
            return Ok(target.sdk_version);
        }
        let device = self.device()?;
        Ok(self.sdk_version_for(device)?.0)
    }

    /// The chosen SDK short version, plus the runtime when the request named
    /// a full runtime version exactly. A pinned runtime is never swapped for
    /// another with the same short version.
    fn sdk_version_for(
        &self,
        device: &DeviceProfile,
    ) -> Result<(OsVersion, Option<&RuntimeDescriptor>), ResolveError> {
        let supported = self.catalog.supported_sdk_versions(&device.name)?;

        let Some(requested) = self.os_version.as_deref() else {
            return supported
                .first()
                .map(|&version| (version, None))
                .ok_or_else(|| ResolveError::NoSupportedSdk {
                    device: device.name.clone(),
                });
        };

        let parsed = OsVersion::parse(requested)?;
        if self.catalog.is_sdk_supported(requested, &device.name) {
            return Ok((parsed.to_short(), None));
        }
        if let Some(version) = DeviceCatalog::match_os_version(&supported, requested) {
            return Ok((version, None));
        }
        self.catalog
            .runtimes()
            .iter()
            .find(|r| r.version == parsed && device.supports(r))
            .map(|r| (r.short_version(), Some(r)))
            .ok_or_else(|| ResolveError::UnsupportedSdk {
                version: requested.to_string(),
                device: device.name.clone(),
            })
    }

    /// Picks the SDK and the installed runtime providing it.
    fn select_runtime(
        &self,
        device: &DeviceProfile,
    ) -> Result<(OsVersion, &RuntimeDescriptor), ResolveError> {
        let (sdk_version, pinned) = self.sdk_version_for(device)?;
        let runtime = match pinned {
            Some(runtime) => runtime,
            None => self
                .catalog
                .runtime_for(sdk_version, &device.name)
                .ok_or_else(|| ResolveError::UnresolvedVersion {
                    version: sdk_version.short(),
                })?,
        };
        if !runtime.is_available {
            return Err(ResolveError::RuntimeNotInstalled {
                version: sdk_version.short(),
                identifier: runtime.identifier.clone(),
            });
        }
        Ok((sdk_version, runtime))
    }

    /// Filesystem root of the runtime for the resolved SDK.
    pub fn system_root(&self) -> Result<PathBuf, ResolveError> {
        if let Some(target) = &self.resolved {
            return Ok(target.system_root().to_path_buf());
        }
        let device = self.device()?;
        Ok(self.select_runtime(device)?.1.root.clone())
    }

    pub fn launch_timeout(&self) -> Result<Duration, ResolveError> {
        if let Some(target) = &self.resolved {
            return Ok(target.launch_timeout);
        }
        let family = self.device()?.family;
        Ok(launch_timeout_for(family, self.resolve_architecture()?))
    }

    pub fn test_host_path(&self) -> Option<PathBuf> {
        self.build_settings.test_host()
    }

    pub fn product_bundle_path(&self) -> Option<PathBuf> {
        self.build_settings.product_bundle_path()
    }

    /// Derives every value at once and caches the result.
    ///
    /// Resolution is all-or-nothing: on error nothing is cached.
    pub fn resolve(&mut self) -> Result<&ResolvedTarget, ResolveError> {
        let target = match self.resolved.take() {
            Some(target) => target,
            None => {
                let target = self.compute()?;
                info!(
                    device = %target.device.name,
                    sdk = %target.sdk_version,
                    arch = target.architecture(),
                    "Resolved simulator target"
                );
                target
            }
        };
        Ok(&*self.resolved.insert(target))
    }

    fn compute(&self) -> Result<ResolvedTarget, ResolveError> {
        let device = self.device()?;
        let cpu_type = match self.cpu_override {
            Some(cpu) => cpu,
            None => self.catalog.cpu_type(&device.name)?,
        };
        let (sdk_version, runtime) = self.select_runtime(device)?;

        Ok(ResolvedTarget {
            device: device.clone(),
            runtime: runtime.clone(),
            cpu_type,
            sdk_version,
            test_host_path: self.test_host_path(),
            product_bundle_path: self.product_bundle_path(),
            built_products_dir: self.build_settings.built_products_dir(),
            launch_timeout: launch_timeout_for(device.family, cpu_type),
        })
    }

    /// Resolves if needed and returns the launch environment.
    pub fn build_launch_environment(&mut self) -> Result<LaunchEnvironment, ResolveError> {
        Ok(self.resolve()?.launch_environment())
    }
}
