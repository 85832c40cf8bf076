//! Launch environment and timeout policy for a simulated test host.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::arch::CpuType;
use crate::device::DeviceFamily;
use crate::resolver::ResolvedTarget;

pub const SIMULATOR_ARCHITECTURE: &str = "SIMULATOR_ARCHITECTURE";
pub const SIMULATOR_CPU_TYPE: &str = "SIMULATOR_CPU_TYPE";
pub const SIMULATOR_DEVICE_FAMILY: &str = "SIMULATOR_DEVICE_FAMILY";
pub const SIMULATOR_DEVICE_NAME: &str = "SIMULATOR_DEVICE_NAME";
pub const SIMULATOR_RUNTIME_VERSION: &str = "SIMULATOR_RUNTIME_VERSION";
pub const SIMULATOR_ROOT: &str = "SIMULATOR_ROOT";
pub const IPHONE_SIMULATOR_ROOT: &str = "IPHONE_SIMULATOR_ROOT";
pub const NS_UNBUFFERED_IO: &str = "NSUnbufferedIO";
pub const TEST_HOST_PATH: &str = "TEST_HOST_PATH";
pub const PRODUCT_BUNDLE_PATH: &str = "PRODUCT_BUNDLE_PATH";
pub const DYLD_FRAMEWORK_PATH: &str = "DYLD_FRAMEWORK_PATH";
pub const DYLD_LIBRARY_PATH: &str = "DYLD_LIBRARY_PATH";

/// Extra time 32-bit simulated hardware needs to come up.
const LEGACY_HARDWARE_PENALTY: Duration = Duration::from_secs(15);

/// How long a launcher should wait for the simulated test host to start.
///
/// Fixed per device class; not configurable at this layer.
pub fn launch_timeout_for(family: DeviceFamily, cpu_type: CpuType) -> Duration {
    let base = match family {
        DeviceFamily::Phone => Duration::from_secs(30),
        DeviceFamily::Tv => Duration::from_secs(45),
        DeviceFamily::Tablet | DeviceFamily::Watch => Duration::from_secs(60),
    };
    if cpu_type.is_64_bit() {
        base
    } else {
        base + LEGACY_HARDWARE_PENALTY
    }
}

/// Environment variables for a simulated test host process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LaunchEnvironment(BTreeMap<String, String>);

impl LaunchEnvironment {
    /// Builds the environment for a resolved target.
    pub fn for_target(target: &ResolvedTarget) -> Self {
        let mut env = Self::default();
        let root = target.system_root().display().to_string();

        env.insert(SIMULATOR_ARCHITECTURE, target.architecture());
        env.insert(SIMULATOR_CPU_TYPE, target.cpu_type.code().to_string());
        env.insert(SIMULATOR_DEVICE_FAMILY, target.device_family().to_string());
        env.insert(SIMULATOR_DEVICE_NAME, target.device.name.as_str());
        env.insert(SIMULATOR_RUNTIME_VERSION, target.runtime.version.to_string());
        env.insert(SIMULATOR_ROOT, root.as_str());
        env.insert(IPHONE_SIMULATOR_ROOT, root);
        env.insert(NS_UNBUFFERED_IO, "YES");

        env.insert_path(TEST_HOST_PATH, target.test_host_path.as_deref());
        env.insert_path(PRODUCT_BUNDLE_PATH, target.product_bundle_path.as_deref());
        env.insert_path(DYLD_FRAMEWORK_PATH, target.built_products_dir.as_deref());
        env.insert_path(DYLD_LIBRARY_PATH, target.built_products_dir.as_deref());
        env
    }

    fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    fn insert_path(&mut self, key: &str, path: Option<&Path>) {
        if let Some(path) = path {
            self.insert(key, path.display().to_string());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a LaunchEnvironment {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
