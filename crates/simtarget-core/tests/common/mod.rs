//! Shared test helpers for simtarget-core integration tests.
//!
//! Provides catalogs that never touch the host: one parsed from a saved
//! simctl fixture and one assembled by hand for edge cases.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use simtarget_core::arch::CpuType;
use simtarget_core::catalog::DeviceCatalog;
use simtarget_core::device::{DeviceFamily, DeviceProfile};
use simtarget_core::runtime::{Platform, RuntimeDescriptor};
use simtarget_core::version::OsVersion;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Catalog parsed from `fixtures/simctl_inventory.json`.
///
/// Installed: iOS 12.1, iOS 11.0.1, tvOS 12.1. Known but unavailable:
/// iOS 10.3.1. The iPhone 4s has no supported runtime.
pub fn fixture_catalog() -> Arc<DeviceCatalog> {
    let json = std::fs::read(fixture_path("simctl_inventory.json")).unwrap();
    Arc::new(DeviceCatalog::from_simctl_json(&json).unwrap())
}

pub fn device(name: &str, family: DeviceFamily, cpu: CpuType, min: &str, max: &str) -> DeviceProfile {
    DeviceProfile::new(
        name,
        format!(
            "com.apple.CoreSimulator.SimDeviceType.{}",
            name.replace(' ', "-")
        ),
        family,
        cpu,
        OsVersion::parse(min).unwrap(),
        OsVersion::parse(max).unwrap(),
    )
}

pub fn ios_runtime(version: &str, available: bool) -> RuntimeDescriptor {
    RuntimeDescriptor::new(
        format!(
            "com.apple.CoreSimulator.SimRuntime.iOS-{}",
            version.replace('.', "-")
        ),
        OsVersion::parse(version).unwrap(),
        Platform::Ios,
        format!("/runtimes/iOS {version}.simruntime/Contents/Resources/RuntimeRoot"),
        available,
    )
}

/// A small hand-built catalog with both phone and tablet hardware.
pub fn synthetic_catalog() -> Arc<DeviceCatalog> {
    Arc::new(DeviceCatalog::new(
        vec![
            device("iPhone 6", DeviceFamily::Phone, CpuType::X86_64, "8.0", "65535.255.255"),
            device("iPhone 5", DeviceFamily::Phone, CpuType::I386, "6.0", "10.3"),
            device("iPad Air", DeviceFamily::Tablet, CpuType::X86_64, "7.0", "65535.255.255"),
            device("iPhone XS", DeviceFamily::Phone, CpuType::X86_64, "11.0", "65535.255.255"),
        ],
        vec![
            ios_runtime("12.1", true),
            ios_runtime("11.0", true),
            ios_runtime("10.3", true),
            ios_runtime("9.3", false),
        ],
    ))
}
