//! Capability queries against the fixture inventory and a synthetic catalog.

mod common;

use common::{fixture_catalog, synthetic_catalog};

use simtarget_core::arch::CpuType;
use simtarget_core::error::ResolveError;
use simtarget_core::version::OsVersion;

#[test]
fn every_alias_maps_to_its_canonical_device() {
    for catalog in [fixture_catalog(), synthetic_catalog()] {
        for device in catalog.available_devices() {
            assert!(!device.aliases.is_empty());
            for alias in &device.aliases {
                assert_eq!(
                    catalog.canonical_name(alias).unwrap(),
                    device.name,
                    "alias {alias:?}"
                );
            }
        }
    }
}

#[test]
fn alias_case_variants_are_not_supported() {
    let catalog = fixture_catalog();
    for device in catalog.available_devices() {
        let lower = device.name.to_lowercase();
        if lower != device.name {
            assert!(matches!(
                catalog.canonical_name(&lower),
                Err(ResolveError::UnknownDevice { .. })
            ));
        }
    }
}

#[test]
fn available_devices_are_ordered_by_name() {
    let catalog = fixture_catalog();
    let names: Vec<&str> = catalog
        .available_devices()
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert_eq!(names.len(), 7);
}

#[test]
fn supported_versions_strictly_descend() {
    for catalog in [fixture_catalog(), synthetic_catalog()] {
        for device in catalog.available_devices() {
            let versions = catalog.supported_sdk_versions(&device.name).unwrap();
            for pair in versions.windows(2) {
                assert!(pair[0] > pair[1], "{}: {:?}", device.name, versions);
            }
        }
    }
}

#[test]
fn fixture_device_support() {
    let catalog = fixture_catalog();
    let shorts = |name: &str| -> Vec<String> {
        catalog
            .supported_sdk_versions(name)
            .unwrap()
            .iter()
            .map(OsVersion::short)
            .collect()
    };

    assert_eq!(shorts("iPhone 6"), vec!["12.1", "11.0", "10.3"]);
    assert_eq!(shorts("iPhone X"), vec!["12.1", "11.0"]);
    assert_eq!(shorts("iPhone 5"), vec!["11.0", "10.3"]);
    assert_eq!(shorts("Apple TV"), vec!["12.1"]);
    assert!(shorts("iPhone 4s").is_empty());
}

#[test]
fn availability_and_cpu() {
    let catalog = fixture_catalog();
    assert!(catalog.is_available("iPhone 6"));
    assert!(!catalog.is_available("iPhone-6"));
    assert!(!catalog.is_available("iPhone 15"));

    assert_eq!(catalog.cpu_type("iPhone 5").unwrap(), CpuType::I386);
    assert_eq!(catalog.cpu_type("iPhone 4s").unwrap(), CpuType::I386);
    assert_eq!(
        catalog.cpu_type("iPhone 6").unwrap(),
        CpuType::host_simulator_default()
    );
    assert!(matches!(
        catalog.cpu_type("iPhone 15"),
        Err(ResolveError::UnknownDevice { .. })
    ));
}

#[test]
fn base_version_maps_short_to_full() {
    let catalog = fixture_catalog();
    assert_eq!(catalog.base_version("11.0").unwrap(), OsVersion::new(11, 0, 1));
    assert_eq!(catalog.base_version("11").unwrap(), OsVersion::new(11, 0, 1));
    assert_eq!(catalog.base_version("10.3").unwrap(), OsVersion::new(10, 3, 1));
    assert_eq!(catalog.base_version("12.1").unwrap(), OsVersion::new(12, 1, 0));
}

#[test]
fn base_version_without_mapping_fails_instead_of_passing_through() {
    let catalog = fixture_catalog();
    assert_eq!(
        catalog.base_version("9.0"),
        Err(ResolveError::UnresolvedVersion {
            version: "9.0".to_string()
        })
    );
    // Already-full versions are not treated as their own base.
    assert!(matches!(
        catalog.base_version("11.0.1"),
        Err(ResolveError::UnresolvedVersion { .. })
    ));
}

#[test]
fn available_sdk_versions_span_platforms() {
    let catalog = fixture_catalog();
    let versions: Vec<String> = catalog
        .available_sdk_versions()
        .iter()
        .map(OsVersion::short)
        .collect();
    assert_eq!(versions, vec!["12.1", "11.0", "10.3"]);
    assert_eq!(
        catalog.sdk_version_for_os_version("10"),
        Some(OsVersion::new(10, 3, 0))
    );
}
