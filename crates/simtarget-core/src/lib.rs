//! # simtarget-core
//!
//! Resolves a human-supplied device alias and OS version into a concrete,
//! launchable iOS Simulator target on macOS.
//!
//! Three independently versioned axes have to be reconciled: the simulated
//! hardware profile, the OS/SDK version, and the CPU architecture. Not every
//! device supports every SDK, SDK short versions differ from full runtime
//! versions, and 32-bit hardware implies a different CPU type. This crate
//! computes *what* to launch and *with which environment*; spawning the
//! process is left to the caller.
//!
//! ## Modules
//!
//! - [`catalog`] - Snapshot of installed device types and runtimes, with capability queries
//! - [`resolver`] - Stateful resolver producing a [`resolver::ResolvedTarget`]
//! - [`launch`] - Launch environment and launch-timeout policy
//! - [`simctl`] - Reads the host inventory through `xcrun simctl`
//! - [`build_settings`] - Xcode build settings (test host, product bundle)
//! - [`device`], [`runtime`], [`arch`], [`version`] - Inventory records and value types
//! - [`config`] - Persistent user configuration in `~/.simtarget/`
//! - [`error`] - Resolution errors
//!
//! ## External Dependencies
//!
//! Only [`catalog::host_catalog`] and [`simctl::Simctl::list_inventory`] touch
//! the host, and they require **Xcode** (for `xcrun simctl`). Everything else
//! works on an injected [`catalog::DeviceCatalog`].
//!
//! ## Example
//!
//! ```no_run
//! use simtarget_core::catalog::host_catalog;
//! use simtarget_core::resolver::SimulatorResolver;
//!
//! let mut resolver = SimulatorResolver::new(host_catalog().expect("simctl inventory"));
//! resolver.set_device_name("iPhone 6");
//! resolver.set_os_version("12.1");
//!
//! let env = resolver.build_launch_environment().expect("resolvable target");
//! println!("{:?}", env.get("SIMULATOR_ROOT"));
//! ```

pub mod arch;
pub mod build_settings;
pub mod catalog;
pub mod config;
pub mod device;
pub mod error;
pub mod launch;
pub mod resolver;
pub mod runtime;
pub mod simctl;
pub mod version;
