//! CLI for inspecting and resolving iOS Simulator launch targets.
//!
//! Reads the installed simulator inventory (or a saved copy of it) and
//! answers what a test run would launch for a given device alias and OS
//! version.
//!
//! # Usage
//!
//! ```bash
//! # List installed device types with their supported SDKs
//! simtarget devices
//!
//! # SDK versions installed on this host, or supported by one device
//! simtarget sdks
//! simtarget sdks --device "iPhone 6"
//!
//! # Resolve a target (newest supported SDK when --os is omitted)
//! simtarget resolve --device "iPhone 6"
//! simtarget resolve -d "iPhone X" --os 11.0 --arch x86_64
//!
//! # Print the launch environment for a test bundle
//! simtarget env -d "iPad Air" --build-settings build_settings.txt
//!
//! # Work from saved `xcrun simctl list devicetypes runtimes -j` output
//! simtarget --inventory inventory.json --format json resolve -d "iPhone 6"
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use simtarget_core::arch::CpuType;
use simtarget_core::build_settings::BuildSettings;
use simtarget_core::catalog::{host_catalog, DeviceCatalog};
use simtarget_core::config::SimtargetConfig;
use simtarget_core::error::ResolveError;
use simtarget_core::resolver::{ResolvedTarget, SimulatorResolver};
use simtarget_core::simctl::SimctlError;
use simtarget_core::version::OsVersion;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI for inspecting and resolving iOS Simulator launch targets.
#[derive(Parser)]
#[command(name = "simtarget")]
#[command(about = "Resolve device aliases and OS versions into iOS Simulator launch targets")]
#[command(version)]
struct Cli {
    /// Saved `xcrun simctl list devicetypes runtimes -j` output to use instead of the host inventory
    #[arg(short, long, env = "SIMTARGET_INVENTORY")]
    inventory: Option<PathBuf>,

    /// Config file (defaults to ~/.simtarget/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List installed device types
    Devices,

    /// List SDK versions, optionally only those a device supports
    Sdks {
        /// Device alias
        #[arg(short, long)]
        device: Option<String>,
    },

    /// Resolve a device and OS version into a launch target
    Resolve(TargetArgs),

    /// Print the launch environment for a resolved target
    Env(TargetArgs),
}

#[derive(Args)]
struct TargetArgs {
    /// Device alias (e.g., "iPhone 6")
    #[arg(short, long, env = "SIMTARGET_DEVICE")]
    device: Option<String>,

    /// OS version; omit or pass "latest" for the newest supported
    #[arg(short, long, env = "SIMTARGET_OS")]
    os: Option<String>,

    /// Force a CPU architecture (i386, x86_64, arm64)
    #[arg(short, long, value_parser = parse_arch)]
    arch: Option<CpuType>,

    /// Build settings file (`xcodebuild -showBuildSettings` text or `-json` output)
    #[arg(short, long)]
    build_settings: Option<PathBuf>,
}

fn parse_arch(name: &str) -> Result<CpuType, String> {
    CpuType::from_arch_name(name).ok_or_else(|| {
        let known: Vec<&str> = CpuType::ALL.iter().map(|c| c.arch_name()).collect();
        format!("unknown architecture '{}' (expected one of: {})", name, known.join(", "))
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
            } else {
                eprintln!("Error: {}", e);
            }
            e.exit_code()
        }
    }
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match &cli.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path.file_name().unwrap_or(path.as_os_str());
            let file_appender = tracing_appender::rolling::never(dir, file_name);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file_appender)
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[derive(Debug)]
enum CliError {
    Resolution(ResolveError),
    Inventory(String),
    Input(String),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Resolution(_) => ExitCode::from(1),
            CliError::Inventory(_) => ExitCode::from(2),
            CliError::Input(_) => ExitCode::from(3),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Resolution(e) => write!(f, "Resolution failed: {}", e),
            CliError::Inventory(msg) => write!(f, "Inventory error: {}", msg),
            CliError::Input(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl From<ResolveError> for CliError {
    fn from(e: ResolveError) -> Self {
        CliError::Resolution(e)
    }
}

impl From<SimctlError> for CliError {
    fn from(e: SimctlError) -> Self {
        CliError::Inventory(e.to_string())
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => SimtargetConfig::load_from(path),
        None => SimtargetConfig::load(),
    };
    let catalog = load_catalog(cli, &config)?;

    match &cli.command {
        Command::Devices => list_devices(cli, &catalog),
        Command::Sdks { device } => list_sdks(cli, &catalog, device.as_deref()),
        Command::Resolve(args) => {
            let mut resolver = configure(catalog, args, &config)?;
            let target = resolver.resolve()?;
            print_target(cli, target);
            Ok(())
        }
        Command::Env(args) => {
            let mut resolver = configure(catalog, args, &config)?;
            let env = resolver.build_launch_environment()?;
            if cli.format == OutputFormat::Json {
                println!("{}", to_json(&env)?);
            } else {
                for (key, value) in &env {
                    println!("{}={}", key, value);
                }
            }
            Ok(())
        }
    }
}

fn load_catalog(cli: &Cli, config: &SimtargetConfig) -> Result<Arc<DeviceCatalog>, CliError> {
    let inventory = cli.inventory.clone().or_else(|| config.inventory_path.clone());
    let catalog = match inventory {
        Some(path) => {
            debug!(path = %path.display(), "Loading saved inventory");
            let json = std::fs::read(&path)
                .map_err(|e| CliError::Input(format!("{}: {}", path.display(), e)))?;
            Arc::new(DeviceCatalog::from_simctl_json(&json)?)
        }
        None => host_catalog()?,
    };

    if config.aliases.is_empty() {
        return Ok(catalog);
    }
    let extended = Arc::unwrap_or_clone(catalog)
        .with_aliases(config.aliases.iter().map(|(alias, canonical)| (alias.clone(), canonical)));
    Ok(Arc::new(extended))
}

fn load_build_settings(path: &Path) -> Result<BuildSettings, CliError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::Input(format!("{}: {}", path.display(), e)))?;
    if raw.trim_start().starts_with('[') {
        BuildSettings::from_json(raw.as_bytes())
            .map_err(|e| CliError::Input(format!("{}: {}", path.display(), e)))
    } else {
        Ok(BuildSettings::parse_show_build_settings(&raw))
    }
}

fn configure(
    catalog: Arc<DeviceCatalog>,
    args: &TargetArgs,
    config: &SimtargetConfig,
) -> Result<SimulatorResolver, CliError> {
    let settings = match &args.build_settings {
        Some(path) => load_build_settings(path)?,
        None => BuildSettings::default(),
    };
    let mut resolver = SimulatorResolver::with_build_settings(catalog, settings);

    if let Some(device) = args.device.as_ref().or(config.default_device.as_ref()) {
        resolver.set_device_name(device.as_str());
    }
    if let Some(os) = args.os.as_ref().or(config.default_os_version.as_ref()) {
        resolver.set_os_version(os.as_str());
    }
    resolver.set_cpu_type(args.arch);
    Ok(resolver)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::Input(e.to_string()))
}

fn join_versions(versions: &[OsVersion]) -> String {
    versions
        .iter()
        .map(OsVersion::short)
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_devices(cli: &Cli, catalog: &DeviceCatalog) -> Result<(), CliError> {
    let devices = catalog.available_devices();

    if cli.format == OutputFormat::Json {
        let mut entries = Vec::with_capacity(devices.len());
        for device in devices {
            let sdks = catalog.supported_sdk_versions(&device.name)?;
            entries.push(serde_json::json!({
                "name": device.name,
                "identifier": device.identifier,
                "family": device.family,
                "family_code": device.family.code(),
                "arch": device.cpu_type.arch_name(),
                "supported_sdks": sdks,
            }));
        }
        println!("{}", to_json(&entries)?);
        return Ok(());
    }

    if devices.is_empty() {
        eprintln!("No simulator device types found");
    }
    for device in devices {
        let sdks = catalog.supported_sdk_versions(&device.name)?;
        let sdks = if sdks.is_empty() {
            "no supported SDKs".to_string()
        } else {
            format!("SDKs: {}", join_versions(&sdks))
        };
        println!(
            "{} -- {}, {}, {}",
            device.name,
            device.family,
            device.cpu_type.arch_name(),
            sdks
        );
    }
    Ok(())
}

fn list_sdks(cli: &Cli, catalog: &DeviceCatalog, device: Option<&str>) -> Result<(), CliError> {
    let (versions, canonical) = match device {
        Some(alias) => {
            let canonical = catalog.canonical_name(alias)?;
            (catalog.supported_sdk_versions(canonical)?, Some(canonical))
        }
        None => (catalog.available_sdk_versions(), None),
    };

    let rows: Vec<(OsVersion, Option<OsVersion>, bool)> = versions
        .iter()
        .map(|&short| match canonical {
            Some(name) => {
                let runtime = catalog.runtime_for(short, name);
                (
                    short,
                    runtime.map(|r| r.version),
                    runtime.is_some_and(|r| r.is_available),
                )
            }
            None => {
                let installed = catalog
                    .runtimes()
                    .iter()
                    .any(|r| r.short_version() == short && r.is_available);
                (short, catalog.base_version(&short.short()).ok(), installed)
            }
        })
        .collect();

    if cli.format == OutputFormat::Json {
        let entries: Vec<_> = rows
            .iter()
            .map(|(short, full, installed)| {
                serde_json::json!({
                    "version": short.short(),
                    "full_version": full,
                    "installed": installed,
                })
            })
            .collect();
        println!("{}", to_json(&entries)?);
        return Ok(());
    }

    if rows.is_empty() {
        eprintln!("No SDK versions found");
    }
    for (short, full, installed) in rows {
        let full = full.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string());
        let note = if installed { "" } else { " (not installed)" };
        println!("{} ({}){}", short.short(), full, note);
    }
    Ok(())
}

fn print_target(cli: &Cli, target: &ResolvedTarget) {
    let path_str = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());

    if cli.format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::json!({
                "device": target.device.name,
                "device_info_name": target.device_info_name(),
                "architecture": target.architecture(),
                "cpu_type": target.cpu_type.code(),
                "target_triple": target.cpu_type.target_triple(),
                "device_family": target.device_family(),
                "sdk_version": target.sdk_version.short(),
                "sdk_full_version": target.sdk_full_version(),
                "sdk_name": target.sdk_name(),
                "runtime": target.runtime.identifier,
                "system_root": target.system_root().display().to_string(),
                "launch_timeout_secs": target.launch_timeout.as_secs(),
                "test_host_path": path_str(&target.test_host_path),
                "product_bundle_path": path_str(&target.product_bundle_path),
            })
        );
        return;
    }

    println!("Device:          {}", target.device_info_name());
    println!("Architecture:    {}", target.architecture());
    println!("Device family:   {}", target.device_family());
    println!("SDK:             {} ({})", target.sdk_name(), target.sdk_full_version());
    println!("Runtime:         {}", target.runtime.identifier);
    println!("System root:     {}", target.system_root().display());
    println!("Launch timeout:  {}s", target.launch_timeout.as_secs());
    if let Some(path) = path_str(&target.test_host_path) {
        println!("Test host:       {}", path);
    }
    if let Some(path) = path_str(&target.product_bundle_path) {
        println!("Product bundle:  {}", path);
    }
}
