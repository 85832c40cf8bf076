//! Simulated CPU architectures.
//!
//! The mapping between Mach-O CPU type codes, architecture names and target
//! triples is a fixed table; nothing here is inferred from the host beyond
//! [`CpuType::host_simulator_default`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// `CPU_ARCH_ABI64` from `<mach/machine.h>`.
const ABI64: i32 = 0x0100_0000;

/// A simulated CPU type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuType {
    /// 32-bit Intel, used by legacy simulated hardware.
    I386,
    /// 64-bit Intel.
    X86_64,
    /// 64-bit ARM (Apple silicon hosts).
    Arm64,
}

impl CpuType {
    /// All known CPU types.
    pub const ALL: [CpuType; 3] = [CpuType::I386, CpuType::X86_64, CpuType::Arm64];

    /// The Mach-O `cpu_type_t` value.
    pub const fn code(self) -> i32 {
        match self {
            CpuType::I386 => 7,
            CpuType::X86_64 => 7 | ABI64,
            CpuType::Arm64 => 12 | ABI64,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|cpu| cpu.code() == code)
    }

    /// The architecture name used by Xcode build settings (`ARCHS`).
    pub const fn arch_name(self) -> &'static str {
        match self {
            CpuType::I386 => "i386",
            CpuType::X86_64 => "x86_64",
            CpuType::Arm64 => "arm64",
        }
    }

    pub fn from_arch_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cpu| cpu.arch_name() == name)
    }

    pub const fn target_triple(self) -> &'static str {
        match self {
            CpuType::I386 => "i386-apple-ios-simulator",
            CpuType::X86_64 => "x86_64-apple-ios-simulator",
            CpuType::Arm64 => "aarch64-apple-ios-sim",
        }
    }

    pub const fn is_64_bit(self) -> bool {
        self.code() & ABI64 != 0
    }

    /// The 64-bit simulator architecture native to this host.
    pub fn host_simulator_default() -> Self {
        if cfg!(target_arch = "aarch64") {
            CpuType::Arm64
        } else {
            CpuType::X86_64
        }
    }
}

impl fmt::Display for CpuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.arch_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_mach_headers() {
        assert_eq!(CpuType::I386.code(), 7);
        assert_eq!(CpuType::X86_64.code(), 0x0100_0007);
        assert_eq!(CpuType::Arm64.code(), 0x0100_000C);
    }

    #[test]
    fn table_lookups_agree() {
        for cpu in CpuType::ALL {
            assert_eq!(CpuType::from_code(cpu.code()), Some(cpu));
            assert_eq!(CpuType::from_arch_name(cpu.arch_name()), Some(cpu));
        }
        assert_eq!(CpuType::from_code(-1), None);
        assert_eq!(CpuType::from_arch_name("armv7"), None);
    }

    #[test]
    fn only_i386_is_32_bit() {
        assert!(!CpuType::I386.is_64_bit());
        assert!(CpuType::X86_64.is_64_bit());
        assert!(CpuType::Arm64.is_64_bit());
        assert!(CpuType::host_simulator_default().is_64_bit());
    }
}
