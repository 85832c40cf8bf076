//! Dotted numeric OS/SDK versions.
//!
//! Versions are compared by component with missing components treated as
//! zero, so `"12"`, `"12.0"` and `"12.0.0"` are equal. Two renderings exist:
//! the *short* form (`major.minor`) used for SDK short versions, and the
//! *full* form, which appends the patch component when it is non-zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ResolveError;

/// A `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl OsVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Parses one to three dot-separated numeric components.
    pub fn parse(input: &str) -> Result<Self, ResolveError> {
        let trimmed = input.trim();
        let invalid = || ResolveError::InvalidVersion(input.to_string());

        let mut parts = [0u32; 3];
        let mut count = 0;
        for component in trimmed.split('.') {
            if count == parts.len() || component.is_empty() {
                return Err(invalid());
            }
            if !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            parts[count] = component.parse().map_err(|_| invalid())?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    /// Decodes simctl's packed runtime number (`major << 16 | minor << 8 | patch`).
    pub const fn from_packed(packed: u32) -> Self {
        Self::new(packed >> 16, (packed >> 8) & 0xff, packed & 0xff)
    }

    /// The `major.minor` rendering.
    pub fn short(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// This version with the patch component dropped.
    pub const fn to_short(self) -> Self {
        Self::new(self.major, self.minor, 0)
    }

    /// Whether `self` begins with the components explicitly written in `prefix`.
    ///
    /// `"12"` is a prefix of 12.1 and 12.4.1; `"12.1"` is a prefix of 12.1.1
    /// but not of 12.10.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let Ok(parsed) = Self::parse(prefix) else {
            return false;
        };
        let depth = prefix.trim().split('.').count();
        let mine = [self.major, self.minor, self.patch];
        let theirs = [parsed.major, parsed.minor, parsed.patch];
        mine[..depth] == theirs[..depth]
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

impl FromStr for OsVersion {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for OsVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OsVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_zero_components_are_equivalent() {
        let a = OsVersion::parse("12").unwrap();
        let b = OsVersion::parse("12.0").unwrap();
        let c = OsVersion::parse("12.0.0").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn ordering_is_numeric_not_lexical() {
        let v9 = OsVersion::parse("9.3").unwrap();
        let v10 = OsVersion::parse("10.0").unwrap();
        let v12_10 = OsVersion::parse("12.10").unwrap();
        let v12_9 = OsVersion::parse("12.9").unwrap();
        assert!(v9 < v10);
        assert!(v12_9 < v12_10);
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "12.", ".1", "12.x", "1.2.3.4", "latest", "-1"] {
            assert!(
                matches!(OsVersion::parse(bad), Err(ResolveError::InvalidVersion(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn display_drops_zero_patch_only() {
        assert_eq!(OsVersion::parse("12").unwrap().to_string(), "12.0");
        assert_eq!(OsVersion::parse("12.1.0").unwrap().to_string(), "12.1");
        assert_eq!(OsVersion::parse("12.1.1").unwrap().to_string(), "12.1.1");
        assert_eq!(OsVersion::parse("12.1.1").unwrap().short(), "12.1");
    }

    #[test]
    fn decodes_packed_runtime_numbers() {
        // 8.0.0 and 65535.255.255 are the bounds simctl reports for iPhone 6.
        assert_eq!(OsVersion::from_packed(524288), OsVersion::new(8, 0, 0));
        assert_eq!(
            OsVersion::from_packed(4294967295),
            OsVersion::new(65535, 255, 255)
        );
    }

    #[test]
    fn prefix_matching_respects_component_boundaries() {
        let v = OsVersion::parse("12.1.1").unwrap();
        assert!(v.has_prefix("12"));
        assert!(v.has_prefix("12.1"));
        assert!(v.has_prefix("12.1.1"));
        assert!(!v.has_prefix("12.10"));
        assert!(!v.has_prefix("1"));
        assert!(!v.has_prefix("garbage"));
    }

    #[test]
    fn serde_uses_string_form() {
        let v = OsVersion::parse("11.4").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"11.4\"");
        let back: OsVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
