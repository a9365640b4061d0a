use crate::error::{Result, UpdaterError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version from a tag string (e.g., "v1.2.3" -> Version(1,2,3)).
    ///
    /// Accepts one to three numeric components; missing components are zero,
    /// so "v4" is 4.0.0 and "v4.1" is 4.1.0.
    pub fn parse(tag: &str) -> Option<Self> {
        let clean_tag = tag
            .strip_prefix('v')
            .or_else(|| tag.strip_prefix('V'))
            .unwrap_or(tag);

        let parts: Vec<&str> = clean_tag.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return None;
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = part.parse().ok()?;
        }

        Some(Version::new(numbers[0], numbers[1], numbers[2]))
    }

    /// Whether `self` is an acceptable upgrade from `current` under `release_type`
    pub fn is_upgrade_of(&self, current: &Version, release_type: ReleaseType) -> bool {
        match release_type {
            ReleaseType::Major => self.major > current.major,
            ReleaseType::Minor => self.major == current.major && self.minor > current.minor,
            ReleaseType::Patch => {
                self.major == current.major
                    && self.minor == current.minor
                    && self.patch > current.patch
            }
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A version string that either follows `major.minor.patch` or does not.
///
/// Only the `Semantic` side carries an ordering; an `Opaque` value can be
/// inspected but never compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedVersion {
    Semantic(Version),
    Opaque(String),
}

impl ParsedVersion {
    pub fn parse(raw: &str) -> Self {
        match Version::parse(raw) {
            Some(version) => ParsedVersion::Semantic(version),
            None => ParsedVersion::Opaque(raw.to_string()),
        }
    }

    pub fn semantic(&self) -> Option<&Version> {
        match self {
            ParsedVersion::Semantic(version) => Some(version),
            ParsedVersion::Opaque(_) => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, ParsedVersion::Opaque(_))
    }
}

/// Classification of a version increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
}

impl ReleaseType {
    pub const ALL: [ReleaseType; 3] = [ReleaseType::Major, ReleaseType::Minor, ReleaseType::Patch];

    /// Parse a comma-separated release type list such as "minor, patch" or "all"
    pub fn parse_list(value: &str) -> Result<BTreeSet<ReleaseType>> {
        let mut types = BTreeSet::new();

        for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if item.eq_ignore_ascii_case("all") {
                types.extend(ReleaseType::ALL);
            } else {
                types.insert(item.parse()?);
            }
        }

        if types.is_empty() {
            return Err(UpdaterError::config(format!(
                "Invalid release types '{}': expected any of major, minor, patch or all",
                value
            )));
        }

        Ok(types)
    }
}

impl FromStr for ReleaseType {
    type Err = UpdaterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(ReleaseType::Major),
            "minor" => Ok(ReleaseType::Minor),
            "patch" => Ok(ReleaseType::Patch),
            other => Err(UpdaterError::config(format!(
                "Unknown release type '{}': expected major, minor or patch",
                other
            ))),
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseType::Major => write!(f, "major"),
            ReleaseType::Minor => write!(f, "minor"),
            ReleaseType::Patch => write!(f, "patch"),
        }
    }
}
