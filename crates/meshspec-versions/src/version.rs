//! Supported control plane versions

use std::fmt;
use std::str::FromStr;

use phf::phf_map;

use crate::error::{Result, VersionError};

/// Maximum edit distance for "did you mean" suggestions
const MAX_SUGGESTION_DISTANCE: usize = 1;

/// A supported control plane version, ordered oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    V1_0,
    V1_1,
    V2_0,
    V2_1,
    V2_2,
}

static VERSIONS: phf::Map<&'static str, Version> = phf_map! {
    "v1.0" => Version::V1_0,
    "v1.1" => Version::V1_1,
    "v2.0" => Version::V2_0,
    "v2.1" => Version::V2_1,
    "v2.2" => Version::V2_2,
};

impl Version {
    pub const ALL: &'static [Version] = &[
        Version::V1_0,
        Version::V1_1,
        Version::V2_0,
        Version::V2_1,
        Version::V2_2,
    ];

    /// Version used when a specification leaves its version empty
    pub const DEFAULT: Version = Version::V2_2;

    /// Parse a version string such as `v2.0`
    pub fn parse(s: &str) -> Result<Version> {
        VERSIONS
            .get(s)
            .copied()
            .ok_or_else(|| VersionError::UnknownVersion {
                version: s.to_string(),
                suggestion: suggest(s),
            })
    }

    /// Parse a version string, treating an empty string as [`Version::DEFAULT`]
    pub fn parse_or_default(s: &str) -> Result<Version> {
        if s.is_empty() {
            Ok(Self::DEFAULT)
        } else {
            Self::parse(s)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::V1_0 => "v1.0",
            Version::V1_1 => "v1.1",
            Version::V2_0 => "v2.0",
            Version::V2_1 => "v2.1",
            Version::V2_2 => "v2.2",
        }
    }

    /// Position in [`Version::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn semver(&self) -> semver::Version {
        match self {
            Version::V1_0 => semver::Version::new(1, 0, 0),
            Version::V1_1 => semver::Version::new(1, 1, 0),
            Version::V2_0 => semver::Version::new(2, 0, 0),
            Version::V2_1 => semver::Version::new(2, 1, 0),
            Version::V2_2 => semver::Version::new(2, 2, 0),
        }
    }

    /// Whether this version is at least `major.minor`
    pub fn at_least(&self, major: u64, minor: u64) -> bool {
        self.semver() >= semver::Version::new(major, minor, 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn suggest(input: &str) -> Option<String> {
    let normalized = if input.starts_with('v') {
        input.to_string()
    } else {
        format!("v{input}")
    };

    Version::ALL
        .iter()
        .map(|v| (v.as_str(), strsim::levenshtein(&normalized, v.as_str())))
        .filter(|(_, distance)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| format!("did you mean `{candidate}`?"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_versions() {
        for version in Version::ALL {
            assert_eq!(Version::parse(version.as_str()).unwrap(), *version);
        }
        assert_eq!("v2.1".parse::<Version>().unwrap(), Version::V2_1);
    }

    #[test]
    fn test_every_version_has_a_string() {
        assert_eq!(VERSIONS.len(), Version::ALL.len());
        for (index, version) in Version::ALL.iter().enumerate() {
            assert_eq!(version.index(), index);
            assert_eq!(VERSIONS.get(version.as_str()), Some(version));
        }
    }

    #[test]
    fn test_unknown_version_is_recoverable() {
        let err = Version::parse("v9.9").unwrap_err();
        match err {
            VersionError::UnknownVersion { version, suggestion } => {
                assert_eq!(version, "v9.9");
                assert!(suggestion.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_version_suggestion() {
        let err = Version::parse("2.0").unwrap_err();
        match err {
            VersionError::UnknownVersion { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("did you mean `v2.0`?"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_version_uses_default() {
        assert_eq!(Version::parse_or_default("").unwrap(), Version::DEFAULT);
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(Version::V1_0 < Version::V1_1);
        assert!(Version::V2_0 < Version::V2_2);
        assert!(Version::V2_0.at_least(2, 0));
        assert!(!Version::V1_1.at_least(2, 0));
        assert_eq!(Version::V2_1.semver().to_string(), "2.1.0");
    }
}
