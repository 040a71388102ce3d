//! Where profile documents come from
//!
//! - [`FileProfileSource`]: `<dir>/<version>/<name>.yaml`, with an optional
//!   override directory searched before the default one
//! - [`MemoryProfileSource`]: in-memory profiles for embedding and tests

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use meshspec_versions::Version;
use tracing::trace;

use crate::error::{ProfileError, Result};

const PROFILE_EXTENSION: &str = "yaml";

/// Maximum edit distance for "did you mean" suggestions
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Trait for profile document providers
pub trait ProfileSource: Send + Sync {
    /// Read the text of a profile for a version
    fn read(&self, version: Version, name: &str) -> Result<String>;

    /// Names of every profile available for a version, sorted
    fn available(&self, version: Version) -> Result<Vec<String>>;
}

/// Reject names that could escape the profile directory
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(std::path::is_separator) {
        return Err(ProfileError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn not_found(name: &str, version: Version, searched: String, available: &[String]) -> ProfileError {
    let suggestion = available
        .iter()
        .map(|candidate| (strsim::levenshtein(name, candidate), candidate))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| format!("did you mean `{candidate}`?"));

    ProfileError::NotFound {
        name: name.to_string(),
        version: version.to_string(),
        searched,
        suggestion,
    }
}

/// Profiles stored as files on disk
#[derive(Debug, Clone)]
pub struct FileProfileSource {
    default_dir: PathBuf,
    override_dir: Option<PathBuf>,
}

impl FileProfileSource {
    pub fn new(default_dir: impl Into<PathBuf>) -> Self {
        Self {
            default_dir: default_dir.into(),
            override_dir: None,
        }
    }

    /// Search `dir` before the default directory
    pub fn with_override_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.override_dir = Some(dir.into());
        self
    }

    /// Directories in search order
    fn dirs(&self) -> impl Iterator<Item = &Path> {
        self.override_dir
            .as_deref()
            .into_iter()
            .chain(std::iter::once(self.default_dir.as_path()))
    }

    fn profile_path(dir: &Path, version: Version, name: &str) -> PathBuf {
        dir.join(version.as_str()).join(format!("{name}.{PROFILE_EXTENSION}"))
    }
}

impl ProfileSource for FileProfileSource {
    fn read(&self, version: Version, name: &str) -> Result<String> {
        validate_name(name)?;

        for dir in self.dirs() {
            let path = Self::profile_path(dir, version, name);
            trace!(path = %path.display(), "looking up profile");
            if path.is_file() {
                return Ok(std::fs::read_to_string(&path)?);
            }
        }

        let searched = self
            .dirs()
            .map(|dir| dir.join(version.as_str()).display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(not_found(name, version, searched, &self.available(version)?))
    }

    fn available(&self, version: Version) -> Result<Vec<String>> {
        let mut names = BTreeSet::new();

        for dir in self.dirs() {
            let version_dir = dir.join(version.as_str());
            if !version_dir.is_dir() {
                continue;
            }

            for entry in walkdir::WalkDir::new(&version_dir)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let is_profile = path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy() == PROFILE_EXTENSION);
                if let (true, Some(stem)) = (is_profile, path.file_stem()) {
                    names.insert(stem.to_string_lossy().into_owned());
                }
            }
        }

        Ok(names.into_iter().collect())
    }
}

/// Profiles held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileSource {
    profiles: HashMap<(Version, String), String>,
}

impl MemoryProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, version: Version, name: impl Into<String>, content: impl Into<String>) {
        self.profiles.insert((version, name.into()), content.into());
    }

    pub fn with_profile(mut self, version: Version, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(version, name, content);
        self
    }
}

impl ProfileSource for MemoryProfileSource {
    fn read(&self, version: Version, name: &str) -> Result<String> {
        validate_name(name)?;
        match self.profiles.get(&(version, name.to_string())) {
            Some(content) => Ok(content.clone()),
            None => Err(not_found(name, version, "memory".to_string(), &self.available(version)?)),
        }
    }

    fn available(&self, version: Version) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .profiles
            .keys()
            .filter(|(v, _)| *v == version)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_profile(dir: &Path, version: Version, name: &str, content: &str) {
        let version_dir = dir.join(version.as_str());
        fs::create_dir_all(&version_dir).unwrap();
        fs::write(version_dir.join(format!("{name}.yaml")), content).unwrap();
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("default").is_ok());
        assert!(validate_name("small-v2").is_ok());
        assert!(matches!(validate_name("../etc/passwd"), Err(ProfileError::InvalidName { .. })));
        assert!(matches!(validate_name("a/b"), Err(ProfileError::InvalidName { .. })));
        assert!(matches!(validate_name(""), Err(ProfileError::InvalidName { .. })));
    }

    #[test]
    fn test_override_dir_is_searched_first() {
        let defaults = TempDir::new().unwrap();
        let overrides = TempDir::new().unwrap();
        write_profile(defaults.path(), Version::V2_0, "default", "spec: {version: from-default}\n");
        write_profile(overrides.path(), Version::V2_0, "default", "spec: {version: from-override}\n");
        write_profile(defaults.path(), Version::V2_0, "small", "spec: {}\n");

        let source = FileProfileSource::new(defaults.path()).with_override_dir(overrides.path());

        assert!(source.read(Version::V2_0, "default").unwrap().contains("from-override"));
        assert!(source.read(Version::V2_0, "small").is_ok());
    }

    #[test]
    fn test_profiles_are_per_version() {
        let defaults = TempDir::new().unwrap();
        write_profile(defaults.path(), Version::V2_0, "default", "spec: {}\n");
        let source = FileProfileSource::new(defaults.path());

        let err = source.read(Version::V1_1, "default").unwrap_err();
        assert!(matches!(err, ProfileError::NotFound { .. }));
    }

    #[test]
    fn test_not_found_suggests_close_name() {
        let defaults = TempDir::new().unwrap();
        write_profile(defaults.path(), Version::V2_0, "default", "spec: {}\n");
        let source = FileProfileSource::new(defaults.path());

        match source.read(Version::V2_0, "defualt").unwrap_err() {
            ProfileError::NotFound { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("did you mean `default`?"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_available() {
        let defaults = TempDir::new().unwrap();
        let overrides = TempDir::new().unwrap();
        write_profile(defaults.path(), Version::V2_0, "default", "spec: {}\n");
        write_profile(defaults.path(), Version::V2_0, "small", "spec: {}\n");
        write_profile(overrides.path(), Version::V2_0, "default", "spec: {}\n");
        write_profile(overrides.path(), Version::V2_0, "custom", "spec: {}\n");
        fs::write(defaults.path().join("v2.0").join("README.md"), "notes").unwrap();

        let source = FileProfileSource::new(defaults.path()).with_override_dir(overrides.path());

        assert_eq!(source.available(Version::V2_0).unwrap(), vec!["custom", "default", "small"]);
        assert!(source.available(Version::V1_0).unwrap().is_empty());
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryProfileSource::new()
            .with_profile(Version::V2_0, "default", "spec: {}\n")
            .with_profile(Version::V2_1, "other", "spec: {}\n");

        assert_eq!(source.read(Version::V2_0, "default").unwrap(), "spec: {}\n");
        assert!(source.read(Version::V2_0, "other").is_err());
        assert_eq!(source.available(Version::V2_1).unwrap(), vec!["other"]);
        assert!(source.read(Version::V2_0, "x/y").is_err());
    }
}
