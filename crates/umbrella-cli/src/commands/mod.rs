//! CLI command implementations

pub mod build;
pub mod check;
pub mod init;
pub mod targets;

use anyhow::{Context, Result};
use std::path::Path;
use umbrella_build::{Builder, Profile};

/// Open a builder for an explicit descriptor path, or discover one from the
/// current directory
pub fn open_builder(manifest_path: Option<&Path>) -> Result<Builder> {
    match manifest_path {
        Some(path) => Builder::new(path)
            .with_context(|| format!("Failed to open descriptor at {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Builder::discover(&cwd).context("Failed to locate umbrella.toml")
        }
    }
}

/// Determine the build profile: `--release` wins, then the named profile
pub fn determine_profile(release: bool, profile: Option<&str>) -> Result<Profile> {
    if release {
        return Ok(Profile::Release);
    }
    match profile {
        Some(name) => Profile::from_str(name).context("Invalid profile"),
        None => Ok(Profile::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_profile() {
        assert_eq!(determine_profile(false, None).unwrap(), Profile::Debug);
        assert_eq!(determine_profile(true, None).unwrap(), Profile::Release);
        assert_eq!(
            determine_profile(false, Some("release")).unwrap(),
            Profile::Release
        );
        assert_eq!(
            determine_profile(true, Some("debug")).unwrap(),
            Profile::Release
        );
        assert!(determine_profile(false, Some("fast")).is_err());
    }

    #[test]
    fn test_open_builder_missing_descriptor() {
        let temp = tempfile::tempdir().unwrap();
        let err = open_builder(Some(temp.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to open descriptor"));
    }
}
