//! Build profiles
//!
//! Framework slices are produced per profile, mirroring the debug/release
//! framework pairs emitted by the native toolchain.

use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};

/// Build profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Debug profile (default)
    #[default]
    Debug,
    /// Release profile
    Release,
}

impl Profile {
    /// Parse profile from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> BuildResult<Self> {
        match s.to_lowercase().as_str() {
            "debug" | "dev" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            other => Err(BuildError::InvalidProfile(other.to_string())),
        }
    }

    /// Get profile name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    /// Directory holding the framework for one target slice
    pub fn framework_dir_name(&self) -> String {
        format!("{}Framework", self.name())
    }

    /// Xcode build configuration name
    pub fn configuration(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
