//! Raw descriptor schema (umbrella.toml)
//!
//! These types mirror the file layout one-to-one. Required fields are kept
//! optional here so that the [`Validator`](crate::Validator) can report the
//! missing field by name instead of surfacing a generic parse failure.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Module descriptor (umbrella.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Descriptor {
    #[serde(default)]
    pub module: Option<ModuleSection>,
    #[serde(default)]
    pub framework: Option<FrameworkSection>,
    #[serde(default)]
    pub android: Option<AndroidSection>,
}

impl Descriptor {
    /// Parse descriptor from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// `[module]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModuleSection {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

/// Dependency entry in `module.dependencies`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DependencySpec {
    /// Bare module name, packaged from a prebuilt module
    Name(String),
    /// Module with an explicit descriptor location
    Detailed(DetailedDependency),
}

impl DependencySpec {
    /// Dependency module name
    pub fn name(&self) -> &str {
        match self {
            DependencySpec::Name(name) => name,
            DependencySpec::Detailed(d) => &d.name,
        }
    }

    /// Descriptor location, if declared
    pub fn path(&self) -> Option<&Path> {
        match self {
            DependencySpec::Name(_) => None,
            DependencySpec::Detailed(d) => d.path.as_deref(),
        }
    }
}

/// Detailed dependency specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DetailedDependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// `[framework]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FrameworkSection {
    #[serde(default)]
    pub base_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub linkage: Option<String>,
    #[serde(default)]
    pub deployment_target: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub export: Vec<String>,
}

/// `[android]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AndroidSection {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub compile_sdk: Option<u32>,
    #[serde(default)]
    pub min_sdk: Option<u32>,
}
