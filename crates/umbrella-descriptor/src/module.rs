//! Validated module model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A validated module description
///
/// Built once by the [`Validator`](crate::Validator) and never mutated
/// afterwards. Target identifiers are kept abstract here; concrete platform
/// targets are produced by the target resolver in `umbrella-build`.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Module name
    pub name: String,
    /// Build plugins applied to the module
    pub plugins: Vec<Plugin>,
    /// Abstract target platform identifiers, in declaration order
    pub targets: Vec<String>,
    /// Dependencies on other modules, in declaration order
    pub dependencies: Vec<DependencyRef>,
    /// Embedded runtime dependency (e.g. a UI rendering runtime)
    pub runtime: Option<String>,
    /// Framework packaging metadata
    pub packaging: Option<PackagingSpec>,
    /// Android library metadata
    pub android: Option<AndroidConfig>,
    /// Descriptor file this module was loaded from
    pub source: Option<PathBuf>,
    /// sha256 of the descriptor source text
    pub fingerprint: Option<String>,
}

impl Module {
    /// A prebuilt module referenced only by name
    ///
    /// Leaf modules declare no targets or dependencies of their own.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plugins: Vec::new(),
            targets: Vec::new(),
            dependencies: Vec::new(),
            runtime: None,
            packaging: None,
            android: None,
            source: None,
            fingerprint: None,
        }
    }

    /// Names of the direct dependencies
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().map(|d| d.name.as_str())
    }

    /// Whether `name` is a direct dependency of this module
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.name == name)
    }

    /// Whether the given plugin is applied
    pub fn has_plugin(&self, plugin: Plugin) -> bool {
        self.plugins.contains(&plugin)
    }
}

/// Reference to a dependency module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRef {
    pub name: String,
    /// Directory or file holding the dependency's descriptor, resolved
    /// against the declaring descriptor's directory by the loader
    pub path: Option<PathBuf>,
}

impl DependencyRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Framework packaging metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PackagingSpec {
    /// Framework base name (`<base>.framework`)
    pub base_name: String,
    pub version: semver::Version,
    pub linkage: Linkage,
    /// Minimum Apple OS version the framework supports
    pub minimum_os: Option<OsVersion>,
    /// Dependencies whose public API is re-exported by the framework
    pub exports: Vec<String>,
    pub summary: Option<String>,
    pub homepage: Option<String>,
}

impl PackagingSpec {
    /// Version used when `framework.version` is omitted
    pub const DEFAULT_VERSION: semver::Version = semver::Version::new(1, 0, 0);

    /// Packaging defaults for a module without a `[framework]` section
    pub fn for_module(module_name: &str) -> Self {
        Self::new(module_name, Self::DEFAULT_VERSION)
    }

    pub fn new(base_name: impl Into<String>, version: semver::Version) -> Self {
        Self {
            base_name: base_name.into(),
            version,
            linkage: Linkage::default(),
            minimum_os: None,
            exports: Vec::new(),
            summary: None,
            homepage: None,
        }
    }

    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    pub fn with_minimum_os(mut self, minimum_os: OsVersion) -> Self {
        self.minimum_os = Some(minimum_os);
        self
    }

    pub fn with_exports(mut self, exports: Vec<String>) -> Self {
        self.exports = exports;
        self
    }
}

/// Framework linkage mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Static framework, linked into the host binary
    #[default]
    Static,
    /// Dynamic framework, embedded and loaded at runtime
    Dynamic,
}

impl Linkage {
    /// Parse linkage from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Some(Self::Static),
            "dynamic" => Some(Self::Dynamic),
            _ => None,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static)
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Operating system version (`MAJOR[.MINOR[.PATCH]]`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl OsVersion {
    /// Deployment target used when Apple slices are packaged without one
    pub const DEFAULT_DEPLOYMENT_TARGET: OsVersion = OsVersion::new(15, 1, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse an OS version, missing components default to zero
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(major, minor, patch))
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

impl Serialize for OsVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OsVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        OsVersion::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid OS version '{}'", s)))
    }
}

/// Android library metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AndroidConfig {
    pub namespace: Option<String>,
    pub compile_sdk: Option<u32>,
    pub min_sdk: Option<u32>,
}

impl AndroidConfig {
    /// Namespace derived from a module name (`com.example.<name>`)
    pub fn default_namespace(module_name: &str) -> String {
        format!(
            "com.example.{}",
            module_name.to_ascii_lowercase().replace('-', "_")
        )
    }
}

/// Build plugin applied to a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Plugin {
    KotlinMultiplatform,
    Cocoapods,
    ComposeMultiplatform,
    AndroidLibrary,
    ComposeCompiler,
}

impl Plugin {
    /// All known plugins
    pub const ALL: [Plugin; 5] = [
        Plugin::KotlinMultiplatform,
        Plugin::Cocoapods,
        Plugin::ComposeMultiplatform,
        Plugin::AndroidLibrary,
        Plugin::ComposeCompiler,
    ];

    /// Parse a plugin id, ignoring case and `-`/`_` separators
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|p| p.id().replace('-', "") == normalized)
    }

    /// Canonical plugin id
    pub fn id(&self) -> &'static str {
        match self {
            Self::KotlinMultiplatform => "kotlin-multiplatform",
            Self::Cocoapods => "cocoapods",
            Self::ComposeMultiplatform => "compose-multiplatform",
            Self::AndroidLibrary => "android-library",
            Self::ComposeCompiler => "compose-compiler",
        }
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_version_parse() {
        assert_eq!(OsVersion::parse("15.1"), Some(OsVersion::new(15, 1, 0)));
        assert_eq!(OsVersion::parse("16"), Some(OsVersion::new(16, 0, 0)));
        assert_eq!(OsVersion::parse("14.2.1"), Some(OsVersion::new(14, 2, 1)));
        assert_eq!(OsVersion::parse("15.x"), None);
        assert_eq!(OsVersion::parse("1.2.3.4"), None);
        assert_eq!(OsVersion::parse(""), None);
    }

    #[test]
    fn test_os_version_display() {
        assert_eq!(OsVersion::new(15, 1, 0).to_string(), "15.1");
        assert_eq!(OsVersion::new(14, 2, 1).to_string(), "14.2.1");
    }

    #[test]
    fn test_os_version_ordering() {
        assert!(OsVersion::new(15, 1, 0) > OsVersion::new(14, 9, 9));
        assert!(OsVersion::new(15, 1, 0) < OsVersion::new(15, 1, 1));
    }

    #[test]
    fn test_packaging_defaults() {
        let spec = PackagingSpec::for_module("Umbrella");
        assert_eq!(spec.base_name, "Umbrella");
        assert_eq!(spec.version.to_string(), "1.0.0");
        assert_eq!(spec.linkage, Linkage::Static);
        assert_eq!(OsVersion::DEFAULT_DEPLOYMENT_TARGET.to_string(), "15.1");
    }

    #[test]
    fn test_default_namespace() {
        assert_eq!(
            AndroidConfig::default_namespace("Shared-Kit"),
            "com.example.shared_kit"
        );
    }

    #[test]
    fn test_linkage_parse() {
        assert_eq!(Linkage::from_str("static"), Some(Linkage::Static));
        assert_eq!(Linkage::from_str("Dynamic"), Some(Linkage::Dynamic));
        assert_eq!(Linkage::from_str("shared"), None);
        assert_eq!(Linkage::default(), Linkage::Static);
    }

    #[test]
    fn test_plugin_aliases() {
        assert_eq!(
            Plugin::from_str("kotlinMultiplatform"),
            Some(Plugin::KotlinMultiplatform)
        );
        assert_eq!(
            Plugin::from_str("compose_compiler"),
            Some(Plugin::ComposeCompiler)
        );
        assert_eq!(Plugin::from_str("cocoapods"), Some(Plugin::Cocoapods));
        assert_eq!(Plugin::from_str("serialization"), None);
    }

    #[test]
    fn test_module_depends_on() {
        let mut module = Module::leaf("umbrella");
        module.dependencies.push(DependencyRef::new("core"));
        assert!(module.depends_on("core"));
        assert!(!module.depends_on("network"));
        assert_eq!(module.dependency_names().collect::<Vec<_>>(), vec!["core"]);
    }
}
