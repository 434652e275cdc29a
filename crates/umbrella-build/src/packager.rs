//! Framework packaging
//!
//! Validates a resolved module graph against the root module's packaging
//! spec and produces the descriptor of the artifact to distribute.

use crate::build_order::BuildGraph;
use crate::error::{BuildError, BuildResult};
use crate::profile::Profile;
use crate::targets::PlatformTarget;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;
use umbrella_descriptor::{AndroidConfig, Linkage, OsVersion, PackagingSpec};

/// One per-target framework bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkSlice {
    pub target: PlatformTarget,
    /// Bundle path relative to the output directory
    pub path: PathBuf,
}

impl FrameworkSlice {
    pub fn new(target: PlatformTarget, profile: Profile, base_name: &str) -> Self {
        let path = PathBuf::from("ios")
            .join(target.name())
            .join(profile.framework_dir_name())
            .join(format!("{}.framework", base_name));
        Self { target, path }
    }
}

/// Android library produced alongside the Apple frameworks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidLibrary {
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile_sdk: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_sdk: Option<u32>,
    /// Library directory relative to the output directory
    pub path: PathBuf,
}

/// Descriptor of a packaged artifact, ready for distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDescriptor {
    /// Root module name
    pub module: String,
    pub base_name: String,
    pub version: semver::Version,
    pub linkage: Linkage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_os: Option<OsVersion>,
    pub exports: Vec<String>,
    pub targets: Vec<PlatformTarget>,
    pub frameworks: Vec<FrameworkSlice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidLibrary>,
    /// Aggregated modules in packaging order, root last
    pub modules: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// sha256 of the root descriptor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl ArtifactDescriptor {
    /// Bundle directory name (`<base>.framework`)
    pub fn framework_name(&self) -> String {
        format!("{}.framework", self.base_name)
    }

    pub fn is_static(&self) -> bool {
        self.linkage.is_static()
    }

    pub fn has_apple_slices(&self) -> bool {
        !self.frameworks.is_empty()
    }

    /// Slice vendored by the podspec: the device slice when there is one
    pub fn vendored_slice(&self) -> Option<&FrameworkSlice> {
        self.frameworks
            .iter()
            .find(|slice| !slice.target.is_simulator())
            .or_else(|| self.frameworks.first())
    }

    /// Render the manifest as pretty JSON
    pub fn to_json(&self) -> BuildResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Packages a root module and everything it aggregates
pub struct Packager<'g> {
    graph: &'g BuildGraph,
    profile: Profile,
    android: Option<AndroidConfig>,
    fingerprint: Option<String>,
}

impl<'g> Packager<'g> {
    /// Create a packager over a resolved module graph
    pub fn new(graph: &'g BuildGraph) -> Self {
        Self {
            graph,
            profile: Profile::default(),
            android: None,
            fingerprint: None,
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Android metadata of the root module
    pub fn with_android(mut self, android: Option<AndroidConfig>) -> Self {
        self.android = android;
        self
    }

    /// Fingerprint of the root descriptor
    pub fn with_fingerprint(mut self, fingerprint: Option<String>) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    /// Package `root` according to `spec`
    pub fn package(&self, root: &str, spec: &PackagingSpec) -> BuildResult<ArtifactDescriptor> {
        let root_node = self
            .graph
            .get_module(root)
            .ok_or_else(|| BuildError::module_not_found(root))?;

        self.graph.validate()?;
        let order = self.graph.compute_build_order()?;
        self.graph.validate_targets()?;

        for export in &spec.exports {
            if !root_node.dependencies.contains(export) {
                return Err(BuildError::UndeclaredExport {
                    module: export.clone(),
                    root: root.to_string(),
                });
            }
        }

        if root_node.targets.is_empty() {
            return Err(BuildError::malformed(
                "module.targets",
                "must resolve to at least one target platform",
            ));
        }

        let frameworks: Vec<FrameworkSlice> = root_node
            .targets
            .iter()
            .filter(|t| t.is_apple())
            .map(|t| FrameworkSlice::new(*t, self.profile, &spec.base_name))
            .collect();

        let minimum_os = match spec.minimum_os {
            Some(minimum_os) => Some(minimum_os),
            None if !frameworks.is_empty() => Some(OsVersion::DEFAULT_DEPLOYMENT_TARGET),
            None => None,
        };

        let android = if root_node.targets.contains(&PlatformTarget::Android) {
            Some(self.android_library(root))
        } else {
            None
        };

        let reachable = self.graph.reachable_from(root);
        let modules: Vec<String> = order
            .into_iter()
            .filter(|m| reachable.contains(m))
            .collect();

        debug!(
            module = root,
            slices = frameworks.len(),
            modules = modules.len(),
            profile = %self.profile,
            "packaged framework"
        );

        Ok(ArtifactDescriptor {
            module: root.to_string(),
            base_name: spec.base_name.clone(),
            version: spec.version.clone(),
            linkage: spec.linkage,
            minimum_os,
            exports: spec.exports.clone(),
            targets: root_node.targets.clone(),
            frameworks,
            android,
            modules,
            runtime: root_node.runtime.clone(),
            profile: self.profile,
            summary: spec.summary.clone(),
            homepage: spec.homepage.clone(),
            fingerprint: self.fingerprint.clone(),
        })
    }

    /// Android library of `root`, the namespace defaulting to one derived
    /// from the module name
    fn android_library(&self, root: &str) -> AndroidLibrary {
        let config = self.android.as_ref();
        let namespace = config
            .and_then(|c| c.namespace.clone())
            .unwrap_or_else(|| AndroidConfig::default_namespace(root));

        AndroidLibrary {
            namespace,
            compile_sdk: config.and_then(|c| c.compile_sdk),
            min_sdk: config.and_then(|c| c.min_sdk),
            path: PathBuf::from("android"),
        }
    }
}
